// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use parkledger_domain::{DomainError, DueStatus, Money, PaymentMethod};
use time::Duration;

use super::helpers::{T0, create_test_actor, create_test_cause, create_test_due};
use crate::{CoreError, DueCollection, collect_due, write_off_due};

fn upi(cents: i64) -> DueCollection {
    DueCollection {
        amount: Money::from_cents(cents),
        payment_method: Some(PaymentMethod::Upi),
        payment_session_id: None,
        notes: None,
    }
}

#[test]
fn test_full_collection_marks_due_paid() {
    let due = create_test_due(5000, 0, DueStatus::Pending);
    let now = T0 + Duration::days(2);

    let result = collect_due(
        &due,
        upi(5000),
        create_test_actor(),
        create_test_cause(),
        Some(1),
        now,
    )
    .unwrap();

    assert_eq!(result.outcome.status, DueStatus::Paid);
    assert_eq!(result.outcome.amount_paid, Money::from_cents(5000));
    assert_eq!(result.outcome.paid_at, Some(now));
    assert_eq!(
        result.outcome.collected_by.as_ref().unwrap().as_str(),
        "staff-1"
    );
}

#[test]
fn test_partial_collection_stays_pending() {
    let due = create_test_due(5000, 0, DueStatus::Pending);
    let result = collect_due(
        &due,
        upi(2000),
        create_test_actor(),
        create_test_cause(),
        None,
        T0,
    )
    .unwrap();

    assert_eq!(result.outcome.status, DueStatus::Pending);
    assert_eq!(result.outcome.amount_paid, Money::from_cents(2000));
    assert_eq!(result.outcome.paid_at, None);
}

#[test]
fn test_collections_accumulate_until_paid() {
    let due = create_test_due(5000, 3000, DueStatus::Pending);
    let result = collect_due(
        &due,
        upi(2500),
        create_test_actor(),
        create_test_cause(),
        None,
        T0,
    )
    .unwrap();

    assert_eq!(result.outcome.status, DueStatus::Paid);
    assert_eq!(result.outcome.amount_paid, Money::from_cents(5500));
}

#[test]
fn test_collect_on_closed_due_is_rejected() {
    for status in [DueStatus::Paid, DueStatus::WrittenOff] {
        let due = create_test_due(5000, 5000, status);
        let result = collect_due(
            &due,
            upi(100),
            create_test_actor(),
            create_test_cause(),
            None,
            T0,
        );
        assert!(matches!(
            result,
            Err(CoreError::DomainViolation(DomainError::DueNotPending { .. }))
        ));
    }
}

#[test]
fn test_collect_requires_positive_amount() {
    let due = create_test_due(5000, 0, DueStatus::Pending);
    let result = collect_due(
        &due,
        upi(0),
        create_test_actor(),
        create_test_cause(),
        None,
        T0,
    );
    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::InvalidInput {
            field: "paid_amount",
            message: String::from("must be greater than zero, got 0.00"),
        })
    );
}

#[test]
fn test_collection_past_storable_total_is_rejected() {
    let due = create_test_due(i64::MAX, i64::MAX - 10, DueStatus::Pending);
    let result = collect_due(
        &due,
        upi(100),
        create_test_actor(),
        create_test_cause(),
        None,
        T0,
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidInput {
            field: "paid_amount",
            ..
        }))
    ));
}

#[test]
fn test_write_off_closes_pending_due() {
    let due = create_test_due(5000, 1000, DueStatus::Pending);
    let result = write_off_due(
        &due,
        Some(String::from("Goodwill")),
        create_test_actor(),
        create_test_cause(),
        T0,
    )
    .unwrap();

    assert_eq!(result.outcome.status, DueStatus::WrittenOff);
    assert_eq!(result.outcome.amount_paid, Money::from_cents(1000));
    assert_eq!(result.outcome.notes.as_deref(), Some("Goodwill"));
}
