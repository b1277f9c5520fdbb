// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use parkledger_domain::{DueStatus, Money, PaymentMethod, StaffRole, VehicleClass};
use parkledger_persistence::Persistence;

use super::helpers::{
    add_test_staff, at, check_in_as, check_in_car, create_active_slot, create_active_slot_for,
    create_test_cause, create_test_outsider, create_test_owner, create_test_persistence,
    create_test_staff, escape, fixed_request, hourly_car_request, member,
};
use crate::{
    ApiError, AuthenticatedActor, CollectDueRequest, DueResponse, LedgerConfig, ListDuesRequest,
    PageRequest, WriteOffDueRequest, collect_due, list_dues, write_off_due,
};

/// Escapes a car from a FIXED slot, leaving a 50.00 due. Returns the due id.
fn escaped_due(persistence: &mut Persistence, slot_id: i64, vehicle: &str) -> i64 {
    let session_id: i64 = check_in_car(persistence, slot_id, vehicle, at(0))
        .unwrap()
        .session
        .session_id;
    escape(persistence, session_id, at(10))
        .unwrap()
        .due
        .unwrap()
        .due_id
}

fn collect(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    due_id: i64,
    cents: i64,
) -> Result<DueResponse, ApiError> {
    collect_due(
        persistence,
        &CollectDueRequest {
            due_id,
            amount: Money::from_cents(cents),
            payment_method: Some(PaymentMethod::Upi),
            payment_session_id: None,
            notes: None,
        },
        actor,
        create_test_cause(),
        at(60),
    )
}

#[test]
fn test_due_blocks_check_in_at_every_slot_of_the_owner() {
    let mut persistence: Persistence = create_test_persistence();
    let escaped_at: i64 = create_active_slot(&mut persistence, &fixed_request());
    let sibling: i64 = create_active_slot(&mut persistence, &hourly_car_request());
    escaped_due(&mut persistence, escaped_at, "AB12CD3456");

    let err: ApiError =
        check_in_car(&mut persistence, escaped_at, "AB12CD3456", at(20)).unwrap_err();
    assert_eq!(err.code(), "OUTSTANDING_DUES_BLOCK");
    let err: ApiError = check_in_car(&mut persistence, sibling, "AB12CD3456", at(20)).unwrap_err();
    assert_eq!(err.code(), "OUTSTANDING_DUES_BLOCK");
}

#[test]
fn test_due_does_not_block_other_owners() {
    let mut persistence: Persistence = create_test_persistence();
    let slot_id: i64 = create_active_slot(&mut persistence, &fixed_request());
    let other_owner: AuthenticatedActor = member("owner-2");
    let elsewhere: i64 = create_active_slot_for(&mut persistence, &fixed_request(), &other_owner);
    escaped_due(&mut persistence, slot_id, "AB12CD3456");

    let response = check_in_as(
        &mut persistence,
        &other_owner,
        elsewhere,
        "AB12CD3456",
        VehicleClass::Car,
        at(20),
    )
    .unwrap();
    assert_eq!(response.session.slot_id, elsewhere);
}

#[test]
fn test_partial_then_full_collection_unblocks_vehicle() {
    let mut persistence: Persistence = create_test_persistence();
    let slot_id: i64 = create_active_slot(&mut persistence, &fixed_request());
    let due_id: i64 = escaped_due(&mut persistence, slot_id, "AB12CD3456");

    let partial: DueResponse =
        collect(&mut persistence, &create_test_owner(), due_id, 2_000).unwrap();
    assert_eq!(partial.due.status, DueStatus::Pending);
    assert_eq!(partial.due.amount_paid, Money::from_cents(2_000));
    assert_eq!(partial.outstanding, Money::from_cents(3_000));
    assert!(partial.due.paid_at.is_none());

    let err: ApiError = check_in_car(&mut persistence, slot_id, "AB12CD3456", at(70)).unwrap_err();
    assert_eq!(err.code(), "OUTSTANDING_DUES_BLOCK");

    let settled: DueResponse =
        collect(&mut persistence, &create_test_owner(), due_id, 3_000).unwrap();
    assert_eq!(settled.due.status, DueStatus::Paid);
    assert_eq!(settled.outstanding, Money::ZERO);
    assert_eq!(settled.due.collected_by, Some(create_test_owner().id));
    assert!(settled.due.paid_at.is_some());

    check_in_car(&mut persistence, slot_id, "AB12CD3456", at(80)).unwrap();
}

#[test]
fn test_settled_due_rejects_further_payment() {
    let mut persistence: Persistence = create_test_persistence();
    let slot_id: i64 = create_active_slot(&mut persistence, &fixed_request());
    let due_id: i64 = escaped_due(&mut persistence, slot_id, "AB12CD3456");
    collect(&mut persistence, &create_test_owner(), due_id, 5_000).unwrap();

    let err: ApiError = collect(&mut persistence, &create_test_owner(), due_id, 100).unwrap_err();
    assert_eq!(err.code(), "DUE_NOT_PENDING");
}

#[test]
fn test_collection_amount_must_be_positive() {
    let mut persistence: Persistence = create_test_persistence();
    let slot_id: i64 = create_active_slot(&mut persistence, &fixed_request());
    let due_id: i64 = escaped_due(&mut persistence, slot_id, "AB12CD3456");

    let err: ApiError = collect(&mut persistence, &create_test_owner(), due_id, 0).unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[test]
fn test_staff_of_any_owner_slot_may_collect() {
    let mut persistence: Persistence = create_test_persistence();
    let escaped_at: i64 = create_active_slot(&mut persistence, &fixed_request());
    let sibling: i64 = create_active_slot(&mut persistence, &hourly_car_request());
    add_test_staff(&mut persistence, sibling, StaffRole::Volunteer);
    let due_id: i64 = escaped_due(&mut persistence, escaped_at, "AB12CD3456");

    let settled: DueResponse =
        collect(&mut persistence, &create_test_staff(), due_id, 5_000).unwrap();
    assert_eq!(settled.due.status, DueStatus::Paid);
    assert_eq!(settled.due.collected_by, Some(create_test_staff().id));
}

#[test]
fn test_outsider_cannot_collect() {
    let mut persistence: Persistence = create_test_persistence();
    let slot_id: i64 = create_active_slot(&mut persistence, &fixed_request());
    let due_id: i64 = escaped_due(&mut persistence, slot_id, "AB12CD3456");

    let err: ApiError =
        collect(&mut persistence, &create_test_outsider(), due_id, 5_000).unwrap_err();
    assert_eq!(err.code(), "NOT_AUTHORIZED");
}

#[test]
fn test_collect_unknown_due() {
    let mut persistence: Persistence = create_test_persistence();

    let err: ApiError = collect(&mut persistence, &create_test_owner(), 999, 100).unwrap_err();
    assert_eq!(err.code(), "DUE_NOT_FOUND");
}

#[test]
fn test_collect_validates_paying_session() {
    let mut persistence: Persistence = create_test_persistence();
    let slot_id: i64 = create_active_slot(&mut persistence, &fixed_request());
    let due_id: i64 = escaped_due(&mut persistence, slot_id, "AB12CD3456");

    let err: ApiError = collect_due(
        &mut persistence,
        &CollectDueRequest {
            due_id,
            amount: Money::from_cents(5_000),
            payment_method: Some(PaymentMethod::Cash),
            payment_session_id: Some(4_242),
            notes: None,
        },
        &create_test_owner(),
        create_test_cause(),
        at(60),
    )
    .unwrap_err();
    assert_eq!(err.code(), "SESSION_NOT_FOUND");
}

#[test]
fn test_write_off_unblocks_and_is_final() {
    let mut persistence: Persistence = create_test_persistence();
    let slot_id: i64 = create_active_slot(&mut persistence, &fixed_request());
    let due_id: i64 = escaped_due(&mut persistence, slot_id, "AB12CD3456");
    let request: WriteOffDueRequest = WriteOffDueRequest {
        due_id,
        reason: Some(String::from("Regular customer")),
    };

    let written_off: DueResponse = write_off_due(
        &mut persistence,
        &request,
        &create_test_owner(),
        create_test_cause(),
        at(30),
    )
    .unwrap();
    assert_eq!(written_off.due.status, DueStatus::WrittenOff);
    check_in_car(&mut persistence, slot_id, "AB12CD3456", at(40)).unwrap();

    let err: ApiError = write_off_due(
        &mut persistence,
        &request,
        &create_test_owner(),
        create_test_cause(),
        at(50),
    )
    .unwrap_err();
    assert_eq!(err.code(), "DUE_NOT_PENDING");
    let err: ApiError = collect(&mut persistence, &create_test_owner(), due_id, 100).unwrap_err();
    assert_eq!(err.code(), "DUE_NOT_PENDING");
}

#[test]
fn test_staff_cannot_write_off() {
    let mut persistence: Persistence = create_test_persistence();
    let slot_id: i64 = create_active_slot(&mut persistence, &fixed_request());
    add_test_staff(&mut persistence, slot_id, StaffRole::Staff);
    let due_id: i64 = escaped_due(&mut persistence, slot_id, "AB12CD3456");

    let err: ApiError = write_off_due(
        &mut persistence,
        &WriteOffDueRequest {
            due_id,
            reason: None,
        },
        &create_test_staff(),
        create_test_cause(),
        at(30),
    )
    .unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_ROLE");
}

#[test]
fn test_list_dues_filters_by_status() {
    let mut persistence: Persistence = create_test_persistence();
    let config: LedgerConfig = LedgerConfig::default();
    let slot_id: i64 = create_active_slot(&mut persistence, &fixed_request());
    let settled: i64 = escaped_due(&mut persistence, slot_id, "AB12CD3456");
    escaped_due(&mut persistence, slot_id, "KA01AB1234");
    collect(&mut persistence, &create_test_owner(), settled, 5_000).unwrap();

    let all = list_dues(
        &mut persistence,
        &config,
        &ListDuesRequest::default(),
        &create_test_owner(),
    )
    .unwrap();
    assert_eq!(all.items.len(), 2);

    let pending = list_dues(
        &mut persistence,
        &config,
        &ListDuesRequest {
            status: Some(DueStatus::Pending),
            page: PageRequest::default(),
        },
        &create_test_owner(),
    )
    .unwrap();
    assert_eq!(pending.items.len(), 1);
    assert_eq!(pending.items[0].vehicle.as_str(), "KA01AB1234");

    let none = list_dues(
        &mut persistence,
        &config,
        &ListDuesRequest::default(),
        &create_test_outsider(),
    )
    .unwrap();
    assert!(none.items.is_empty());
}
