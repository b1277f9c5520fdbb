// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use parkledger_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use parkledger_domain::{
    DomainError, Due, DuePayment, DueStatus, Money, validate_payment_amount,
};
use time::OffsetDateTime;

use crate::error::CoreError;
use crate::state::{DueCollection, TransitionResult};

/// Records a payment against a pending due.
///
/// The payment is added to what was already paid. Once the total reaches the
/// amount due the due becomes PAID and is stamped; anything less leaves it
/// PENDING.
///
/// # Errors
///
/// - [`DomainError::DueNotPending`] if the due is already closed
/// - [`DomainError::InvalidInput`] if the payment is not positive or would
///   push the running total past the storable range
pub fn collect_due(
    due: &Due,
    collection: DueCollection,
    actor: Actor,
    cause: Cause,
    slot_id: Option<i64>,
    now: OffsetDateTime,
) -> Result<TransitionResult<DuePayment>, CoreError> {
    ensure_pending(due, DueStatus::Paid)?;
    validate_payment_amount(collection.amount)?;

    let amount_paid: Money = due
        .amount_paid
        .checked_add(collection.amount)
        .ok_or_else(|| DomainError::InvalidInput {
            field: "paid_amount",
            message: format!(
                "{} on top of {} already paid exceeds the largest storable amount",
                collection.amount, due.amount_paid
            ),
        })?;
    let settled: bool = amount_paid >= due.amount_due;

    let payment: DuePayment = DuePayment {
        amount_paid,
        status: if settled {
            DueStatus::Paid
        } else {
            DueStatus::Pending
        },
        paid_at: settled.then_some(now),
        collected_by: Some(actor.id.clone()),
        payment_method: collection.payment_method,
        payment_session_id: collection.payment_session_id.or(due.payment_session_id),
        notes: collection.notes.or_else(|| due.notes.clone()),
    };

    let action: Action = Action::new(
        String::from("CollectDue"),
        Some(format!(
            "Due {} for {}: received {}, paid {amount_paid} of {}",
            due.due_id, due.vehicle, collection.amount, due.amount_due
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        slot_id,
        StateSnapshot::capture(due),
        StateSnapshot::capture(&payment),
        now,
    );

    Ok(TransitionResult {
        outcome: payment,
        audit_event,
    })
}

/// Forgives a pending due.
///
/// # Errors
///
/// Returns [`DomainError::DueNotPending`] if the due is already closed.
pub fn write_off_due(
    due: &Due,
    reason: Option<String>,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult<DuePayment>, CoreError> {
    ensure_pending(due, DueStatus::WrittenOff)?;

    let payment: DuePayment = DuePayment {
        amount_paid: due.amount_paid,
        status: DueStatus::WrittenOff,
        paid_at: due.paid_at,
        collected_by: due.collected_by.clone(),
        payment_method: due.payment_method,
        payment_session_id: due.payment_session_id,
        notes: reason.or_else(|| due.notes.clone()),
    };

    let action: Action = Action::new(
        String::from("WriteOffDue"),
        Some(format!(
            "Due {} for {} written off with {} outstanding",
            due.due_id,
            due.vehicle,
            due.outstanding()
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        None,
        StateSnapshot::capture(due),
        StateSnapshot::capture(&payment),
        now,
    );

    Ok(TransitionResult {
        outcome: payment,
        audit_event,
    })
}

fn ensure_pending(due: &Due, target: DueStatus) -> Result<(), DomainError> {
    if due.status.can_transition_to(target) {
        Ok(())
    } else {
        Err(DomainError::DueNotPending {
            due_id: due.due_id,
            status: due.status,
        })
    }
}
