// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session state machine: `CHECKED_IN -> CHECKED_OUT | ESCAPED`.

use parkledger_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use parkledger_domain::{
    ActorId, DomainError, DueDraft, DueStatus, Money, PaymentStatus, Session, SessionClosure,
    SessionDraft, SessionStatus, Slot, SlotStatus, VehicleClass, VehicleNumber,
    compute_fee, validate_collected_amount,
};
use time::OffsetDateTime;

use crate::error::CoreError;
use crate::state::{CheckOutInput, SessionClose, TransitionResult, UnderpaymentPolicy};

/// Opens a session for a vehicle entering a slot.
///
/// Only the slot-local rules are checked here: the slot must be ACTIVE and
/// must hold the vehicle class at all. Global uniqueness, due blocking and
/// the capacity counter itself are enforced against the store by the caller,
/// in the same transaction that writes the returned draft.
///
/// # Errors
///
/// - [`DomainError::SlotNotActive`] if the slot is not ACTIVE
/// - [`DomainError::CapacityFull`] if the slot has no capacity for the class
pub fn open_session(
    slot: &Slot,
    vehicle: VehicleNumber,
    vehicle_class: VehicleClass,
    vehicle_owner: Option<ActorId>,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult<SessionDraft>, CoreError> {
    if slot.status != SlotStatus::Active {
        return Err(DomainError::SlotNotActive {
            slot_id: slot.slot_id,
            status: slot.status,
        }
        .into());
    }

    let capacity: u32 = slot.capacity.get(vehicle_class);
    if capacity == 0 {
        return Err(DomainError::CapacityFull {
            vehicle_class,
            capacity,
        }
        .into());
    }

    let draft: SessionDraft = SessionDraft {
        slot_id: slot.slot_id,
        vehicle,
        vehicle_class,
        vehicle_owner,
        checked_in_by: actor.id.clone(),
        check_in_at: now,
    };

    let action: Action = Action::new(
        String::from("CheckIn"),
        Some(format!("{} ({vehicle_class})", draft.vehicle)),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        Some(slot.slot_id),
        StateSnapshot::absent(),
        StateSnapshot::capture(&draft),
        now,
    );

    Ok(TransitionResult {
        outcome: draft,
        audit_event,
    })
}

/// Closes a session through the payment path.
///
/// The fee is computed at `now`. Payment status follows what was collected:
/// PAID when it covers the fee, PARTIAL when some but not all was taken,
/// PENDING when nothing was. Under [`UnderpaymentPolicy::OpenDue`] a shortfall
/// also opens a due for the difference.
///
/// # Errors
///
/// - [`DomainError::NotCheckedIn`] if the session is already closed
/// - [`DomainError::InvalidInput`] if the collected amount is negative
/// - [`DomainError::InvalidPricingConfig`] if the fee outgrows the storable range
pub fn check_out(
    slot: &Slot,
    session: &Session,
    input: CheckOutInput,
    underpayment: UnderpaymentPolicy,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult<SessionClose>, CoreError> {
    ensure_open(session, SessionStatus::CheckedOut)?;
    validate_collected_amount(input.collected)?;

    let calculated_fee: Money =
        compute_fee(&slot.pricing, session.vehicle_class, session.check_in_at, now)?;
    let payment_status: PaymentStatus =
        PaymentStatus::for_collection(input.collected, calculated_fee);

    let shortfall: Money = calculated_fee.saturating_sub(input.collected);
    let due: Option<DueDraft> = match underpayment {
        UnderpaymentPolicy::OpenDue if shortfall.is_positive() => Some(due_draft(
            slot,
            session,
            shortfall,
            now,
            Some(format!("Underpaid at check-out: collected {}", input.collected)),
        )),
        UnderpaymentPolicy::OpenDue | UnderpaymentPolicy::RecordOnly => None,
    };

    let closure: SessionClosure = SessionClosure {
        status: SessionStatus::CheckedOut,
        closed_by: actor.id.clone(),
        closed_at: now,
        calculated_fee,
        collected: input.collected,
        payment_method: input.payment_method,
        payment_status,
        notes: input.notes,
    };

    let close: SessionClose = SessionClose { closure, due };
    let action: Action = Action::new(
        String::from("CheckOut"),
        Some(format!(
            "{} fee {calculated_fee} collected {} ({payment_status})",
            session.vehicle, input.collected
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        Some(slot.slot_id),
        StateSnapshot::capture(session),
        StateSnapshot::capture(&close),
        now,
    );

    Ok(TransitionResult {
        outcome: close,
        audit_event,
    })
}

/// Closes a session through the non-payment path.
///
/// The fee is computed at `now`, nothing is collected, and exactly one due
/// for the full fee is opened against the slot owner. A zero fee yields a
/// due that is already settled.
///
/// # Errors
///
/// - [`DomainError::NotCheckedIn`] if the session is already closed
/// - [`DomainError::InvalidPricingConfig`] if the fee outgrows the storable range
pub fn mark_escaped(
    slot: &Slot,
    session: &Session,
    notes: Option<String>,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult<SessionClose>, CoreError> {
    ensure_open(session, SessionStatus::Escaped)?;

    let calculated_fee: Money =
        compute_fee(&slot.pricing, session.vehicle_class, session.check_in_at, now)?;
    let due: DueDraft = due_draft(slot, session, calculated_fee, now, notes.clone());

    let closure: SessionClosure = SessionClosure {
        status: SessionStatus::Escaped,
        closed_by: actor.id.clone(),
        closed_at: now,
        calculated_fee,
        collected: Money::ZERO,
        payment_method: None,
        payment_status: PaymentStatus::Pending,
        notes,
    };

    let close: SessionClose = SessionClose {
        closure,
        due: Some(due),
    };
    let action: Action = Action::new(
        String::from("MarkEscaped"),
        Some(format!("{} left owing {calculated_fee}", session.vehicle)),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        Some(slot.slot_id),
        StateSnapshot::capture(session),
        StateSnapshot::capture(&close),
        now,
    );

    Ok(TransitionResult {
        outcome: close,
        audit_event,
    })
}

fn ensure_open(session: &Session, target: SessionStatus) -> Result<(), DomainError> {
    if session.status.can_transition_to(target) {
        Ok(())
    } else {
        Err(DomainError::NotCheckedIn {
            session_id: session.session_id,
            status: session.status,
        })
    }
}

fn due_draft(
    slot: &Slot,
    session: &Session,
    amount_due: Money,
    now: OffsetDateTime,
    notes: Option<String>,
) -> DueDraft {
    let settled: bool = amount_due.is_zero();
    DueDraft {
        vehicle: session.vehicle.clone(),
        owner: slot.owner.clone(),
        session_id: session.session_id,
        amount_due,
        status: if settled {
            DueStatus::Paid
        } else {
            DueStatus::Pending
        },
        created_at: now,
        paid_at: settled.then_some(now),
        notes,
    }
}
