// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use parkledger_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use parkledger_domain::{ActorId, DomainError, Slot, StaffAssignment, StaffRole};
use time::OffsetDateTime;

use crate::error::CoreError;
use crate::state::{StaffDraft, TransitionResult};

/// Adds an actor to a slot's staff list.
///
/// `existing` is the actor's current assignment on the slot, if any.
///
/// # Errors
///
/// - [`DomainError::SlotNotActive`] unless the slot is ACTIVE
/// - [`DomainError::OrgManagedSlot`] for organization slots
/// - [`DomainError::OwnerAsStaff`] when asked to grant OWNER
/// - [`DomainError::AlreadyStaff`] when the actor is already assigned
pub fn assign_staff(
    slot: &Slot,
    existing: Option<&StaffAssignment>,
    staff: ActorId,
    role: StaffRole,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult<StaffDraft>, CoreError> {
    ensure_staff_changes_allowed(slot)?;
    if role == StaffRole::Owner {
        return Err(DomainError::OwnerAsStaff.into());
    }
    if existing.is_some() {
        return Err(DomainError::AlreadyStaff {
            actor: staff.to_string(),
        }
        .into());
    }

    let draft: StaffDraft = StaffDraft {
        slot_id: slot.slot_id,
        actor: staff,
        role,
    };
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(
            String::from("AddStaff"),
            Some(format!("{} as {role}", draft.actor)),
        ),
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

/// Removes a staff assignment from a slot.
///
/// # Errors
///
/// - [`DomainError::SlotNotActive`] unless the slot is ACTIVE
/// - [`DomainError::OrgManagedSlot`] for organization slots
/// - [`DomainError::StaffNotFound`] if the assignment belongs to another slot
/// - [`DomainError::CannotRemoveOwner`] for the OWNER assignment
pub fn remove_staff(
    slot: &Slot,
    assignment: &StaffAssignment,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult<i64>, CoreError> {
    ensure_staff_changes_allowed(slot)?;
    if assignment.slot_id != slot.slot_id {
        return Err(DomainError::StaffNotFound(assignment.assignment_id).into());
    }
    if assignment.role == StaffRole::Owner {
        return Err(DomainError::CannotRemoveOwner.into());
    }

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(
            String::from("RemoveStaff"),
            Some(format!("{} ({})", assignment.actor, assignment.role)),
        ),
        Some(slot.slot_id),
        StateSnapshot::capture(assignment),
        StateSnapshot::absent(),
        now,
    );

    Ok(TransitionResult {
        outcome: assignment.assignment_id,
        audit_event,
    })
}

fn ensure_staff_changes_allowed(slot: &Slot) -> Result<(), DomainError> {
    if !slot.status.allows_staff_changes() {
        return Err(DomainError::SlotNotActive {
            slot_id: slot.slot_id,
            status: slot.status,
        });
    }
    if slot.is_organization_slot() {
        return Err(DomainError::OrgManagedSlot {
            slot_id: slot.slot_id,
        });
    }
    Ok(())
}
