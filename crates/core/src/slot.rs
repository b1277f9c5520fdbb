// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Slot lifecycle: `PENDING_VERIFICATION -> ACTIVE | REJECTED`,
//! `ACTIVE <-> INACTIVE`.

use parkledger_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use parkledger_domain::{
    CapacityMap, DomainError, GeoPoint, PricingModel, PricingPolicy, Slot, SlotDraft, SlotStatus,
    VehicleClass, Verification, validate_rejection_reason, validate_slot_name,
};
use time::OffsetDateTime;

use crate::error::CoreError;
use crate::state::{
    NewSlotInput, SlotConfig, SlotConfigUpdate, SlotStatusChange, TransitionResult,
    VerificationDecision,
};

/// Validates a creation request and produces a slot awaiting verification.
///
/// The audit event carries no slot id; the caller fills it in once the
/// store assigns one.
///
/// # Errors
///
/// - [`DomainError::InvalidInput`] for a blank name, bad coordinates, or an
///   empty capacity map
/// - pricing errors from [`PricingPolicy::from_config`]
pub fn draft_slot(
    input: NewSlotInput,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult<SlotDraft>, CoreError> {
    let name: String = validate_slot_name(&input.name)?;
    let address: String = validate_address(&input.address)?;
    let geo: GeoPoint = GeoPoint::new(input.latitude, input.longitude)?;
    ensure_capacity(&input.capacity)?;
    let pricing: PricingPolicy = PricingPolicy::from_config(
        input.pricing_model,
        input.pricing_config.as_ref(),
        &input.capacity,
    )?;

    let draft: SlotDraft = SlotDraft {
        owner: actor.id.clone(),
        organization_id: input.organization_id,
        name,
        description: input.description,
        address,
        geo,
        capacity: input.capacity,
        pricing,
        payment_timing: input.payment_timing,
        created_at: now,
    };

    let action: Action = Action::new(
        String::from("CreateSlot"),
        Some(format!("{} ({} pricing)", draft.name, draft.pricing.model())),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        None,
        StateSnapshot::absent(),
        StateSnapshot::capture(&draft),
        now,
    );

    Ok(TransitionResult {
        outcome: draft,
        audit_event,
    })
}

/// Applies an administrator's decision to a pending slot.
///
/// # Errors
///
/// - [`DomainError::SlotNotPending`] if the slot was already decided
/// - [`DomainError::InvalidInput`] if a rejection has no reason
pub fn verify_slot(
    slot: &Slot,
    decision: VerificationDecision,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult<SlotStatusChange>, CoreError> {
    let (status, rejection_reason): (SlotStatus, Option<String>) = match decision {
        VerificationDecision::Approve => (SlotStatus::Active, None),
        VerificationDecision::Reject { reason } => (
            SlotStatus::Rejected,
            Some(validate_rejection_reason(reason.as_deref())?),
        ),
    };

    if !slot.status.can_transition_to(status) {
        return Err(DomainError::SlotNotPending {
            slot_id: slot.slot_id,
            status: slot.status,
        }
        .into());
    }

    let change: SlotStatusChange = SlotStatusChange {
        slot_id: slot.slot_id,
        status,
        verification: Some(Verification {
            verified_by: actor.id.clone(),
            verified_at: now,
            rejection_reason,
        }),
    };

    Ok(status_transition(slot, change, "VerifySlot", actor, cause, now))
}

/// Takes an ACTIVE slot out of service.
///
/// # Errors
///
/// - [`DomainError::SlotNotActive`] if the slot is not ACTIVE
/// - [`DomainError::ActiveSessionsExist`] while any vehicle is checked in
pub fn deactivate_slot(
    slot: &Slot,
    checked_in_sessions: i64,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult<SlotStatusChange>, CoreError> {
    if !slot.status.can_transition_to(SlotStatus::Inactive) {
        return Err(DomainError::SlotNotActive {
            slot_id: slot.slot_id,
            status: slot.status,
        }
        .into());
    }
    ensure_no_sessions(slot, checked_in_sessions)?;

    let change: SlotStatusChange = SlotStatusChange {
        slot_id: slot.slot_id,
        status: SlotStatus::Inactive,
        verification: slot.verification.clone(),
    };
    Ok(status_transition(slot, change, "DeactivateSlot", actor, cause, now))
}

/// Returns an INACTIVE slot to service.
///
/// # Errors
///
/// Returns [`DomainError::InvalidInput`] unless the slot is INACTIVE.
pub fn reactivate_slot(
    slot: &Slot,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult<SlotStatusChange>, CoreError> {
    if slot.status != SlotStatus::Inactive {
        return Err(DomainError::InvalidInput {
            field: "status",
            message: format!(
                "only an INACTIVE slot can be reactivated, slot {} is {}",
                slot.slot_id, slot.status
            ),
        }
        .into());
    }

    let change: SlotStatusChange = SlotStatusChange {
        slot_id: slot.slot_id,
        status: SlotStatus::Active,
        verification: slot.verification.clone(),
    };
    Ok(status_transition(slot, change, "ReactivateSlot", actor, cause, now))
}

/// Soft-deletes a slot with no vehicles inside.
///
/// # Errors
///
/// Returns [`DomainError::ActiveSessionsExist`] while any vehicle is checked in.
pub fn delete_slot(
    slot: &Slot,
    checked_in_sessions: i64,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult<i64>, CoreError> {
    ensure_no_sessions(slot, checked_in_sessions)?;

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(String::from("DeleteSlot"), Some(slot.name.clone())),
        Some(slot.slot_id),
        StateSnapshot::capture(slot),
        StateSnapshot::absent(),
        now,
    );
    Ok(TransitionResult {
        outcome: slot.slot_id,
        audit_event,
    })
}

/// Applies a configuration edit to a slot that is not ACTIVE.
///
/// Pricing is re-validated whenever the model, its configuration or the
/// capacity changes, so the stored policy always covers every
/// capacity-bearing class. Capacity can never drop below what is currently
/// occupied.
///
/// # Errors
///
/// - [`DomainError::SlotActive`] if the slot is ACTIVE
/// - [`DomainError::SlotNotPending`] if the slot was rejected
/// - [`DomainError::InvalidInput`] for invalid fields
/// - pricing errors from [`PricingPolicy::from_config`]
pub fn update_slot_config(
    slot: &Slot,
    update: SlotConfigUpdate,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult<SlotConfig>, CoreError> {
    if !slot.status.allows_config_edits() {
        let err: DomainError = if slot.status == SlotStatus::Active {
            DomainError::SlotActive {
                slot_id: slot.slot_id,
            }
        } else {
            DomainError::SlotNotPending {
                slot_id: slot.slot_id,
                status: slot.status,
            }
        };
        return Err(err.into());
    }

    let name: String = match update.name.as_deref() {
        Some(name) => validate_slot_name(name)?,
        None => slot.name.clone(),
    };
    let address: String = match update.address.as_deref() {
        Some(address) => validate_address(address)?,
        None => slot.address.clone(),
    };
    let geo: GeoPoint = GeoPoint::new(
        update.latitude.unwrap_or(slot.geo.latitude),
        update.longitude.unwrap_or(slot.geo.longitude),
    )?;

    let capacity_changed: bool = update.capacity.is_some();
    let capacity: CapacityMap = update.capacity.unwrap_or_else(|| slot.capacity.clone());
    ensure_capacity(&capacity)?;
    ensure_capacity_covers_occupancy(slot, &capacity)?;

    let pricing: PricingPolicy = match (update.pricing_model, update.pricing_config) {
        (Some(model), config) => PricingPolicy::from_config(model, config.as_ref(), &capacity)?,
        (None, Some(config)) => {
            let model: PricingModel = slot.pricing.model();
            PricingPolicy::from_config(model, Some(&config), &capacity)?
        }
        (None, None) if capacity_changed => {
            let missing: Vec<VehicleClass> = slot.pricing.missing_classes(&capacity);
            if !missing.is_empty() {
                return Err(DomainError::IncompletePricingConfig { missing }.into());
            }
            slot.pricing.clone()
        }
        (None, None) => slot.pricing.clone(),
    };

    let config: SlotConfig = SlotConfig {
        name,
        description: update.description.or_else(|| slot.description.clone()),
        address,
        geo,
        capacity,
        pricing,
        payment_timing: update.payment_timing.unwrap_or(slot.payment_timing),
    };

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(String::from("UpdateSlot"), Some(config.name.clone())),
        Some(slot.slot_id),
        StateSnapshot::capture(slot),
        StateSnapshot::capture(&config),
        now,
    );

    Ok(TransitionResult {
        outcome: config,
        audit_event,
    })
}

fn status_transition(
    slot: &Slot,
    change: SlotStatusChange,
    name: &str,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> TransitionResult<SlotStatusChange> {
    let action: Action = Action::new(
        name.to_string(),
        Some(format!("{} -> {}", slot.status, change.status)),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        Some(slot.slot_id),
        StateSnapshot::new(format!("status={}", slot.status)),
        StateSnapshot::capture(&change),
        now,
    );
    TransitionResult {
        outcome: change,
        audit_event,
    }
}

fn ensure_no_sessions(slot: &Slot, checked_in_sessions: i64) -> Result<(), DomainError> {
    if checked_in_sessions > 0 {
        return Err(DomainError::ActiveSessionsExist {
            slot_id: slot.slot_id,
            count: checked_in_sessions,
        });
    }
    Ok(())
}

fn ensure_capacity(capacity: &CapacityMap) -> Result<(), DomainError> {
    if capacity.is_empty() {
        return Err(DomainError::InvalidInput {
            field: "capacity",
            message: String::from("at least one vehicle class needs capacity"),
        });
    }
    Ok(())
}

fn ensure_capacity_covers_occupancy(
    slot: &Slot,
    capacity: &CapacityMap,
) -> Result<(), DomainError> {
    for (class, occupied) in &slot.occupancy {
        if *occupied > capacity.get(*class) {
            return Err(DomainError::InvalidInput {
                field: "capacity",
                message: format!(
                    "{class} capacity {} is below current occupancy {occupied}",
                    capacity.get(*class)
                ),
            });
        }
    }
    Ok(())
}

fn validate_address(address: &str) -> Result<String, DomainError> {
    let trimmed: &str = address.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput {
            field: "address",
            message: String::from("address cannot be empty"),
        });
    }
    Ok(trimmed.to_string())
}
