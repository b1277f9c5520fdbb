// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use parkledger::{
    NewSlotInput, SlotConfig, SlotConfigUpdate, SlotStatusChange, TransitionResult,
    VerificationDecision,
};
use parkledger_audit::Cause;
use parkledger_domain::{
    AccessLevel, CapacityMap, ClassAvailability, EffectiveRole, OrgMembership, Organization,
    OrganizationStatus, PaymentTiming, Slot, SlotDraft, SlotStatus, VehicleClass,
};
use parkledger_persistence::{AuditRecord, CapacityRow, ClassDrift, LedgerStore, Persistence};
use time::OffsetDateTime;
use tracing::{info, warn};

use super::{availability, load_slot, vanished};
use crate::auth::{AuthenticatedActor, AuthorizationService, resolve_role};
use crate::config::{LedgerConfig, PageWindow};
use crate::error::{ApiError, AuthError, translate_core_error, translate_domain_error};
use crate::request_response::{
    AuditLogResponse, CreateSlotRequest, DeleteSlotResponse, ListMySlotsRequest, Page,
    PageRequest, ReconciliationReport, SlotDetailResponse, SlotResponse, SlotRoleSummary,
    UpdateSlotRequest, VerifySlotRequest,
};

/// Registers a new slot awaiting verification.
///
/// The creator becomes the slot owner and receives the OWNER staff
/// assignment. A slot created for an organization requires the creator to
/// hold an administrative role in that organization, which must not be
/// suspended.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `request` - The slot to create
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The creation timestamp
///
/// # Returns
///
/// * `Ok(SlotResponse)` with the slot in `PENDING_VERIFICATION`
///
/// # Errors
///
/// Returns an error if:
/// - The organization is unknown, suspended, or the actor is not one of its
///   administrators
/// - Any field is invalid
/// - The pricing configuration does not cover every capacity-bearing class
pub fn create_slot(
    persistence: &mut Persistence,
    request: &CreateSlotRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<SlotResponse, ApiError> {
    let input: NewSlotInput = NewSlotInput {
        organization_id: request.organization_id,
        name: request.name.clone(),
        description: request.description.clone(),
        address: request.address.clone(),
        latitude: request.latitude,
        longitude: request.longitude,
        capacity: CapacityMap::from_entries(request.capacity.iter().map(|(c, n)| (*c, *n))),
        pricing_model: request.pricing_model,
        pricing_config: request.pricing_config.clone(),
        payment_timing: request.payment_timing.unwrap_or(PaymentTiming::OnExit),
    };

    let response: SlotResponse = persistence.in_transaction(|store| {
        if let Some(organization_id) = input.organization_id {
            authorize_organization_admin(store, authenticated_actor, organization_id)?;
        }

        let mut result: TransitionResult<SlotDraft> =
            parkledger::draft_slot(input, authenticated_actor.to_audit_actor(), cause, now)
                .map_err(translate_core_error)?;
        let slot_id: i64 = store.insert_slot(&result.outcome)?;
        result.audit_event.slot_id = Some(slot_id);
        store.persist_audit_event(&result.audit_event)?;

        let slot: Slot = load_slot(store, slot_id)?;
        let availability: Vec<ClassAvailability> = availability(&slot)?;
        Ok::<_, ApiError>(SlotResponse { slot, availability })
    })?;

    info!(
        slot_id = response.slot.slot_id,
        owner = %response.slot.owner,
        "Slot registered, awaiting verification"
    );
    Ok(response)
}

/// Approves or rejects a pending slot. Platform administrators only.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not a platform administrator
/// - The slot does not exist or was already decided
/// - A rejection carries no reason
pub fn verify_slot(
    persistence: &mut Persistence,
    slot_id: i64,
    request: &VerifySlotRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<SlotResponse, ApiError> {
    AuthorizationService::authorize_platform_admin(authenticated_actor, "verify_slot")?;

    let decision: VerificationDecision = if request.approve {
        VerificationDecision::Approve
    } else {
        VerificationDecision::Reject {
            reason: request.rejection_reason.clone(),
        }
    };

    let response: SlotResponse = persistence.in_transaction(|store| {
        let slot: Slot = load_slot(store, slot_id)?;
        let result: TransitionResult<SlotStatusChange> = parkledger::verify_slot(
            &slot,
            decision,
            authenticated_actor.to_audit_actor(),
            cause,
            now,
        )
        .map_err(translate_core_error)?;
        apply_status_change(store, &result)
    })?;

    info!(slot_id, status = %response.slot.status, "Slot verified");
    Ok(response)
}

/// Takes an ACTIVE slot out of service so it can be edited.
///
/// # Errors
///
/// Returns an error if:
/// - The actor lacks administrative rights on the slot
/// - The slot is not ACTIVE
/// - Any vehicle is still checked in
pub fn deactivate_slot(
    persistence: &mut Persistence,
    slot_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<SlotResponse, ApiError> {
    let response: SlotResponse = persistence.in_transaction(|store| {
        let slot: Slot = load_slot(store, slot_id)?;
        AuthorizationService::authorize_slot(
            store,
            authenticated_actor,
            &slot,
            AccessLevel::OwnerOrAdmin,
            "deactivate_slot",
        )?;
        let checked_in: i64 = store.count_checked_in(slot_id)?;
        let result: TransitionResult<SlotStatusChange> = parkledger::deactivate_slot(
            &slot,
            checked_in,
            authenticated_actor.to_audit_actor(),
            cause,
            now,
        )
        .map_err(translate_core_error)?;
        apply_status_change(store, &result)
    })?;

    info!(slot_id, "Slot deactivated");
    Ok(response)
}

/// Returns an INACTIVE slot to service.
///
/// # Errors
///
/// Returns an error if the actor lacks administrative rights on the slot or
/// the slot is not INACTIVE.
pub fn reactivate_slot(
    persistence: &mut Persistence,
    slot_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<SlotResponse, ApiError> {
    let response: SlotResponse = persistence.in_transaction(|store| {
        let slot: Slot = load_slot(store, slot_id)?;
        AuthorizationService::authorize_slot(
            store,
            authenticated_actor,
            &slot,
            AccessLevel::OwnerOrAdmin,
            "reactivate_slot",
        )?;
        let result: TransitionResult<SlotStatusChange> = parkledger::reactivate_slot(
            &slot,
            authenticated_actor.to_audit_actor(),
            cause,
            now,
        )
        .map_err(translate_core_error)?;
        apply_status_change(store, &result)
    })?;

    info!(slot_id, "Slot reactivated");
    Ok(response)
}

/// Soft-deletes a slot. Deleted slots behave as if they never existed.
///
/// # Errors
///
/// Returns an error if the actor lacks administrative rights on the slot or
/// any vehicle is still checked in.
pub fn delete_slot(
    persistence: &mut Persistence,
    slot_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<DeleteSlotResponse, ApiError> {
    persistence.in_transaction(|store| {
        let slot: Slot = load_slot(store, slot_id)?;
        AuthorizationService::authorize_slot(
            store,
            authenticated_actor,
            &slot,
            AccessLevel::OwnerOrAdmin,
            "delete_slot",
        )?;
        let checked_in: i64 = store.count_checked_in(slot_id)?;
        let result: TransitionResult<i64> = parkledger::delete_slot(
            &slot,
            checked_in,
            authenticated_actor.to_audit_actor(),
            cause,
            now,
        )
        .map_err(translate_core_error)?;
        store.mark_slot_deleted(result.outcome)?;
        store.persist_audit_event(&result.audit_event)?;
        Ok::<_, ApiError>(())
    })?;

    info!(slot_id, "Slot deleted");
    Ok(DeleteSlotResponse {
        slot_id,
        message: format!("Slot {slot_id} deleted"),
    })
}

/// Edits the configuration of a slot that is not ACTIVE.
///
/// Capacity, pricing and location are frozen while the slot is ACTIVE; the
/// owner deactivates it first.
///
/// # Errors
///
/// Returns an error if:
/// - The actor lacks administrative rights on the slot
/// - The slot is ACTIVE
/// - Any field is invalid, or pricing does not cover the new capacity
pub fn update_slot(
    persistence: &mut Persistence,
    slot_id: i64,
    request: &UpdateSlotRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<SlotResponse, ApiError> {
    let update: SlotConfigUpdate = SlotConfigUpdate {
        name: request.name.clone(),
        description: request.description.clone(),
        address: request.address.clone(),
        latitude: request.latitude,
        longitude: request.longitude,
        capacity: request.capacity.as_ref().map(|entries: &BTreeMap<VehicleClass, u32>| {
            CapacityMap::from_entries(entries.iter().map(|(c, n)| (*c, *n)))
        }),
        pricing_model: request.pricing_model,
        pricing_config: request.pricing_config.clone(),
        payment_timing: request.payment_timing,
    };

    let response: SlotResponse = persistence.in_transaction(|store| {
        let slot: Slot = load_slot(store, slot_id)?;
        AuthorizationService::authorize_slot(
            store,
            authenticated_actor,
            &slot,
            AccessLevel::OwnerOrAdmin,
            "update_slot",
        )?;
        let result: TransitionResult<SlotConfig> = parkledger::update_slot_config(
            &slot,
            update,
            authenticated_actor.to_audit_actor(),
            cause,
            now,
        )
        .map_err(translate_core_error)?;
        store.update_slot_config(slot_id, &result.outcome)?;
        store.persist_audit_event(&result.audit_event)?;

        let slot: Slot = load_slot(store, slot_id)?;
        let availability: Vec<ClassAvailability> = availability(&slot)?;
        Ok::<_, ApiError>(SlotResponse { slot, availability })
    })?;

    info!(slot_id, "Slot configuration updated");
    Ok(response)
}

/// Lists slots awaiting verification, oldest first. Platform administrators
/// only.
///
/// # Errors
///
/// Returns an error if the actor is not a platform administrator or the
/// page request is invalid.
pub fn list_pending_slots(
    persistence: &mut Persistence,
    config: &LedgerConfig,
    page: &PageRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<Page<SlotResponse>, ApiError> {
    AuthorizationService::authorize_platform_admin(authenticated_actor, "list_pending_slots")?;
    let window: PageWindow = config.page_window(page)?;

    persistence.read(|store| {
        let slots: Vec<Slot> = store.list_slots_by_status(
            SlotStatus::PendingVerification,
            window.limit(),
            window.offset(),
        )?;
        let items: Vec<SlotResponse> = slots
            .into_iter()
            .map(|slot| {
                let availability: Vec<ClassAvailability> = availability(&slot)?;
                Ok(SlotResponse { slot, availability })
            })
            .collect::<Result<_, ApiError>>()?;
        Ok(Page {
            items,
            page: window.page,
            page_size: window.page_size,
        })
    })
}

/// Lists the caller's own slots, newest first, in any lifecycle state.
///
/// Each slot carries the caller's resolved role. On an organization slot
/// that is the caller's membership role, which may be none if they have
/// since left the organization.
///
/// # Errors
///
/// Returns an error if the page request is invalid.
pub fn list_my_slots(
    persistence: &mut Persistence,
    config: &LedgerConfig,
    request: &ListMySlotsRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<Page<SlotDetailResponse>, ApiError> {
    let window: PageWindow = config.page_window(&request.page)?;

    persistence.read(|store| {
        let slots: Vec<Slot> = store.list_slots_for_owner(
            &authenticated_actor.id,
            request.status,
            window.limit(),
            window.offset(),
        )?;
        let mut items: Vec<SlotDetailResponse> = Vec::with_capacity(slots.len());
        for slot in slots {
            let your_role: EffectiveRole = resolve_role(store, &authenticated_actor.id, &slot)?;
            let checked_in_sessions: i64 = store.count_checked_in(slot.slot_id)?;
            let availability: Vec<ClassAvailability> = availability(&slot)?;
            items.push(SlotDetailResponse {
                slot,
                availability,
                your_role,
                checked_in_sessions,
            });
        }
        Ok::<_, ApiError>(Page {
            items,
            page: window.page,
            page_size: window.page_size,
        })
    })
}

/// Summarizes every slot the caller holds a role on, by slot id.
///
/// Candidates are the slots the caller owns, is assigned to, or that belong
/// to one of their organizations. Each is resolved with the slot's own
/// scheme and kept only if a role results, so a stale staff row on an
/// organization slot grants nothing here either.
///
/// # Errors
///
/// Returns an error if a lookup fails.
pub fn my_slot_roles(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<Vec<SlotRoleSummary>, ApiError> {
    persistence.read(|store| {
        let slot_ids: Vec<i64> = store.list_slot_ids_linked_to(&authenticated_actor.id)?;
        let mut summaries: Vec<SlotRoleSummary> = Vec::with_capacity(slot_ids.len());
        for slot_id in slot_ids {
            let slot: Slot = load_slot(store, slot_id)?;
            let your_role: EffectiveRole = resolve_role(store, &authenticated_actor.id, &slot)?;
            if your_role.role.is_none() {
                continue;
            }
            summaries.push(SlotRoleSummary {
                slot_id: slot.slot_id,
                name: slot.name,
                status: slot.status,
                organization_id: slot.organization_id,
                your_role,
            });
        }
        Ok::<_, ApiError>(summaries)
    })
}

/// Returns a slot with its availability and the caller's role on it.
///
/// # Errors
///
/// Returns an error if the slot does not exist or the actor has no
/// operational rights on it.
pub fn get_slot(
    persistence: &mut Persistence,
    slot_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<SlotDetailResponse, ApiError> {
    persistence.read(|store| {
        let slot: Slot = load_slot(store, slot_id)?;
        let your_role: EffectiveRole = AuthorizationService::authorize_slot(
            store,
            authenticated_actor,
            &slot,
            AccessLevel::StaffOrManager,
            "get_slot",
        )?;
        let checked_in_sessions: i64 = store.count_checked_in(slot_id)?;
        let availability: Vec<ClassAvailability> = availability(&slot)?;
        Ok(SlotDetailResponse {
            slot,
            availability,
            your_role,
            checked_in_sessions,
        })
    })
}

/// Returns the live availability of every capacity-bearing class.
///
/// # Errors
///
/// Returns an error if the slot does not exist, the actor has no
/// operational rights on it, or a stored counter exceeds its capacity.
pub fn slot_availability(
    persistence: &mut Persistence,
    slot_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<Vec<ClassAvailability>, ApiError> {
    persistence.read(|store| {
        let slot: Slot = load_slot(store, slot_id)?;
        AuthorizationService::authorize_slot(
            store,
            authenticated_actor,
            &slot,
            AccessLevel::StaffOrManager,
            "slot_availability",
        )?;
        availability(&slot)
    })
}

/// Compares a slot's stored counters with its live `CHECKED_IN` sessions.
///
/// This is an audit: drift is reported and logged, never repaired.
/// Platform administrators only.
///
/// # Errors
///
/// Returns an error if the actor is not a platform administrator or the
/// slot does not exist.
pub fn reconcile_occupancy(
    persistence: &mut Persistence,
    slot_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ReconciliationReport, ApiError> {
    AuthorizationService::authorize_platform_admin(authenticated_actor, "reconcile_occupancy")?;

    let report: ReconciliationReport = persistence.read(|store| {
        load_slot(store, slot_id)?;
        let rows: Vec<CapacityRow> = store.load_capacity_rows(slot_id)?;
        let mut live: BTreeMap<VehicleClass, u32> = store.count_checked_in_by_class(slot_id)?;

        let mut classes: Vec<ClassDrift> = Vec::with_capacity(rows.len());
        for row in rows {
            let vehicle_class: VehicleClass = row
                .vehicle_class
                .parse()
                .map_err(translate_domain_error)?;
            classes.push(ClassDrift {
                vehicle_class,
                capacity: counter(row.capacity, "capacity")?,
                occupied: counter(row.occupied, "occupied")?,
                checked_in: live.remove(&vehicle_class).unwrap_or(0),
            });
        }
        // Sessions in a class the slot no longer holds.
        for (vehicle_class, checked_in) in live {
            classes.push(ClassDrift {
                vehicle_class,
                capacity: 0,
                occupied: 0,
                checked_in,
            });
        }

        let has_drift: bool = classes.iter().any(ClassDrift::has_drift);
        Ok::<_, ApiError>(ReconciliationReport {
            slot_id,
            classes,
            has_drift,
        })
    })?;

    for drift in report.classes.iter().filter(|class| class.has_drift()) {
        warn!(
            slot_id,
            vehicle_class = %drift.vehicle_class,
            occupied = drift.occupied,
            checked_in = drift.checked_in,
            "Occupancy counter drift"
        );
    }
    Ok(report)
}

/// Lists the audit events recorded against a slot, oldest first.
///
/// # Errors
///
/// Returns an error if the slot does not exist or the actor lacks
/// administrative rights on it.
pub fn slot_audit_log(
    persistence: &mut Persistence,
    config: &LedgerConfig,
    slot_id: i64,
    page: &PageRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<AuditLogResponse, ApiError> {
    let window: PageWindow = config.page_window(page)?;
    persistence.read(|store| {
        let slot: Slot = load_slot(store, slot_id)?;
        AuthorizationService::authorize_slot(
            store,
            authenticated_actor,
            &slot,
            AccessLevel::OwnerOrAdmin,
            "slot_audit_log",
        )?;
        let items: Vec<AuditRecord> =
            store.list_audit_events_for_slot(slot_id, window.limit(), window.offset())?;
        Ok(AuditLogResponse {
            slot_id,
            events: Page {
                items,
                page: window.page,
                page_size: window.page_size,
            },
        })
    })
}

fn authorize_organization_admin(
    store: &mut dyn LedgerStore,
    authenticated_actor: &AuthenticatedActor,
    organization_id: i64,
) -> Result<(), ApiError> {
    let organization: Organization =
        store
            .find_organization(organization_id)?
            .ok_or_else(|| ApiError::ResourceNotFound {
                code: "ORGANIZATION_NOT_FOUND",
                resource_type: String::from("Organization"),
                message: format!("Organization {organization_id} does not exist"),
            })?;
    if organization.status == OrganizationStatus::Suspended {
        return Err(AuthError::OrganizationSuspended {
            action: String::from("create_slot"),
            organization_id,
        }
        .into());
    }

    let membership: Option<OrgMembership> =
        store.find_membership(organization_id, &authenticated_actor.id)?;
    let role: EffectiveRole = membership.map_or(EffectiveRole::NONE, |membership| {
        EffectiveRole::from_organization(membership.role)
    });
    AuthorizationService::check_level(role, AccessLevel::OwnerOrAdmin, "create_slot")?;
    Ok(())
}

fn apply_status_change(
    store: &mut dyn LedgerStore,
    result: &TransitionResult<SlotStatusChange>,
) -> Result<SlotResponse, ApiError> {
    store.update_slot_status(&result.outcome)?;
    store.persist_audit_event(&result.audit_event)?;

    let slot_id: i64 = result.outcome.slot_id;
    let slot: Slot = store
        .find_slot(slot_id)?
        .ok_or_else(|| vanished("Slot", slot_id))?;
    let availability: Vec<ClassAvailability> = availability(&slot)?;
    Ok(SlotResponse { slot, availability })
}

fn counter(value: i32, column: &str) -> Result<u32, ApiError> {
    u32::try_from(value).map_err(|_| ApiError::Internal {
        message: format!("stored {column} counter {value} is negative"),
    })
}
