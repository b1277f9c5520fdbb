// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use parkledger::{StaffDraft, TransitionResult};
use parkledger_audit::Cause;
use parkledger_domain::{AccessLevel, ActorId, DomainError, Slot, StaffAssignment};
use parkledger_persistence::{Persistence, PersistenceError};
use time::OffsetDateTime;
use tracing::info;

use super::{load_slot, vanished};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{AddStaffRequest, RemoveStaffResponse, StaffListResponse};

/// Adds an operator to a slot's staff list.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `slot_id` - The slot
/// * `request` - The operator and their role
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The assignment timestamp
///
/// # Errors
///
/// Returns an error if:
/// - The actor lacks administrative rights on the slot
/// - The slot is not ACTIVE or is managed through an organization
/// - The role is OWNER, or the operator is already assigned
pub fn add_staff(
    persistence: &mut Persistence,
    slot_id: i64,
    request: &AddStaffRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<StaffAssignment, ApiError> {
    let staff: ActorId = ActorId::new(request.actor_id.as_str()).map_err(translate_domain_error)?;

    let assignment: StaffAssignment = persistence.in_transaction(|store| {
        let slot: Slot = load_slot(store, slot_id)?;
        AuthorizationService::authorize_slot(
            store,
            authenticated_actor,
            &slot,
            AccessLevel::OwnerOrAdmin,
            "add_staff",
        )?;
        let existing: Option<StaffAssignment> = store.find_staff_assignment(slot_id, &staff)?;
        let result: TransitionResult<StaffDraft> = parkledger::assign_staff(
            &slot,
            existing.as_ref(),
            staff.clone(),
            request.role,
            authenticated_actor.to_audit_actor(),
            cause,
            now,
        )
        .map_err(translate_core_error)?;

        let assignment_id: i64 = match store.insert_staff(&result.outcome, now) {
            Ok(id) => id,
            Err(PersistenceError::UniqueViolation(_)) => {
                return Err(translate_domain_error(DomainError::AlreadyStaff {
                    actor: staff.to_string(),
                }));
            }
            Err(err) => return Err(err.into()),
        };
        store.persist_audit_event(&result.audit_event)?;

        store
            .find_staff_assignment_by_id(assignment_id)?
            .ok_or_else(|| vanished("Staff assignment", assignment_id))
    })?;

    info!(slot_id, staff = %assignment.actor, role = %assignment.role, "Staff added");
    Ok(assignment)
}

/// Removes an operator from a slot's staff list. The OWNER assignment is
/// permanent.
///
/// # Errors
///
/// Returns an error if:
/// - The actor lacks administrative rights on the slot
/// - The slot is not ACTIVE or is managed through an organization
/// - The assignment does not exist on this slot, or is the OWNER
pub fn remove_staff(
    persistence: &mut Persistence,
    slot_id: i64,
    assignment_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<RemoveStaffResponse, ApiError> {
    persistence.in_transaction(|store| {
        let slot: Slot = load_slot(store, slot_id)?;
        AuthorizationService::authorize_slot(
            store,
            authenticated_actor,
            &slot,
            AccessLevel::OwnerOrAdmin,
            "remove_staff",
        )?;
        let assignment: StaffAssignment = store
            .find_staff_assignment_by_id(assignment_id)?
            .ok_or_else(|| translate_domain_error(DomainError::StaffNotFound(assignment_id)))?;
        let result: TransitionResult<i64> = parkledger::remove_staff(
            &slot,
            &assignment,
            authenticated_actor.to_audit_actor(),
            cause,
            now,
        )
        .map_err(translate_core_error)?;
        store.delete_staff(result.outcome)?;
        store.persist_audit_event(&result.audit_event)?;
        Ok::<_, ApiError>(())
    })?;

    info!(slot_id, assignment_id, "Staff removed");
    Ok(RemoveStaffResponse {
        assignment_id,
        message: format!("Staff assignment {assignment_id} removed"),
    })
}

/// Lists a slot's staff, owner first.
///
/// Organization slots resolve roles through membership, so their list only
/// ever holds the OWNER entry.
///
/// # Errors
///
/// Returns an error if the slot does not exist or the actor lacks
/// administrative rights on it.
pub fn list_staff(
    persistence: &mut Persistence,
    slot_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<StaffListResponse, ApiError> {
    persistence.read(|store| {
        let slot: Slot = load_slot(store, slot_id)?;
        AuthorizationService::authorize_slot(
            store,
            authenticated_actor,
            &slot,
            AccessLevel::OwnerOrAdmin,
            "list_staff",
        )?;
        let staff: Vec<StaffAssignment> = store.list_staff(slot_id)?;
        Ok::<_, ApiError>(StaffListResponse { slot_id, staff })
    })
}
