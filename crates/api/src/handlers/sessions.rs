// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use parkledger::{CheckOutInput, SessionClose, TransitionResult, UnderpaymentPolicy};
use parkledger_audit::Cause;
use parkledger_domain::{
    AccessLevel, ActorId, ClassAvailability, DomainError, Due, Money, Organization,
    OrganizationStatus, Session, SessionDraft, SessionStatus, Slot, SlotStatus, VehicleClass,
    VehicleNumber, compute_fee, elapsed_hours,
};
use parkledger_persistence::{LedgerStore, Persistence, PersistenceError, VehicleTotals};
use rust_decimal::RoundingStrategy;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::{class_availability, load_slot, locate_session, vanished};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::config::{LedgerConfig, PageWindow};
use crate::error::{ApiError, AuthError, translate_core_error, translate_domain_error};
use crate::request_response::{
    CheckInRequest, CheckInResponse, CheckOutRequest, FeePreviewResponse, ListSessionsRequest,
    MarkEscapedRequest, Page, SessionCloseResponse, SessionLookup, VehicleHistoryRequest,
    VehicleHistoryResponse,
};

/// Checks a vehicle into a slot.
///
/// Checks run in a fixed order inside one transaction:
/// 1. the actor has operational rights and the slot is ACTIVE
/// 2. the slot's organization, if any, is not suspended
/// 3. the vehicle has no `CHECKED_IN` session anywhere
/// 4. the class has a free space
/// 5. the vehicle owes nothing to the slot's owner
/// 6. the capacity counter is taken atomically, conditional on a free space
///
/// Any failure after the counter is taken rolls it back with the rest of
/// the transaction.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `request` - The slot, vehicle and class
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The check-in timestamp
///
/// # Returns
///
/// * `Ok(CheckInResponse)` with the open session and the class availability
///
/// # Errors
///
/// Returns an error if:
/// - The slot does not exist or the actor has no operational rights on it
/// - The slot is not ACTIVE or its organization is suspended
/// - The vehicle number is invalid
/// - `ALREADY_CHECKED_IN`, `CAPACITY_FULL` or `OUTSTANDING_DUES_BLOCK`
pub fn check_in(
    persistence: &mut Persistence,
    request: &CheckInRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<CheckInResponse, ApiError> {
    let vehicle: VehicleNumber =
        VehicleNumber::parse(&request.vehicle_number).map_err(translate_domain_error)?;
    let vehicle_class: VehicleClass = request.vehicle_class;

    let response: CheckInResponse = persistence.in_transaction(|store| {
        let slot: Slot = load_slot(store, request.slot_id)?;
        AuthorizationService::authorize_slot(
            store,
            authenticated_actor,
            &slot,
            AccessLevel::StaffOrManager,
            "check_in",
        )?;
        if slot.status != SlotStatus::Active {
            return Err(translate_domain_error(DomainError::SlotNotActive {
                slot_id: slot.slot_id,
                status: slot.status,
            }));
        }
        ensure_organization_active(store, &slot)?;

        if let Some(open) = store.find_checked_in_by_vehicle(&vehicle)? {
            return Err(already_checked_in(store, &vehicle, open.slot_id)?);
        }

        let before: ClassAvailability = slot
            .availability_for(vehicle_class)
            .map_err(translate_domain_error)?;
        if before.available == 0 {
            return Err(capacity_full(&slot, vehicle_class));
        }

        if let Some(due) = store.find_outstanding_due(&vehicle, &slot.owner)? {
            return Err(translate_domain_error(DomainError::OutstandingDuesBlock {
                vehicle: vehicle.to_string(),
                due_id: due.due_id,
                outstanding: due.outstanding(),
            }));
        }

        if !store.try_occupy(slot.slot_id, vehicle_class)? {
            return Err(capacity_full(&slot, vehicle_class));
        }

        let vehicle_owner: Option<ActorId> = store.find_registered_owner(&vehicle)?;
        let result: TransitionResult<SessionDraft> = parkledger::open_session(
            &slot,
            vehicle.clone(),
            vehicle_class,
            vehicle_owner,
            authenticated_actor.to_audit_actor(),
            cause,
            now,
        )
        .map_err(translate_core_error)?;

        let session_id: i64 = match store.insert_session(&result.outcome) {
            Ok(id) => id,
            // Another transaction opened a session for the vehicle first.
            Err(PersistenceError::UniqueViolation(_)) => {
                return Err(translate_domain_error(DomainError::AlreadyCheckedIn {
                    vehicle: vehicle.to_string(),
                    slot_name: String::from("another slot"),
                }));
            }
            Err(err) => return Err(err.into()),
        };
        store.persist_audit_event(&result.audit_event)?;

        let session: Session = store
            .find_session(session_id)?
            .ok_or_else(|| vanished("Session", session_id))?;
        let availability: ClassAvailability =
            class_availability(store, slot.slot_id, vehicle_class)?;
        Ok(CheckInResponse {
            session,
            availability,
        })
    })?;

    info!(
        slot_id = request.slot_id,
        session_id = response.session.session_id,
        vehicle = %response.session.vehicle,
        vehicle_class = %vehicle_class,
        "Vehicle checked in"
    );
    Ok(response)
}

/// Checks a vehicle out through the payment path.
///
/// The fee is computed at `now` and the class space is released. Payment
/// status follows what was collected. Whether a shortfall also opens a due
/// is decided by [`LedgerConfig::open_due_on_underpayment`].
///
/// # Errors
///
/// Returns an error if:
/// - The session cannot be found, or its slot is gone
/// - The actor has no operational rights on the session's slot
/// - The session is no longer `CHECKED_IN`
/// - The collected amount is negative
pub fn check_out(
    persistence: &mut Persistence,
    config: &LedgerConfig,
    request: &CheckOutRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<SessionCloseResponse, ApiError> {
    let input: CheckOutInput = CheckOutInput {
        collected: request.collected,
        payment_method: request.payment_method,
        notes: request.notes.clone(),
    };
    let underpayment: UnderpaymentPolicy = config.underpayment_policy();

    let response: SessionCloseResponse = persistence.in_transaction(|store| {
        let (slot, session) =
            authorize_session(store, authenticated_actor, &request.lookup, "check_out")?;
        let result: TransitionResult<SessionClose> = parkledger::check_out(
            &slot,
            &session,
            input,
            underpayment,
            authenticated_actor.to_audit_actor(),
            cause,
            now,
        )
        .map_err(translate_core_error)?;
        apply_session_close(store, &slot, &session, &result)
    })?;

    info!(
        session_id = response.session.session_id,
        vehicle = %response.session.vehicle,
        fee = %response.session.calculated_fee,
        collected = %response.session.collected,
        payment_status = %response.session.payment_status,
        "Vehicle checked out"
    );
    Ok(response)
}

/// Records a vehicle leaving without paying.
///
/// The fee is computed at `now`, the class space is released and one due
/// for the full fee is opened against the slot owner.
///
/// # Errors
///
/// Returns an error if:
/// - The session cannot be found, or its slot is gone
/// - The actor has no operational rights on the session's slot
/// - The session is no longer `CHECKED_IN`
pub fn mark_escaped(
    persistence: &mut Persistence,
    request: &MarkEscapedRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<SessionCloseResponse, ApiError> {
    let response: SessionCloseResponse = persistence.in_transaction(|store| {
        let (slot, session) =
            authorize_session(store, authenticated_actor, &request.lookup, "mark_escaped")?;
        let result: TransitionResult<SessionClose> = parkledger::mark_escaped(
            &slot,
            &session,
            request.notes.clone(),
            authenticated_actor.to_audit_actor(),
            cause,
            now,
        )
        .map_err(translate_core_error)?;
        apply_session_close(store, &slot, &session, &result)
    })?;

    warn!(
        session_id = response.session.session_id,
        vehicle = %response.session.vehicle,
        owed = %response.session.calculated_fee,
        "Vehicle escaped without paying"
    );
    Ok(response)
}

/// Returns what check-out would charge for an open session at `now`.
///
/// # Errors
///
/// Returns an error if the session cannot be found, the actor has no
/// operational rights on its slot, or it is no longer `CHECKED_IN`.
pub fn preview_checkout_fee(
    persistence: &mut Persistence,
    lookup: &SessionLookup,
    authenticated_actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<FeePreviewResponse, ApiError> {
    persistence.read(|store| {
        let (slot, session) =
            authorize_session(store, authenticated_actor, lookup, "preview_checkout_fee")?;
        if session.status != SessionStatus::CheckedIn {
            return Err(translate_domain_error(DomainError::NotCheckedIn {
                session_id: session.session_id,
                status: session.status,
            }));
        }

        let fee: Money = compute_fee(
            &slot.pricing,
            session.vehicle_class,
            session.check_in_at,
            now,
        )
        .map_err(translate_domain_error)?;
        Ok(FeePreviewResponse {
            session_id: session.session_id,
            vehicle: session.vehicle,
            vehicle_class: session.vehicle_class,
            pricing_model: slot.pricing.model(),
            check_in_at: session.check_in_at,
            as_of: now,
            duration_hours: elapsed_hours(session.check_in_at, now)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            fee,
        })
    })
}

/// Lists a slot's sessions, newest check-in first.
///
/// # Errors
///
/// Returns an error if the slot does not exist, the actor has no
/// operational rights on it, or the page request is invalid.
pub fn list_sessions(
    persistence: &mut Persistence,
    config: &LedgerConfig,
    request: &ListSessionsRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<Page<Session>, ApiError> {
    let window: PageWindow = config.page_window(&request.page)?;
    persistence.read(|store| {
        let slot: Slot = load_slot(store, request.slot_id)?;
        AuthorizationService::authorize_slot(
            store,
            authenticated_actor,
            &slot,
            AccessLevel::StaffOrManager,
            "list_sessions",
        )?;
        let items: Vec<Session> = store.list_sessions_for_slot(
            request.slot_id,
            request.status,
            window.limit(),
            window.offset(),
        )?;
        Ok::<_, ApiError>(Page {
            items,
            page: window.page,
            page_size: window.page_size,
        })
    })
}

/// Returns a vehicle's sessions, newest first, with lifetime totals.
///
/// Any verified actor may look a vehicle up; gate staff do this before
/// admitting one.
///
/// # Errors
///
/// Returns an error if the vehicle number or page request is invalid.
pub fn vehicle_history(
    persistence: &mut Persistence,
    config: &LedgerConfig,
    request: &VehicleHistoryRequest,
    _authenticated_actor: &AuthenticatedActor,
) -> Result<VehicleHistoryResponse, ApiError> {
    let vehicle: VehicleNumber =
        VehicleNumber::parse(&request.vehicle_number).map_err(translate_domain_error)?;
    let window: PageWindow = config.page_window(&request.page)?;

    persistence.read(|store| {
        let totals: VehicleTotals = store.vehicle_totals(&vehicle)?;
        let pending: Vec<Due> = store.list_pending_dues_for_vehicle(&vehicle)?;
        let registered: bool = store.find_registered_owner(&vehicle)?.is_some();
        let items: Vec<Session> =
            store.list_sessions_for_vehicle(&vehicle, window.limit(), window.offset())?;

        Ok::<_, ApiError>(VehicleHistoryResponse {
            vehicle: vehicle.clone(),
            registered,
            total_sessions: totals.total_sessions,
            active_sessions: totals.active_sessions,
            total_spent: Money::from_cents(totals.spent_cents),
            outstanding_dues: pending.iter().map(Due::outstanding).sum(),
            sessions: Page {
                items,
                page: window.page,
                page_size: window.page_size,
            },
        })
    })
}

/// Locates a session and checks the actor's operational rights on its slot.
fn authorize_session(
    store: &mut dyn LedgerStore,
    authenticated_actor: &AuthenticatedActor,
    lookup: &SessionLookup,
    action: &str,
) -> Result<(Slot, Session), ApiError> {
    if let (Some(slot_id), None) = (lookup.slot_id, lookup.session_id) {
        // Resolve the slot first so a missing slot reads as such.
        load_slot(store, slot_id)?;
    }
    let session: Session = locate_session(store, lookup)?;
    let slot: Slot = load_slot(store, session.slot_id)?;
    AuthorizationService::authorize_slot(
        store,
        authenticated_actor,
        &slot,
        AccessLevel::StaffOrManager,
        action,
    )?;
    Ok((slot, session))
}

/// Writes a session close: the conditional status change, the capacity
/// release, the due if one was opened, and the audit event.
fn apply_session_close(
    store: &mut dyn LedgerStore,
    slot: &Slot,
    session: &Session,
    result: &TransitionResult<SessionClose>,
) -> Result<SessionCloseResponse, ApiError> {
    let close: &SessionClose = &result.outcome;
    if !store.close_session(session.session_id, &close.closure)? {
        let current: Session = store
            .find_session(session.session_id)?
            .ok_or_else(|| vanished("Session", session.session_id))?;
        return Err(translate_domain_error(DomainError::NotCheckedIn {
            session_id: current.session_id,
            status: current.status,
        }));
    }
    // A floor hit is logged by the store and does not fail the close.
    store.release(slot.slot_id, session.vehicle_class)?;

    let due: Option<Due> = match &close.due {
        Some(draft) => {
            let due_id: i64 = store.insert_due(draft)?;
            Some(store.find_due(due_id)?.ok_or_else(|| vanished("Due", due_id))?)
        }
        None => None,
    };
    store.persist_audit_event(&result.audit_event)?;

    let closed: Session = store
        .find_session(session.session_id)?
        .ok_or_else(|| vanished("Session", session.session_id))?;
    let availability: ClassAvailability =
        class_availability(store, slot.slot_id, session.vehicle_class)?;
    Ok(SessionCloseResponse {
        session: closed,
        due,
        availability,
    })
}

fn ensure_organization_active(store: &mut dyn LedgerStore, slot: &Slot) -> Result<(), ApiError> {
    let Some(organization_id) = slot.organization_id else {
        return Ok(());
    };
    let organization: Option<Organization> = store.find_organization(organization_id)?;
    if organization.is_some_and(|org| org.status == OrganizationStatus::Suspended) {
        return Err(AuthError::OrganizationSuspended {
            action: String::from("check_in"),
            organization_id,
        }
        .into());
    }
    Ok(())
}

fn already_checked_in(
    store: &mut dyn LedgerStore,
    vehicle: &VehicleNumber,
    slot_id: i64,
) -> Result<ApiError, ApiError> {
    let slot_name: String = store
        .find_slot(slot_id)?
        .map_or_else(|| format!("slot {slot_id}"), |slot| slot.name);
    Ok(translate_domain_error(DomainError::AlreadyCheckedIn {
        vehicle: vehicle.to_string(),
        slot_name,
    }))
}

fn capacity_full(slot: &Slot, vehicle_class: VehicleClass) -> ApiError {
    translate_domain_error(DomainError::CapacityFull {
        vehicle_class,
        capacity: slot.capacity.get(vehicle_class),
    })
}
