// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use parkledger::{DueCollection, TransitionResult};
use parkledger_audit::Cause;
use parkledger_domain::{AccessLevel, DomainError, Due, DuePayment, Money};
use parkledger_persistence::{LedgerStore, Persistence};
use time::OffsetDateTime;
use tracing::info;

use super::vanished;
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::config::{LedgerConfig, PageWindow};
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{
    CollectDueRequest, DueResponse, ListDuesRequest, Page, WriteOffDueRequest,
};

/// Takes a payment against a pending due.
///
/// Dues belong to the slot owner, not to one slot: any actor with
/// operational rights on any of the owner's slots may collect. The payment
/// is added to what was already paid; the due becomes PAID once the total
/// reaches the amount due.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `request` - The due, amount and payment details
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The payment timestamp
///
/// # Errors
///
/// Returns an error if:
/// - The due, or the linked paying session, does not exist
/// - The actor has no operational rights on any of the owner's slots
/// - The due is not PENDING
/// - The amount is not positive
pub fn collect_due(
    persistence: &mut Persistence,
    request: &CollectDueRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<DueResponse, ApiError> {
    let collection: DueCollection = DueCollection {
        amount: request.amount,
        payment_method: request.payment_method,
        payment_session_id: request.payment_session_id,
        notes: request.notes.clone(),
    };

    let response: DueResponse = persistence.in_transaction(|store| {
        let due: Due = load_due(store, request.due_id)?;
        let slot_id: i64 = AuthorizationService::authorize_owner_scope(
            store,
            authenticated_actor,
            &due.owner,
            AccessLevel::StaffOrManager,
            "collect_due",
        )?;
        if let Some(session_id) = request.payment_session_id
            && store.find_session(session_id)?.is_none()
        {
            return Err(translate_domain_error(DomainError::SessionNotFound(
                format!("id {session_id}"),
            )));
        }

        let result: TransitionResult<DuePayment> = parkledger::collect_due(
            &due,
            collection,
            authenticated_actor.to_audit_actor(),
            cause,
            Some(slot_id),
            now,
        )
        .map_err(translate_core_error)?;
        apply_due_change(store, &due, &result)
    })?;

    info!(
        due_id = response.due.due_id,
        vehicle = %response.due.vehicle,
        received = %request.amount,
        status = %response.due.status,
        "Due payment collected"
    );
    Ok(response)
}

/// Forgives a pending due.
///
/// Only administrative rights on one of the owner's slots allow this; for
/// staff-list slots that is the owner alone.
///
/// # Errors
///
/// Returns an error if the due does not exist, the actor lacks
/// administrative rights over the owner's slots, or the due is not PENDING.
pub fn write_off_due(
    persistence: &mut Persistence,
    request: &WriteOffDueRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<DueResponse, ApiError> {
    let response: DueResponse = persistence.in_transaction(|store| {
        let due: Due = load_due(store, request.due_id)?;
        if due.owner != authenticated_actor.id {
            AuthorizationService::authorize_owner_scope(
                store,
                authenticated_actor,
                &due.owner,
                AccessLevel::OwnerOrAdmin,
                "write_off_due",
            )?;
        }
        let result: TransitionResult<DuePayment> = parkledger::write_off_due(
            &due,
            request.reason.clone(),
            authenticated_actor.to_audit_actor(),
            cause,
            now,
        )
        .map_err(translate_core_error)?;
        apply_due_change(store, &due, &result)
    })?;

    info!(
        due_id = response.due.due_id,
        vehicle = %response.due.vehicle,
        "Due written off"
    );
    Ok(response)
}

/// Lists the dues owed to the calling owner, newest first.
///
/// # Errors
///
/// Returns an error if the page request is invalid.
pub fn list_dues(
    persistence: &mut Persistence,
    config: &LedgerConfig,
    request: &ListDuesRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<Page<Due>, ApiError> {
    let window: PageWindow = config.page_window(&request.page)?;
    persistence.read(|store| {
        let items: Vec<Due> = store.list_dues_for_owner(
            &authenticated_actor.id,
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

fn load_due(store: &mut dyn LedgerStore, due_id: i64) -> Result<Due, ApiError> {
    store
        .find_due(due_id)?
        .ok_or_else(|| translate_domain_error(DomainError::DueNotFound(due_id)))
}

/// Writes a due change guarded on the paid amount read at the start, so a
/// concurrent payment cannot be overwritten.
fn apply_due_change(
    store: &mut dyn LedgerStore,
    due: &Due,
    result: &TransitionResult<DuePayment>,
) -> Result<DueResponse, ApiError> {
    let expected_paid_cents: i64 = due.amount_paid.to_cents().map_err(translate_domain_error)?;
    if !store.apply_due_payment(due.due_id, expected_paid_cents, &result.outcome)? {
        let current: Due = store
            .find_due(due.due_id)?
            .ok_or_else(|| vanished("Due", due.due_id))?;
        return Err(translate_domain_error(DomainError::DueNotPending {
            due_id: current.due_id,
            status: current.status,
        }));
    }
    store.persist_audit_event(&result.audit_event)?;

    let updated: Due = store
        .find_due(due.due_id)?
        .ok_or_else(|| vanished("Due", due.due_id))?;
    let outstanding: Money = updated.outstanding();
    Ok(DueResponse {
        due: updated,
        outstanding,
    })
}
