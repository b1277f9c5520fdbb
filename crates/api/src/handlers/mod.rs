// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operation handlers.
//!
//! Every handler resolves the actor's role, loads what it needs, applies a
//! pure transition from the core crate and writes the outcome together with
//! its audit event, all inside one store transaction. A handler that
//! returns an error leaves nothing behind.

mod dues;
mod sessions;
mod slots;
mod staff;

pub use dues::{collect_due, list_dues, write_off_due};
pub use sessions::{
    check_in, check_out, list_sessions, mark_escaped, preview_checkout_fee, vehicle_history,
};
pub use slots::{
    create_slot, deactivate_slot, delete_slot, get_slot, list_my_slots, list_pending_slots,
    my_slot_roles, reactivate_slot, reconcile_occupancy, slot_audit_log, slot_availability,
    update_slot, verify_slot,
};
pub use staff::{add_staff, list_staff, remove_staff};

use parkledger_domain::{
    ClassAvailability, DomainError, Session, Slot, VehicleClass, VehicleNumber,
};
use parkledger_persistence::LedgerStore;

use crate::error::{ApiError, translate_domain_error};
use crate::request_response::SessionLookup;

/// Loads a live slot.
fn load_slot(store: &mut dyn LedgerStore, slot_id: i64) -> Result<Slot, ApiError> {
    store
        .find_slot(slot_id)?
        .ok_or_else(|| ApiError::slot_not_found(slot_id))
}

fn availability(slot: &Slot) -> Result<Vec<ClassAvailability>, ApiError> {
    slot.availability().map_err(translate_domain_error)
}

/// Re-reads the counters for one class after a write.
fn class_availability(
    store: &mut dyn LedgerStore,
    slot_id: i64,
    vehicle_class: VehicleClass,
) -> Result<ClassAvailability, ApiError> {
    load_slot(store, slot_id)?
        .availability_for(vehicle_class)
        .map_err(translate_domain_error)
}

/// Finds the session a lookup points at.
///
/// A slot and vehicle pair only ever matches a `CHECKED_IN` session.
fn locate_session(
    store: &mut dyn LedgerStore,
    lookup: &SessionLookup,
) -> Result<Session, ApiError> {
    match (lookup.session_id, lookup.slot_id, lookup.vehicle_number.as_deref()) {
        (Some(session_id), _, _) => store.find_session(session_id)?.ok_or_else(|| {
            translate_domain_error(DomainError::SessionNotFound(format!("id {session_id}")))
        }),
        (None, Some(slot_id), Some(raw)) => {
            let vehicle: VehicleNumber =
                VehicleNumber::parse(raw).map_err(translate_domain_error)?;
            store
                .find_checked_in_at_slot(slot_id, &vehicle)?
                .ok_or_else(|| {
                    translate_domain_error(DomainError::SessionNotFound(format!(
                        "{vehicle} is not checked in at slot {slot_id}"
                    )))
                })
        }
        _ => Err(ApiError::InvalidInput {
            code: "INVALID_INPUT",
            field: String::from("session_id"),
            message: String::from("provide a session id, or a slot id and vehicle number"),
        }),
    }
}

/// An internal error for a row that vanished inside its own transaction.
fn vanished(what: &str, id: i64) -> ApiError {
    ApiError::Internal {
        message: format!("{what} {id} disappeared inside its own transaction"),
    }
}
