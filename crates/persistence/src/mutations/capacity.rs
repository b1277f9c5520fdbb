// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The capacity ledger.
//!
//! Counters are only ever changed by conditional updates evaluated inside
//! the store, so concurrent writers cannot both pass the ceiling or the
//! floor. The application never reads a counter, adds one, and writes it
//! back.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use parkledger_domain::VehicleClass;
use tracing::{debug, warn};

use crate::diesel_schema::slot_capacity;
use crate::error::PersistenceError;

backend_fn! {
/// Takes one space for a class if one is free.
///
/// Returns `false` when the class is full or not held by the slot. The
/// caller must then fail its transaction.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn try_occupy(
    conn: &mut _,
    slot_id: i64,
    vehicle_class: VehicleClass,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(
        slot_capacity::table
            .filter(slot_capacity::slot_id.eq(slot_id))
            .filter(slot_capacity::vehicle_class.eq(vehicle_class.as_str()))
            .filter(slot_capacity::occupied.lt(slot_capacity::capacity)),
    )
    .set(slot_capacity::occupied.eq(slot_capacity::occupied + 1))
    .execute(conn)?;

    debug!(slot_id, %vehicle_class, occupied = updated == 1, "try_occupy");
    Ok(updated == 1)
}
}

backend_fn! {
/// Frees one space for a class, never going below zero.
///
/// Returns `false` when the counter was already at zero. That is drift
/// worth a warning, not a failure.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn release(
    conn: &mut _,
    slot_id: i64,
    vehicle_class: VehicleClass,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(
        slot_capacity::table
            .filter(slot_capacity::slot_id.eq(slot_id))
            .filter(slot_capacity::vehicle_class.eq(vehicle_class.as_str()))
            .filter(slot_capacity::occupied.gt(0)),
    )
    .set(slot_capacity::occupied.eq(slot_capacity::occupied - 1))
    .execute(conn)?;

    if updated == 0 {
        warn!(slot_id, %vehicle_class, "Release hit the occupancy floor");
    }
    Ok(updated == 1)
}
}
