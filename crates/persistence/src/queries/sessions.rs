// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use parkledger_domain::{Session, SessionStatus, VehicleClass, VehicleNumber};

use crate::data_models::SessionRow;
use crate::diesel_schema::sessions;
use crate::error::PersistenceError;

const CHECKED_IN: &str = "CHECKED_IN";

backend_fn! {
/// The vehicle's open session anywhere in the system.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_checked_in_by_vehicle(
    conn: &mut _,
    vehicle: &VehicleNumber,
) -> Result<Option<Session>, PersistenceError> {
    sessions::table
        .filter(sessions::vehicle_number.eq(vehicle.as_str()))
        .filter(sessions::status.eq(CHECKED_IN))
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?
        .map(Session::try_from)
        .transpose()
}
}

backend_fn! {
/// The vehicle's open session at one slot.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_checked_in_at_slot(
    conn: &mut _,
    slot_id: i64,
    vehicle: &VehicleNumber,
) -> Result<Option<Session>, PersistenceError> {
    sessions::table
        .filter(sessions::slot_id.eq(slot_id))
        .filter(sessions::vehicle_number.eq(vehicle.as_str()))
        .filter(sessions::status.eq(CHECKED_IN))
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?
        .map(Session::try_from)
        .transpose()
}
}

backend_fn! {
/// A session by id, whatever its status.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_session(conn: &mut _, session_id: i64) -> Result<Option<Session>, PersistenceError> {
    sessions::table
        .filter(sessions::session_id.eq(session_id))
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?
        .map(Session::try_from)
        .transpose()
}
}

backend_fn! {
/// Number of vehicles checked in at a slot.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_checked_in(conn: &mut _, slot_id: i64) -> Result<i64, PersistenceError> {
    Ok(sessions::table
        .filter(sessions::slot_id.eq(slot_id))
        .filter(sessions::status.eq(CHECKED_IN))
        .count()
        .get_result(conn)?)
}
}

backend_fn! {
/// Checked-in session counts per class, computed from the sessions
/// themselves rather than the stored counters.
///
/// # Errors
///
/// Returns an error if the query fails or a class is malformed.
pub fn count_checked_in_by_class(
    conn: &mut _,
    slot_id: i64,
) -> Result<BTreeMap<VehicleClass, u32>, PersistenceError> {
    let rows: Vec<(String, i64)> = sessions::table
        .filter(sessions::slot_id.eq(slot_id))
        .filter(sessions::status.eq(CHECKED_IN))
        .group_by(sessions::vehicle_class)
        .select((sessions::vehicle_class, count_star()))
        .load(conn)?;

    rows.into_iter()
        .map(|(class, count)| -> Result<(VehicleClass, u32), PersistenceError> {
            let class: VehicleClass = class.parse()?;
            let count: u32 = u32::try_from(count).map_err(|_| {
                PersistenceError::ReconstructionError(format!("session count {count} overflows"))
            })?;
            Ok((class, count))
        })
        .collect()
}
}

backend_fn! {
/// Sessions at a slot, newest check-in first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_sessions_for_slot(
    conn: &mut _,
    slot_id: i64,
    status: Option<SessionStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Session>, PersistenceError> {
    let rows: Vec<SessionRow> = match status {
        Some(status) => sessions::table
            .filter(sessions::slot_id.eq(slot_id))
            .filter(sessions::status.eq(status.as_str()))
            .order(sessions::session_id.desc())
            .limit(limit)
            .offset(offset)
            .select(SessionRow::as_select())
            .load(conn)?,
        None => sessions::table
            .filter(sessions::slot_id.eq(slot_id))
            .order(sessions::session_id.desc())
            .limit(limit)
            .offset(offset)
            .select(SessionRow::as_select())
            .load(conn)?,
    };

    rows.into_iter().map(Session::try_from).collect()
}
}

backend_fn! {
/// Every session of a vehicle across all slots, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_sessions_for_vehicle(
    conn: &mut _,
    vehicle: &VehicleNumber,
    limit: i64,
    offset: i64,
) -> Result<Vec<Session>, PersistenceError> {
    sessions::table
        .filter(sessions::vehicle_number.eq(vehicle.as_str()))
        .order(sessions::session_id.desc())
        .limit(limit)
        .offset(offset)
        .select(SessionRow::as_select())
        .load(conn)?
        .into_iter()
        .map(Session::try_from)
        .collect()
}
}

backend_fn! {
/// Lifetime totals for a vehicle: session count, active sessions, and
/// the sum collected on checked-out sessions in cents.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn vehicle_session_totals(
    conn: &mut _,
    vehicle: &VehicleNumber,
) -> Result<(i64, i64, i64), PersistenceError> {
    let rows: Vec<(String, i64)> = sessions::table
        .filter(sessions::vehicle_number.eq(vehicle.as_str()))
        .select((sessions::status, sessions::collected_cents))
        .load(conn)?;

    let total: i64 = i64::try_from(rows.len()).unwrap_or(i64::MAX);
    let active: i64 = i64::try_from(
        rows.iter()
            .filter(|(status, _)| status == CHECKED_IN)
            .count(),
    )
    .unwrap_or(i64::MAX);
    let spent_cents: i64 = rows
        .iter()
        .filter(|(status, _)| status == SessionStatus::CheckedOut.as_str())
        .map(|(_, collected)| *collected)
        .sum();

    Ok((total, active, spent_cents))
}
}
