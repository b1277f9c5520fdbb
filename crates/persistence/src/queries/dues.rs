// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use parkledger_domain::{ActorId, Due, DueStatus, VehicleNumber};

use crate::data_models::DueRow;
use crate::diesel_schema::dues;
use crate::error::PersistenceError;

const PENDING: &str = "PENDING";

backend_fn! {
/// The oldest PENDING due a vehicle owes to an owner, if any.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_outstanding_due(
    conn: &mut _,
    vehicle: &VehicleNumber,
    owner: &ActorId,
) -> Result<Option<Due>, PersistenceError> {
    dues::table
        .filter(dues::vehicle_number.eq(vehicle.as_str()))
        .filter(dues::owner_id.eq(owner.as_str()))
        .filter(dues::status.eq(PENDING))
        .order(dues::due_id.asc())
        .select(DueRow::as_select())
        .first(conn)
        .optional()?
        .map(Due::try_from)
        .transpose()
}
}

backend_fn! {
/// A due by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_due(conn: &mut _, due_id: i64) -> Result<Option<Due>, PersistenceError> {
    dues::table
        .filter(dues::due_id.eq(due_id))
        .select(DueRow::as_select())
        .first(conn)
        .optional()?
        .map(Due::try_from)
        .transpose()
}
}

backend_fn! {
/// Dues owed to an owner, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_dues_for_owner(
    conn: &mut _,
    owner: &ActorId,
    status: Option<DueStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Due>, PersistenceError> {
    let rows: Vec<DueRow> = match status {
        Some(status) => dues::table
            .filter(dues::owner_id.eq(owner.as_str()))
            .filter(dues::status.eq(status.as_str()))
            .order(dues::due_id.desc())
            .limit(limit)
            .offset(offset)
            .select(DueRow::as_select())
            .load(conn)?,
        None => dues::table
            .filter(dues::owner_id.eq(owner.as_str()))
            .order(dues::due_id.desc())
            .limit(limit)
            .offset(offset)
            .select(DueRow::as_select())
            .load(conn)?,
    };

    rows.into_iter().map(Due::try_from).collect()
}
}

backend_fn! {
/// Every PENDING due of a vehicle, against any owner.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_pending_dues_for_vehicle(
    conn: &mut _,
    vehicle: &VehicleNumber,
) -> Result<Vec<Due>, PersistenceError> {
    dues::table
        .filter(dues::vehicle_number.eq(vehicle.as_str()))
        .filter(dues::status.eq(PENDING))
        .order(dues::due_id.asc())
        .select(DueRow::as_select())
        .load(conn)?
        .into_iter()
        .map(Due::try_from)
        .collect()
}
}
