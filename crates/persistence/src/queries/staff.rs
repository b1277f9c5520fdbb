// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use parkledger_domain::{ActorId, StaffAssignment};

use crate::data_models::StaffRow;
use crate::diesel_schema::staff_assignments;
use crate::error::PersistenceError;

backend_fn! {
/// An actor's assignment on a slot, if any.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_staff_assignment(
    conn: &mut _,
    slot_id: i64,
    actor: &ActorId,
) -> Result<Option<StaffAssignment>, PersistenceError> {
    staff_assignments::table
        .filter(staff_assignments::slot_id.eq(slot_id))
        .filter(staff_assignments::actor_id.eq(actor.as_str()))
        .select(StaffRow::as_select())
        .first(conn)
        .optional()?
        .map(StaffAssignment::try_from)
        .transpose()
}
}

backend_fn! {
/// An assignment by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_staff_assignment_by_id(
    conn: &mut _,
    assignment_id: i64,
) -> Result<Option<StaffAssignment>, PersistenceError> {
    staff_assignments::table
        .filter(staff_assignments::assignment_id.eq(assignment_id))
        .select(StaffRow::as_select())
        .first(conn)
        .optional()?
        .map(StaffAssignment::try_from)
        .transpose()
}
}

backend_fn! {
/// Every assignment on a slot, owner first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_staff(
    conn: &mut _,
    slot_id: i64,
) -> Result<Vec<StaffAssignment>, PersistenceError> {
    staff_assignments::table
        .filter(staff_assignments::slot_id.eq(slot_id))
        .order(staff_assignments::assignment_id.asc())
        .select(StaffRow::as_select())
        .load(conn)?
        .into_iter()
        .map(StaffAssignment::try_from)
        .collect()
}
}
