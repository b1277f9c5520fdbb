// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use parkledger::StaffDraft;
use time::OffsetDateTime;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::format_timestamp;
use crate::diesel_schema::staff_assignments;
use crate::error::PersistenceError;

backend_fn! {
/// Adds an actor to a slot's staff list.
///
/// # Errors
///
/// Returns [`PersistenceError::UniqueViolation`] if the actor is already
/// listed, or another error if the insert fails.
pub fn insert_staff(
    conn: &mut _,
    draft: &StaffDraft,
    created_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(staff_assignments::table)
        .values((
            staff_assignments::slot_id.eq(draft.slot_id),
            staff_assignments::actor_id.eq(draft.actor.as_str()),
            staff_assignments::role.eq(draft.role.as_str()),
            staff_assignments::created_at.eq(format_timestamp(created_at)?),
        ))
        .execute(conn)?;

    let assignment_id: i64 = conn.get_last_insert_rowid()?;
    info!(assignment_id, slot_id = draft.slot_id, actor = %draft.actor, "Staff added");
    Ok(assignment_id)
}
}

backend_fn! {
/// Removes an assignment.
///
/// # Errors
///
/// Returns [`PersistenceError::NotFound`] if nothing was removed.
pub fn delete_staff(conn: &mut _, assignment_id: i64) -> Result<(), PersistenceError> {
    let removed: usize = diesel::delete(
        staff_assignments::table.filter(staff_assignments::assignment_id.eq(assignment_id)),
    )
    .execute(conn)?;

    if removed == 0 {
        return Err(PersistenceError::NotFound(format!(
            "staff assignment {assignment_id}"
        )));
    }
    info!(assignment_id, "Staff removed");
    Ok(())
}
}
