// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use std::collections::BTreeSet;

use parkledger_domain::{ActorId, Slot, SlotStatus};

use crate::data_models::{CapacityRow, SlotRow};
use crate::diesel_schema::{organization_members, slot_capacity, slots, staff_assignments};
use crate::error::PersistenceError;

backend_fn! {
/// Loads a slot and its capacity ledger. Soft-deleted slots are not found.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn find_slot(conn: &mut _, slot_id: i64) -> Result<Option<Slot>, PersistenceError> {
    let row: Option<SlotRow> = slots::table
        .filter(slots::slot_id.eq(slot_id))
        .filter(slots::is_deleted.eq(0))
        .select(SlotRow::as_select())
        .first(conn)
        .optional()?;

    let Some(row) = row else {
        return Ok(None);
    };

    let capacity_rows: Vec<CapacityRow> = slot_capacity::table
        .filter(slot_capacity::slot_id.eq(slot_id))
        .select(CapacityRow::as_select())
        .load(conn)?;

    row.into_slot(&capacity_rows).map(Some)
}
}

backend_fn! {
/// Lists live slots in a status, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_slots_by_status(
    conn: &mut _,
    status: SlotStatus,
    limit: i64,
    offset: i64,
) -> Result<Vec<Slot>, PersistenceError> {
    let rows: Vec<SlotRow> = slots::table
        .filter(slots::status.eq(status.as_str()))
        .filter(slots::is_deleted.eq(0))
        .order(slots::slot_id.asc())
        .limit(limit)
        .offset(offset)
        .select(SlotRow::as_select())
        .load(conn)?;

    let slot_ids: Vec<i64> = rows.iter().map(|row| row.slot_id).collect();
    let capacity_rows: Vec<CapacityRow> = slot_capacity::table
        .filter(slot_capacity::slot_id.eq_any(slot_ids))
        .select(CapacityRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| row.into_slot(&capacity_rows))
        .collect()
}
}

backend_fn! {
/// Ids of every live slot owned by an actor.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_slot_ids_for_owner(
    conn: &mut _,
    owner: &ActorId,
) -> Result<Vec<i64>, PersistenceError> {
    Ok(slots::table
        .filter(slots::owner_id.eq(owner.as_str()))
        .filter(slots::is_deleted.eq(0))
        .order(slots::slot_id.asc())
        .select(slots::slot_id)
        .load(conn)?)
}
}

backend_fn! {
/// Lists an owner's live slots, newest first, optionally in one status.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_slots_for_owner(
    conn: &mut _,
    owner: &ActorId,
    status: Option<SlotStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Slot>, PersistenceError> {
    let mut query = slots::table
        .filter(slots::owner_id.eq(owner.as_str()))
        .filter(slots::is_deleted.eq(0))
        .into_boxed();

    if let Some(status) = status {
        query = query.filter(slots::status.eq(status.as_str()));
    }

    let rows: Vec<SlotRow> = query
        .order(slots::slot_id.desc())
        .limit(limit)
        .offset(offset)
        .select(SlotRow::as_select())
        .load(conn)?;

    let slot_ids: Vec<i64> = rows.iter().map(|row| row.slot_id).collect();
    let capacity_rows: Vec<CapacityRow> = slot_capacity::table
        .filter(slot_capacity::slot_id.eq_any(slot_ids))
        .select(CapacityRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| row.into_slot(&capacity_rows))
        .collect()
}
}

backend_fn! {
/// Ids of every live slot an actor is linked to: owned, staffed, or owned
/// by an organization they belong to. A link is not a role; callers still
/// resolve one per slot.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_slot_ids_linked_to(
    conn: &mut _,
    actor: &ActorId,
) -> Result<Vec<i64>, PersistenceError> {
    let owned: Vec<i64> = slots::table
        .filter(slots::owner_id.eq(actor.as_str()))
        .filter(slots::is_deleted.eq(0))
        .select(slots::slot_id)
        .load(conn)?;

    let staffed: Vec<i64> = staff_assignments::table
        .inner_join(slots::table)
        .filter(staff_assignments::actor_id.eq(actor.as_str()))
        .filter(slots::is_deleted.eq(0))
        .select(slots::slot_id)
        .load(conn)?;

    let organization_ids: Vec<i64> = organization_members::table
        .filter(organization_members::actor_id.eq(actor.as_str()))
        .select(organization_members::organization_id)
        .load(conn)?;
    let via_organization: Vec<i64> = slots::table
        .filter(slots::organization_id.eq_any(organization_ids))
        .filter(slots::is_deleted.eq(0))
        .select(slots::slot_id)
        .load(conn)?;

    let linked: BTreeSet<i64> = owned
        .into_iter()
        .chain(staffed)
        .chain(via_organization)
        .collect();
    Ok(linked.into_iter().collect())
}
}

backend_fn! {
/// Capacity ledger rows for a slot.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn load_capacity_rows(
    conn: &mut _,
    slot_id: i64,
) -> Result<Vec<CapacityRow>, PersistenceError> {
    Ok(slot_capacity::table
        .filter(slot_capacity::slot_id.eq(slot_id))
        .order(slot_capacity::vehicle_class.asc())
        .select(CapacityRow::as_select())
        .load(conn)?)
}
}
