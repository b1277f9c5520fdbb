// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use parkledger::{SlotConfig, SlotStatusChange};
use parkledger_domain::{SlotDraft, StaffRole};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{counter_to_column, format_timestamp};
use crate::diesel_schema::{slot_capacity, slots, staff_assignments};
use crate::error::PersistenceError;

backend_fn! {
/// Writes a new slot, its capacity ledger, and the owner's assignment.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub fn insert_slot(conn: &mut _, draft: &SlotDraft) -> Result<i64, PersistenceError> {
    let created_at: String = format_timestamp(draft.created_at)?;
    let pricing_json: String = serde_json::to_string(&draft.pricing)?;

    diesel::insert_into(slots::table)
        .values((
            slots::owner_id.eq(draft.owner.as_str()),
            slots::organization_id.eq(draft.organization_id),
            slots::name.eq(&draft.name),
            slots::description.eq(draft.description.as_deref()),
            slots::address.eq(&draft.address),
            slots::latitude.eq(draft.geo.latitude),
            slots::longitude.eq(draft.geo.longitude),
            slots::pricing_model.eq(draft.pricing.model().as_str()),
            slots::pricing_json.eq(&pricing_json),
            slots::payment_timing.eq(draft.payment_timing.as_str()),
            slots::status.eq("PENDING_VERIFICATION"),
            slots::is_deleted.eq(0),
            slots::created_at.eq(&created_at),
        ))
        .execute(conn)?;
    let slot_id: i64 = conn.get_last_insert_rowid()?;

    for (vehicle_class, capacity) in draft.capacity.iter() {
        diesel::insert_into(slot_capacity::table)
            .values((
                slot_capacity::slot_id.eq(slot_id),
                slot_capacity::vehicle_class.eq(vehicle_class.as_str()),
                slot_capacity::capacity.eq(counter_to_column(capacity)?),
                slot_capacity::occupied.eq(0),
            ))
            .execute(conn)?;
    }

    diesel::insert_into(staff_assignments::table)
        .values((
            staff_assignments::slot_id.eq(slot_id),
            staff_assignments::actor_id.eq(draft.owner.as_str()),
            staff_assignments::role.eq(StaffRole::Owner.as_str()),
            staff_assignments::created_at.eq(&created_at),
        ))
        .execute(conn)?;

    info!(slot_id, owner = %draft.owner, "Created slot");
    Ok(slot_id)
}
}

backend_fn! {
/// Writes a status change and its verification stamp.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_slot_status(
    conn: &mut _,
    change: &SlotStatusChange,
) -> Result<(), PersistenceError> {
    let (verified_by, verified_at, rejection_reason) = match &change.verification {
        Some(verification) => (
            Some(verification.verified_by.as_str().to_string()),
            Some(format_timestamp(verification.verified_at)?),
            verification.rejection_reason.clone(),
        ),
        None => (None, None, None),
    };

    diesel::update(slots::table.filter(slots::slot_id.eq(change.slot_id)))
        .set((
            slots::status.eq(change.status.as_str()),
            slots::verified_by.eq(verified_by),
            slots::verified_at.eq(verified_at),
            slots::rejection_reason.eq(rejection_reason),
        ))
        .execute(conn)?;

    info!(slot_id = change.slot_id, status = %change.status, "Slot status changed");
    Ok(())
}
}

backend_fn! {
/// Writes an edited configuration, reshaping the capacity ledger.
///
/// Existing counters are kept. Classes leaving the map are removed only
/// while empty; the edit is validated beforehand so this always holds.
///
/// # Errors
///
/// Returns an error if any write fails.
pub fn update_slot_config(
    conn: &mut _,
    slot_id: i64,
    config: &SlotConfig,
) -> Result<(), PersistenceError> {
    let pricing_json: String = serde_json::to_string(&config.pricing)?;

    diesel::update(slots::table.filter(slots::slot_id.eq(slot_id)))
        .set((
            slots::name.eq(&config.name),
            slots::description.eq(config.description.as_deref()),
            slots::address.eq(&config.address),
            slots::latitude.eq(config.geo.latitude),
            slots::longitude.eq(config.geo.longitude),
            slots::pricing_model.eq(config.pricing.model().as_str()),
            slots::pricing_json.eq(&pricing_json),
            slots::payment_timing.eq(config.payment_timing.as_str()),
        ))
        .execute(conn)?;

    let held: Vec<&'static str> = config.capacity.classes().map(|class| class.as_str()).collect();

    let removed: usize = diesel::delete(
        slot_capacity::table
            .filter(slot_capacity::slot_id.eq(slot_id))
            .filter(slot_capacity::vehicle_class.ne_all(held.clone()))
            .filter(slot_capacity::occupied.eq(0)),
    )
    .execute(conn)?;

    let leftover: i64 = slot_capacity::table
        .filter(slot_capacity::slot_id.eq(slot_id))
        .filter(slot_capacity::vehicle_class.ne_all(held))
        .count()
        .get_result(conn)?;
    if leftover > 0 {
        return Err(PersistenceError::InvariantViolation(format!(
            "slot {slot_id} still holds vehicles in a class being removed"
        )));
    }

    for (vehicle_class, class_capacity) in config.capacity.iter() {
        let column_capacity: i32 = counter_to_column(class_capacity)?;
        let updated: usize = diesel::update(
            slot_capacity::table
                .filter(slot_capacity::slot_id.eq(slot_id))
                .filter(slot_capacity::vehicle_class.eq(vehicle_class.as_str())),
        )
        .set(slot_capacity::capacity.eq(column_capacity))
        .execute(conn)?;

        if updated == 0 {
            diesel::insert_into(slot_capacity::table)
                .values((
                    slot_capacity::slot_id.eq(slot_id),
                    slot_capacity::vehicle_class.eq(vehicle_class.as_str()),
                    slot_capacity::capacity.eq(column_capacity),
                    slot_capacity::occupied.eq(0),
                ))
                .execute(conn)?;
        }
    }

    debug!(slot_id, removed, "Capacity ledger reshaped");
    info!(slot_id, "Slot configuration updated");
    Ok(())
}
}

backend_fn! {
/// Hides a slot from every lookup. Its history stays in place.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn mark_slot_deleted(conn: &mut _, slot_id: i64) -> Result<(), PersistenceError> {
    diesel::update(slots::table.filter(slots::slot_id.eq(slot_id)))
        .set(slots::is_deleted.eq(1))
        .execute(conn)?;

    info!(slot_id, "Slot deleted");
    Ok(())
}
}
