// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use parkledger_domain::{PaymentStatus, SessionClosure, SessionDraft, SessionStatus};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::format_timestamp;
use crate::diesel_schema::sessions;
use crate::error::PersistenceError;

backend_fn! {
/// Opens a session row.
///
/// A second open session for the same vehicle is refused by the
/// checked-in unique index with [`PersistenceError::UniqueViolation`].
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_session(conn: &mut _, draft: &SessionDraft) -> Result<i64, PersistenceError> {
    diesel::insert_into(sessions::table)
        .values((
            sessions::slot_id.eq(draft.slot_id),
            sessions::vehicle_number.eq(draft.vehicle.as_str()),
            sessions::vehicle_class.eq(draft.vehicle_class.as_str()),
            sessions::vehicle_owner_id.eq(draft.vehicle_owner.as_ref().map(|owner| owner.as_str())),
            sessions::checked_in_by.eq(draft.checked_in_by.as_str()),
            sessions::check_in_at.eq(format_timestamp(draft.check_in_at)?),
            sessions::status.eq(SessionStatus::CheckedIn.as_str()),
            sessions::calculated_fee_cents.eq(0_i64),
            sessions::collected_cents.eq(0_i64),
            sessions::payment_status.eq(PaymentStatus::Pending.as_str()),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        session_id,
        slot_id = draft.slot_id,
        vehicle = %draft.vehicle,
        vehicle_class = %draft.vehicle_class,
        "Vehicle checked in"
    );
    Ok(session_id)
}
}

backend_fn! {
/// Closes a session if it is still open.
///
/// Returns `false` when another writer closed it first.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn close_session(
    conn: &mut _,
    session_id: i64,
    closure: &SessionClosure,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(
        sessions::table
            .filter(sessions::session_id.eq(session_id))
            .filter(sessions::status.eq(SessionStatus::CheckedIn.as_str())),
    )
    .set((
        sessions::status.eq(closure.status.as_str()),
        sessions::checked_out_by.eq(closure.closed_by.as_str()),
        sessions::check_out_at.eq(format_timestamp(closure.closed_at)?),
        sessions::calculated_fee_cents.eq(closure.calculated_fee.to_cents()?),
        sessions::collected_cents.eq(closure.collected.to_cents()?),
        sessions::payment_method.eq(closure.payment_method.map(|method| method.as_str())),
        sessions::payment_status.eq(closure.payment_status.as_str()),
        sessions::notes.eq(closure.notes.as_deref()),
    ))
    .execute(conn)?;

    if updated == 1 {
        info!(
            session_id,
            status = %closure.status,
            fee = %closure.calculated_fee,
            "Session closed"
        );
    }
    Ok(updated == 1)
}
}
