// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use parkledger_domain::{DueDraft, DuePayment, DueStatus};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::{format_optional_timestamp, format_timestamp};
use crate::diesel_schema::dues;
use crate::error::PersistenceError;

backend_fn! {
/// Opens a due. The unique `session_id` keeps dues one per session.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_due(conn: &mut _, draft: &DueDraft) -> Result<i64, PersistenceError> {
    diesel::insert_into(dues::table)
        .values((
            dues::vehicle_number.eq(draft.vehicle.as_str()),
            dues::owner_id.eq(draft.owner.as_str()),
            dues::session_id.eq(draft.session_id),
            dues::amount_due_cents.eq(draft.amount_due.to_cents()?),
            dues::amount_paid_cents.eq(0_i64),
            dues::status.eq(draft.status.as_str()),
            dues::created_at.eq(format_timestamp(draft.created_at)?),
            dues::paid_at.eq(format_optional_timestamp(draft.paid_at)?),
            dues::notes.eq(draft.notes.as_deref()),
        ))
        .execute(conn)?;

    let due_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        due_id,
        session_id = draft.session_id,
        vehicle = %draft.vehicle,
        amount = %draft.amount_due,
        "Due opened"
    );
    Ok(due_id)
}
}

backend_fn! {
/// Writes a payment or write-off onto a due that is still PENDING with
/// the paid amount the caller last read.
///
/// Returns `false` when the due moved underneath the caller.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn apply_due_payment(
    conn: &mut _,
    due_id: i64,
    expected_paid_cents: i64,
    payment: &DuePayment,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(
        dues::table
            .filter(dues::due_id.eq(due_id))
            .filter(dues::status.eq(DueStatus::Pending.as_str()))
            .filter(dues::amount_paid_cents.eq(expected_paid_cents)),
    )
    .set((
        dues::amount_paid_cents.eq(payment.amount_paid.to_cents()?),
        dues::status.eq(payment.status.as_str()),
        dues::paid_at.eq(format_optional_timestamp(payment.paid_at)?),
        dues::collected_by.eq(payment.collected_by.as_ref().map(|actor| actor.as_str())),
        dues::payment_method.eq(payment.payment_method.map(|method| method.as_str())),
        dues::payment_session_id.eq(payment.payment_session_id),
        dues::notes.eq(payment.notes.as_deref()),
    ))
    .execute(conn)?;

    if updated == 1 {
        info!(due_id, status = %payment.status, paid = %payment.amount_paid, "Due updated");
    }
    Ok(updated == 1)
}
}
