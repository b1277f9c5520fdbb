// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};

use crate::data_models::{AuditEventRow, AuditRecord};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

backend_fn! {
/// Audit events recorded against a slot, in the order they were written.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_audit_events_for_slot(
    conn: &mut _,
    slot_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<AuditRecord>, PersistenceError> {
    audit_events::table
        .filter(audit_events::slot_id.eq(slot_id))
        .order(audit_events::event_id.asc())
        .limit(limit)
        .offset(offset)
        .select(AuditEventRow::as_select())
        .load(conn)?
        .into_iter()
        .map(AuditRecord::try_from)
        .collect()
}
}
