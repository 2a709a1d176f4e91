// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.
//!
//! Every committed transition writes exactly one audit event row;
//! idempotent no-ops write none.

use crate::data_models::NewAuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;
use diesel::prelude::*;
use facturation_audit::TransitionEvent;
use tracing::debug;

/// Inserts an audit event and returns its assigned id.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
pub fn insert_audit_event(
    conn: &mut SqliteConnection,
    event: &TransitionEvent,
) -> Result<i64, PersistenceError> {
    let row: NewAuditEventRow = NewAuditEventRow::from_event(event)?;

    let event_id: i64 = diesel::insert_into(audit_events::table)
        .values(&row)
        .returning(audit_events::event_id)
        .get_result(conn)?;

    debug!(event_id, action = %event.action.name, "Persisted audit event");
    Ok(event_id)
}
