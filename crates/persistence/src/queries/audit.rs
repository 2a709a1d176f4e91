// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event timeline queries.

use crate::data_models::AuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;
use diesel::prelude::*;
use facturation_domain::InvoiceId;

/// Loads the audit event rows of an invoice in commit order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn load_events_for_invoice(
    conn: &mut SqliteConnection,
    invoice_id: InvoiceId,
) -> Result<Vec<AuditEventRow>, PersistenceError> {
    audit_events::table
        .filter(audit_events::invoice_id.eq(invoice_id.value()))
        .order(audit_events::event_id.asc())
        .load::<AuditEventRow>(conn)
        .map_err(Into::into)
}
