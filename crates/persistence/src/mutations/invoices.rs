// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invoice and line row mutations.
//!
//! Creation inserts whole rows; transitions only touch the columns the
//! workflow owns (status, stamps, totals, observations). Business
//! fields of a line are immutable once inserted.

use crate::data_models::{NewInvoiceRow, NewLineRow, format_date, format_timestamp};
use crate::diesel_schema::{invoice_lines, invoices};
use crate::error::PersistenceError;
use diesel::prelude::*;
use facturation_domain::{Invoice, InvoiceId, InvoiceLine, LineDraft};
use time::{Date, OffsetDateTime};
use tracing::debug;

fn format_optional_timestamp(
    value: Option<OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    value.map(format_timestamp).transpose()
}

fn format_optional_date(value: Option<Date>) -> Result<Option<String>, PersistenceError> {
    value.map(format_date).transpose()
}

/// Inserts a fresh pending invoice row and returns its assigned id.
///
/// # Errors
///
/// Returns `DuplicateInvoice` if an invoice already exists for the
/// teacher and month, or another error if the insert fails.
pub fn insert_invoice(
    conn: &mut SqliteConnection,
    row: &NewInvoiceRow,
) -> Result<i64, PersistenceError> {
    let invoice_id: i64 = diesel::insert_into(invoices::table)
        .values(row)
        .returning(invoices::invoice_id)
        .get_result(conn)
        .map_err(|e| match PersistenceError::from(e) {
            PersistenceError::UniqueViolation(_) => PersistenceError::DuplicateInvoice {
                enseignant_id: row.enseignant_id,
                month_year: row.month_year.clone(),
            },
            other => other,
        })?;

    debug!(invoice_id, month_year = %row.month_year, "Inserted invoice");
    Ok(invoice_id)
}

/// Bulk-inserts pending line rows for an invoice.
///
/// # Errors
///
/// Returns an error if a draft cannot be formatted or the insert fails.
pub fn insert_lines(
    conn: &mut SqliteConnection,
    invoice_id: InvoiceId,
    drafts: &[LineDraft],
) -> Result<(), PersistenceError> {
    let rows: Vec<NewLineRow> = drafts
        .iter()
        .map(|draft| NewLineRow::from_draft(invoice_id, draft))
        .collect::<Result<Vec<NewLineRow>, PersistenceError>>()?;

    diesel::insert_into(invoice_lines::table)
        .values(&rows)
        .execute(conn)?;

    debug!(
        invoice_id = invoice_id.value(),
        line_count = rows.len(),
        "Inserted invoice lines"
    );
    Ok(())
}

/// Deletes every line of an invoice (re-import of a pending invoice).
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_lines_for_invoice(
    conn: &mut SqliteConnection,
    invoice_id: InvoiceId,
) -> Result<usize, PersistenceError> {
    let deleted: usize = diesel::delete(
        invoice_lines::table.filter(invoice_lines::invoice_id.eq(invoice_id.value())),
    )
    .execute(conn)?;

    debug!(
        invoice_id = invoice_id.value(),
        deleted, "Deleted invoice lines for re-import"
    );
    Ok(deleted)
}

/// Writes the workflow-owned columns of an invoice row.
///
/// # Errors
///
/// Returns an error if a timestamp cannot be formatted or the update fails.
pub fn update_invoice(
    conn: &mut SqliteConnection,
    invoice: &Invoice,
) -> Result<(), PersistenceError> {
    diesel::update(invoices::table.filter(invoices::invoice_id.eq(invoice.id.value())))
        .set((
            invoices::status.eq(invoice.status.as_str()),
            invoices::total_amount_cents.eq(invoice.total_amount.cents()),
            invoices::prevalidated_by.eq(invoice.prevalidated_by.clone()),
            invoices::prevalidated_at.eq(format_optional_timestamp(invoice.prevalidated_at)?),
            invoices::validated_by.eq(invoice.validated_by.clone()),
            invoices::validated_at.eq(format_optional_timestamp(invoice.validated_at)?),
            invoices::paid_by.eq(invoice.paid_by.clone()),
            invoices::payment_date.eq(format_optional_date(invoice.payment_date)?),
        ))
        .execute(conn)?;
    Ok(())
}

/// Writes the workflow-owned columns of a line row.
///
/// # Errors
///
/// Returns an error if a timestamp cannot be formatted or the update fails.
pub fn update_line(
    conn: &mut SqliteConnection,
    line: &InvoiceLine,
) -> Result<(), PersistenceError> {
    diesel::update(invoice_lines::table.filter(invoice_lines::line_id.eq(line.id.value())))
        .set((
            invoice_lines::status.eq(line.status.as_str()),
            invoice_lines::prevalidated_by.eq(line.prevalidated_by.clone()),
            invoice_lines::prevalidated_at.eq(format_optional_timestamp(line.prevalidated_at)?),
            invoice_lines::observations.eq(line.observations.clone()),
        ))
        .execute(conn)?;
    Ok(())
}

/// Writes a recomputed invoice total (re-import path).
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_invoice_total(
    conn: &mut SqliteConnection,
    invoice_id: InvoiceId,
    total_cents: i64,
) -> Result<(), PersistenceError> {
    diesel::update(invoices::table.filter(invoices::invoice_id.eq(invoice_id.value())))
        .set(invoices::total_amount_cents.eq(total_cents))
        .execute(conn)?;
    Ok(())
}
