// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invoice and line lookups.

use crate::data_models::{InvoiceRow, LineRow};
use crate::diesel_schema::{invoice_lines, invoices};
use crate::error::PersistenceError;
use diesel::prelude::*;
use facturation_domain::{InvoiceId, LineId, MonthYear, TeacherId};

/// Loads one invoice row by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn load_invoice_row(
    conn: &mut SqliteConnection,
    invoice_id: InvoiceId,
) -> Result<Option<InvoiceRow>, PersistenceError> {
    invoices::table
        .filter(invoices::invoice_id.eq(invoice_id.value()))
        .first::<InvoiceRow>(conn)
        .optional()
        .map_err(Into::into)
}

/// Loads every line of an invoice in id order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn load_lines_for_invoice(
    conn: &mut SqliteConnection,
    invoice_id: InvoiceId,
) -> Result<Vec<LineRow>, PersistenceError> {
    invoice_lines::table
        .filter(invoice_lines::invoice_id.eq(invoice_id.value()))
        .order(invoice_lines::line_id.asc())
        .load::<LineRow>(conn)
        .map_err(Into::into)
}

/// Finds the invoice for a teacher and month, the import upsert key.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_invoice_id_by_period(
    conn: &mut SqliteConnection,
    enseignant_id: TeacherId,
    month_year: MonthYear,
) -> Result<Option<InvoiceId>, PersistenceError> {
    invoices::table
        .filter(invoices::enseignant_id.eq(enseignant_id.value()))
        .filter(invoices::month_year.eq(month_year.to_string()))
        .select(invoices::invoice_id)
        .first::<i64>(conn)
        .optional()
        .map(|id| id.map(InvoiceId::new))
        .map_err(Into::into)
}

/// Finds the owning invoice of a line.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_invoice_id_for_line(
    conn: &mut SqliteConnection,
    line_id: LineId,
) -> Result<Option<InvoiceId>, PersistenceError> {
    invoice_lines::table
        .filter(invoice_lines::line_id.eq(line_id.value()))
        .select(invoice_lines::invoice_id)
        .first::<i64>(conn)
        .optional()
        .map(|id| id.map(InvoiceId::new))
        .map_err(Into::into)
}

/// Lists invoice rows, optionally filtered by status, in id order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_invoice_rows(
    conn: &mut SqliteConnection,
    status: Option<&str>,
) -> Result<Vec<InvoiceRow>, PersistenceError> {
    let mut query = invoices::table.into_boxed();
    if let Some(status) = status {
        query = query.filter(invoices::status.eq(status.to_string()));
    }
    query
        .order(invoices::invoice_id.asc())
        .load::<InvoiceRow>(conn)
        .map_err(Into::into)
}
