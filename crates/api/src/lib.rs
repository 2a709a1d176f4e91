// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the AURLOM invoicing workflow.
//!
//! This crate ties the pure transition engine to persistence behind
//! explicit, role-gated operations. Every mutating operation follows
//! the same shape: authorize, run the transition as one transaction,
//! notify the registered listeners of the committed event.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

mod auth;
mod csv_import;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, WorkflowTransition, can_transition};
pub use csv_import::{CsvPreviewResult, CsvRowError, CsvRowResult, CsvRowStatus, preview_lines_csv};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error, translate_store_error,
};
pub use handlers::{
    get_invoice, import_invoice, import_invoice_csv, list_invoice_events, list_invoices,
    mark_invoice_paid, prevalidate_invoice, prevalidate_line, reject_invoice, reject_line,
    submit_invoice, validate_invoice,
};
pub use request_response::{
    EventView, ImportInvoiceRequest, ImportInvoiceResponse, InvoiceSummary, InvoiceView,
    LineItemRequest, LineView, MarkInvoicePaidRequest, PrevalidateInvoiceRequest,
    PrevalidateLineRequest, RejectInvoiceRequest, RejectLineRequest, SubmitInvoiceRequest,
    SubmitInvoiceResponse, TransitionResponse, ValidateInvoiceRequest,
};
