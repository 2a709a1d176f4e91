// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates are `YYYY-MM-DD` strings, times `HH:MM`, months `YYYY-MM`;
//! decimal amounts (`quantite_heures`, `prix_unitaire`, totals) are
//! decimal strings. Parsing into domain types happens in the handlers,
//! never in the DTOs.

/// One line of a submission or import batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemRequest {
    /// The session date (`YYYY-MM-DD`).
    pub date_cours: String,
    /// The session start time (`HH:MM`).
    pub heure_debut: String,
    /// The session end time (`HH:MM`).
    pub heure_fin: String,
    /// The campus the session was taught at.
    pub campus_id: i64,
    /// The program (filière).
    pub filiere: String,
    /// The class group.
    pub classe: String,
    /// The session description.
    pub intitule: String,
    /// Late-submission flag, informational only.
    pub retard: bool,
    /// Hour quantity as a decimal string (e.g. `1.5`).
    pub quantite_heures: String,
    /// Unit rate as a decimal euro string (e.g. `40.00`).
    pub prix_unitaire: String,
}

/// API request to submit a new monthly invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitInvoiceRequest {
    /// The owning teacher.
    pub enseignant_id: i64,
    /// The campus the invoice belongs to.
    pub campus_id: i64,
    /// The claimed month (`YYYY-MM`).
    pub month_year: String,
    /// The claimed sessions.
    pub lines: Vec<LineItemRequest>,
}

/// API response for a successful invoice submission.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubmitInvoiceResponse {
    /// The created invoice id.
    pub invoice_id: i64,
    /// The claimed month.
    pub month_year: String,
    /// The number of lines created.
    pub line_count: usize,
    /// The invoice total as a decimal euro string.
    pub total_amount: String,
    /// A success message.
    pub message: String,
}

/// API request to import (upsert) an invoice batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInvoiceRequest {
    /// The owning teacher.
    pub enseignant_id: i64,
    /// The campus the invoice belongs to.
    pub campus_id: i64,
    /// The claimed month (`YYYY-MM`).
    pub month_year: String,
    /// The imported sessions, replacing any pending lines.
    pub lines: Vec<LineItemRequest>,
}

/// API response for a successful import.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImportInvoiceResponse {
    /// The invoice the import landed on.
    pub invoice_id: i64,
    /// True when an existing pending invoice had its lines replaced.
    pub replaced: bool,
    /// The number of lines after the import.
    pub line_count: usize,
    /// The recomputed invoice total as a decimal euro string.
    pub total_amount: String,
    /// A success message.
    pub message: String,
}

/// API request to prevalidate an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrevalidateInvoiceRequest {
    /// The target invoice.
    pub invoice_id: i64,
    /// The lines to prevalidate, or `None` for all eligible lines.
    pub line_ids: Option<Vec<i64>>,
}

/// API request to prevalidate one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrevalidateLineRequest {
    /// The target line.
    pub line_id: i64,
    /// Optional reviewer note.
    pub observations: Option<String>,
}

/// API request to reject one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectLineRequest {
    /// The target line.
    pub line_id: i64,
    /// The rejection reason (mandatory).
    pub observations: String,
}

/// API request to validate a prevalidated invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateInvoiceRequest {
    /// The target invoice.
    pub invoice_id: i64,
}

/// API request to record payment of a validated invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkInvoicePaidRequest {
    /// The target invoice.
    pub invoice_id: i64,
    /// The payment date (`YYYY-MM-DD`).
    pub payment_date: String,
}

/// API request to reject an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectInvoiceRequest {
    /// The target invoice.
    pub invoice_id: i64,
    /// The rejection reason (mandatory).
    pub reason: String,
}

/// API response for a workflow transition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransitionResponse {
    /// The affected invoice.
    pub invoice_id: i64,
    /// The invoice status after the transition.
    pub status: String,
    /// The invoice total after the transition, as a decimal euro string.
    pub total_amount: String,
    /// True when the call was an idempotent repeat of a completed transition.
    pub already_applied: bool,
    /// A success message.
    pub message: String,
}

/// A line as returned to read-only consumers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LineView {
    pub line_id: i64,
    pub date_cours: String,
    pub heure_debut: String,
    pub heure_fin: String,
    pub campus_id: i64,
    pub filiere: String,
    pub classe: String,
    pub intitule: String,
    pub retard: bool,
    pub quantite_heures: String,
    pub prix_unitaire: String,
    pub total_ttc: String,
    pub status: String,
    pub prevalidated_by: Option<String>,
    pub observations: Option<String>,
}

/// An invoice with its lines, for read-only consumers (PDF/export).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InvoiceView {
    pub invoice_id: i64,
    pub enseignant_id: i64,
    pub campus_id: i64,
    pub month_year: String,
    pub status: String,
    pub total_amount: String,
    pub prevalidated_by: Option<String>,
    pub validated_by: Option<String>,
    pub paid_by: Option<String>,
    pub payment_date: Option<String>,
    pub lines: Vec<LineView>,
}

/// An invoice summary row for listings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InvoiceSummary {
    pub invoice_id: i64,
    pub enseignant_id: i64,
    pub campus_id: i64,
    pub month_year: String,
    pub status: String,
    pub total_amount: String,
}

/// A committed transition event, for audit consumers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EventView {
    pub event_id: i64,
    pub invoice_id: i64,
    pub line_id: Option<i64>,
    pub actor_id: String,
    pub actor_type: String,
    pub action: String,
    pub details: Option<String>,
    pub from_status: String,
    pub to_status: String,
    pub occurred_at: String,
}
