// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every mutating handler follows the same shape:
//! - parse and validate the request into domain types
//! - enforce the authorization policy
//! - run the transition as one transaction via the persistence adapter
//! - notify registered listeners of the committed event (fire-and-forget)
//! - translate any lower-layer error into the API contract

use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Iso8601;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};
use tracing::{info, warn};

use facturation::{Command, InvoiceState, TransitionResult};
use facturation_audit::{Cause, TransitionListeners};
use facturation_domain::{
    CampusId, Hours, InvoiceId, InvoiceLine, InvoiceStatus, LineDraft, LineId, Money, MonthYear,
    TeacherId, validate_line_draft,
};
use facturation_persistence::{ImportOutcome, SqlitePersistence, TransitionEventRecord};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::csv_import::{CsvPreviewResult, preview_lines_csv};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error,
    translate_store_error};
use crate::request_response::{
    EventView, ImportInvoiceRequest, ImportInvoiceResponse, InvoiceSummary, InvoiceView,
    LineItemRequest, LineView, MarkInvoicePaidRequest, PrevalidateInvoiceRequest,
    PrevalidateLineRequest, RejectInvoiceRequest, RejectLineRequest, SubmitInvoiceRequest,
    SubmitInvoiceResponse, TransitionResponse, ValidateInvoiceRequest,
};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

// ============================================================================
// Request parsing
// ============================================================================

fn parse_month_year(value: &str) -> Result<MonthYear, ApiError> {
    value.parse::<MonthYear>().map_err(translate_domain_error)
}

fn parse_date_field(field: &str, value: &str) -> Result<Date, ApiError> {
    Date::parse(value, &DATE_FORMAT).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("Invalid date '{value}': {e}"),
    })
}

fn parse_time_field(field: &str, value: &str) -> Result<Time, ApiError> {
    Time::parse(value, &TIME_FORMAT).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("Invalid time '{value}': {e}"),
    })
}

/// Parses one line item into a validated draft.
pub(crate) fn parse_line_item(item: &LineItemRequest) -> Result<LineDraft, ApiError> {
    let draft = LineDraft {
        date_cours: parse_date_field("date_cours", &item.date_cours)?,
        heure_debut: parse_time_field("heure_debut", &item.heure_debut)?,
        heure_fin: parse_time_field("heure_fin", &item.heure_fin)?,
        campus_id: CampusId::new(item.campus_id),
        filiere: item.filiere.clone(),
        classe: item.classe.clone(),
        intitule: item.intitule.clone(),
        retard: item.retard,
        quantite_heures: item
            .quantite_heures
            .parse::<Hours>()
            .map_err(translate_domain_error)?,
        prix_unitaire: item
            .prix_unitaire
            .parse::<Money>()
            .map_err(translate_domain_error)?,
    };
    validate_line_draft(&draft).map_err(translate_domain_error)?;
    Ok(draft)
}

fn parse_line_items(items: &[LineItemRequest]) -> Result<Vec<LineDraft>, ApiError> {
    if items.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("lines"),
            message: String::from("An invoice requires at least one line"),
        });
    }
    items.iter().map(parse_line_item).collect()
}

// ============================================================================
// View formatting
// ============================================================================

fn format_date_view(value: Date) -> Result<String, ApiError> {
    value.format(&DATE_FORMAT).map_err(|e| ApiError::Internal {
        message: format!("Failed to format date: {e}"),
    })
}

fn format_time_view(value: Time) -> Result<String, ApiError> {
    value.format(&TIME_FORMAT).map_err(|e| ApiError::Internal {
        message: format!("Failed to format time: {e}"),
    })
}

fn format_timestamp_view(value: OffsetDateTime) -> Result<String, ApiError> {
    value.format(&Iso8601::DEFAULT).map_err(|e| ApiError::Internal {
        message: format!("Failed to format timestamp: {e}"),
    })
}

fn line_view(line: &InvoiceLine) -> Result<LineView, ApiError> {
    Ok(LineView {
        line_id: line.id.value(),
        date_cours: format_date_view(line.date_cours)?,
        heure_debut: format_time_view(line.heure_debut)?,
        heure_fin: format_time_view(line.heure_fin)?,
        campus_id: line.campus_id.value(),
        filiere: line.filiere.clone(),
        classe: line.classe.clone(),
        intitule: line.intitule.clone(),
        retard: line.retard,
        quantite_heures: line.quantite_heures.to_string(),
        prix_unitaire: line.prix_unitaire.to_string(),
        total_ttc: line.total_ttc.to_string(),
        status: line.status.as_str().to_string(),
        prevalidated_by: line.prevalidated_by.clone(),
        observations: line.observations.clone(),
    })
}

fn transition_response(result: &TransitionResult, message: String) -> TransitionResponse {
    TransitionResponse {
        invoice_id: result.new_state.invoice.id.value(),
        status: result.new_state.invoice.status.as_str().to_string(),
        total_amount: result.new_state.invoice.total_amount.to_string(),
        already_applied: result.is_noop(),
        message,
    }
}

/// Notifies listeners of a committed transition, outside the transaction.
fn notify(listeners: &TransitionListeners, result: &TransitionResult) {
    if let Some(event) = &result.event {
        listeners.notify_all(event);
    }
}

// ============================================================================
// Creation & import
// ============================================================================

/// Submits a new monthly invoice for a teacher.
///
/// The invoice is created `pending` with all of its lines; submission
/// itself is not a workflow transition and produces no event.
///
/// # Errors
///
/// Returns an error if the actor is not the owning teacher, a line
/// fails validation, or an invoice already exists for the month.
pub fn submit_invoice(
    persistence: &mut SqlitePersistence,
    request: SubmitInvoiceRequest,
    actor: &AuthenticatedActor,
) -> Result<SubmitInvoiceResponse, ApiError> {
    let enseignant_id = TeacherId::new(request.enseignant_id);
    AuthorizationService::authorize_submit_invoice(actor, enseignant_id)?;

    let month_year: MonthYear = parse_month_year(&request.month_year)?;
    let drafts: Vec<LineDraft> = parse_line_items(&request.lines)?;

    let invoice_id: InvoiceId = persistence
        .create_invoice(
            enseignant_id,
            CampusId::new(request.campus_id),
            month_year,
            &drafts,
            OffsetDateTime::now_utc(),
        )
        .map_err(translate_persistence_error)?;

    let state: InvoiceState = persistence
        .get_invoice_state(invoice_id)
        .map_err(translate_persistence_error)?;

    info!(
        invoice_id = invoice_id.value(),
        enseignant_id = request.enseignant_id,
        month_year = %month_year,
        "Invoice submitted"
    );

    Ok(SubmitInvoiceResponse {
        invoice_id: invoice_id.value(),
        month_year: month_year.to_string(),
        line_count: state.lines.len(),
        total_amount: state.invoice.total_amount.to_string(),
        message: format!("Submitted invoice for {month_year}"),
    })
}

/// Imports an invoice batch, upserting on `(enseignant_id, month_year)`.
///
/// A missing invoice is created pending; an existing pending invoice
/// has its lines replaced. An invoice that has left pending refuses
/// the import.
///
/// # Errors
///
/// Returns an error if the actor fails the policy, a line fails
/// validation, or the target invoice is not pending.
pub fn import_invoice(
    persistence: &mut SqlitePersistence,
    request: ImportInvoiceRequest,
    actor: &AuthenticatedActor,
) -> Result<ImportInvoiceResponse, ApiError> {
    let enseignant_id = TeacherId::new(request.enseignant_id);
    AuthorizationService::authorize_import_invoice(actor, enseignant_id)?;

    let month_year: MonthYear = parse_month_year(&request.month_year)?;
    let drafts: Vec<LineDraft> = parse_line_items(&request.lines)?;

    let outcome: ImportOutcome = persistence
        .upsert_invoice_for_import(
            enseignant_id,
            CampusId::new(request.campus_id),
            month_year,
            &drafts,
            OffsetDateTime::now_utc(),
        )
        .map_err(translate_store_error)?;

    let state: InvoiceState = persistence
        .get_invoice_state(outcome.invoice_id)
        .map_err(translate_persistence_error)?;

    info!(
        invoice_id = outcome.invoice_id.value(),
        replaced = outcome.replaced,
        line_count = state.lines.len(),
        "Invoice batch imported"
    );

    Ok(ImportInvoiceResponse {
        invoice_id: outcome.invoice_id.value(),
        replaced: outcome.replaced,
        line_count: state.lines.len(),
        total_amount: state.invoice.total_amount.to_string(),
        message: if outcome.replaced {
            format!("Replaced lines of pending invoice for {month_year}")
        } else {
            format!("Created pending invoice for {month_year}")
        },
    })
}

/// Imports an invoice batch from CSV text.
///
/// The CSV is previewed first; a batch containing any invalid row is
/// refused without mutating anything.
///
/// # Errors
///
/// Returns an error if the CSV is malformed, any row fails validation,
/// or the import itself is refused.
pub fn import_invoice_csv(
    persistence: &mut SqlitePersistence,
    enseignant_id: i64,
    campus_id: i64,
    month_year: &str,
    csv_text: &str,
    actor: &AuthenticatedActor,
) -> Result<ImportInvoiceResponse, ApiError> {
    let teacher = TeacherId::new(enseignant_id);
    AuthorizationService::authorize_import_invoice(actor, teacher)?;

    let period: MonthYear = parse_month_year(month_year)?;
    let preview: CsvPreviewResult = preview_lines_csv(csv_text)?;

    if preview.invalid_count > 0 {
        warn!(
            invalid_count = preview.invalid_count,
            total_rows = preview.total_rows,
            "CSV import refused"
        );
        return Err(ApiError::InvalidCsvFormat {
            reason: format!(
                "{} of {} rows failed validation; nothing was imported",
                preview.invalid_count, preview.total_rows
            ),
        });
    }

    let drafts: Vec<LineDraft> = preview
        .rows
        .into_iter()
        .filter_map(|row| row.draft)
        .collect();
    if drafts.is_empty() {
        return Err(ApiError::InvalidCsvFormat {
            reason: String::from("The CSV contains no data rows"),
        });
    }

    let outcome: ImportOutcome = persistence
        .upsert_invoice_for_import(
            teacher,
            CampusId::new(campus_id),
            period,
            &drafts,
            OffsetDateTime::now_utc(),
        )
        .map_err(translate_store_error)?;

    let state: InvoiceState = persistence
        .get_invoice_state(outcome.invoice_id)
        .map_err(translate_persistence_error)?;

    Ok(ImportInvoiceResponse {
        invoice_id: outcome.invoice_id.value(),
        replaced: outcome.replaced,
        line_count: state.lines.len(),
        total_amount: state.invoice.total_amount.to_string(),
        message: if outcome.replaced {
            format!("Replaced lines of pending invoice for {period}")
        } else {
            format!("Created pending invoice for {period}")
        },
    })
}

// ============================================================================
// Invoice-level transitions
// ============================================================================

/// Prevalidates an invoice, optionally restricted to selected lines.
///
/// # Errors
///
/// Returns an error if the actor is not a director of the invoice's
/// campus, or the invoice is not pending.
pub fn prevalidate_invoice(
    persistence: &mut SqlitePersistence,
    request: PrevalidateInvoiceRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    listeners: &TransitionListeners,
) -> Result<TransitionResponse, ApiError> {
    let invoice_id = InvoiceId::new(request.invoice_id);
    let state: InvoiceState = persistence
        .get_invoice_state(invoice_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_prevalidate_invoice(actor, &state.invoice)?;

    let line_ids: Option<Vec<LineId>> = request
        .line_ids
        .map(|ids| ids.into_iter().map(LineId::new).collect());

    let result: TransitionResult = persistence
        .execute_transition(
            invoice_id,
            Command::PrevalidateInvoice { line_ids },
            actor.to_audit_actor(),
            cause,
            OffsetDateTime::now_utc(),
        )
        .map_err(translate_store_error)?;
    notify(listeners, &result);

    let message = format!(
        "Invoice {} is now '{}'",
        invoice_id.value(),
        result.new_state.invoice.status
    );
    Ok(transition_response(&result, message))
}

/// Validates a prevalidated invoice.
///
/// # Errors
///
/// Returns an error if the actor is not an accountant or admin, or the
/// invoice is not prevalidated.
pub fn validate_invoice(
    persistence: &mut SqlitePersistence,
    request: ValidateInvoiceRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    listeners: &TransitionListeners,
) -> Result<TransitionResponse, ApiError> {
    AuthorizationService::authorize_validate_invoice(actor)?;

    let invoice_id = InvoiceId::new(request.invoice_id);
    let result: TransitionResult = persistence
        .execute_transition(
            invoice_id,
            Command::ValidateInvoice,
            actor.to_audit_actor(),
            cause,
            OffsetDateTime::now_utc(),
        )
        .map_err(translate_store_error)?;
    notify(listeners, &result);

    let message = format!("Invoice {} validated", invoice_id.value());
    Ok(transition_response(&result, message))
}

/// Records payment of a validated invoice.
///
/// # Errors
///
/// Returns an error if the actor is not an accountant or admin, the
/// payment date is malformed, or the invoice is not validated.
pub fn mark_invoice_paid(
    persistence: &mut SqlitePersistence,
    request: MarkInvoicePaidRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    listeners: &TransitionListeners,
) -> Result<TransitionResponse, ApiError> {
    AuthorizationService::authorize_mark_invoice_paid(actor)?;

    let payment_date: Date = parse_date_field("payment_date", &request.payment_date)?;
    let invoice_id = InvoiceId::new(request.invoice_id);
    let result: TransitionResult = persistence
        .execute_transition(
            invoice_id,
            Command::MarkInvoicePaid { payment_date },
            actor.to_audit_actor(),
            cause,
            OffsetDateTime::now_utc(),
        )
        .map_err(translate_store_error)?;
    notify(listeners, &result);

    let message = format!("Invoice {} marked paid", invoice_id.value());
    Ok(transition_response(&result, message))
}

/// Rejects a pending or prevalidated invoice.
///
/// # Errors
///
/// Returns an error if the actor fails the policy, the reason is
/// empty, or the invoice has advanced past prevalidation.
pub fn reject_invoice(
    persistence: &mut SqlitePersistence,
    request: RejectInvoiceRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    listeners: &TransitionListeners,
) -> Result<TransitionResponse, ApiError> {
    let invoice_id = InvoiceId::new(request.invoice_id);
    let state: InvoiceState = persistence
        .get_invoice_state(invoice_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_reject_invoice(actor, &state.invoice)?;

    let result: TransitionResult = persistence
        .execute_transition(
            invoice_id,
            Command::RejectInvoice {
                reason: request.reason,
            },
            actor.to_audit_actor(),
            cause,
            OffsetDateTime::now_utc(),
        )
        .map_err(translate_store_error)?;
    notify(listeners, &result);

    let message = format!("Invoice {} rejected", invoice_id.value());
    Ok(transition_response(&result, message))
}

// ============================================================================
// Line-level transitions (director-only)
// ============================================================================

/// Resolves a line to its owning invoice state.
fn load_state_for_line(
    persistence: &mut SqlitePersistence,
    line_id: LineId,
) -> Result<(InvoiceId, InvoiceState), ApiError> {
    let invoice_id: InvoiceId = persistence
        .find_invoice_id_for_line(line_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Line"),
            message: format!("Line {} does not exist", line_id.value()),
        })?;
    let state: InvoiceState = persistence
        .get_invoice_state(invoice_id)
        .map_err(translate_persistence_error)?;
    Ok((invoice_id, state))
}

/// Prevalidates one line; the parent invoice is re-aggregated in the
/// same transaction.
///
/// # Errors
///
/// Returns an error if the actor is not a director of the line's
/// campus, or the line cannot be prevalidated.
pub fn prevalidate_line(
    persistence: &mut SqlitePersistence,
    request: PrevalidateLineRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    listeners: &TransitionListeners,
) -> Result<TransitionResponse, ApiError> {
    let line_id = LineId::new(request.line_id);
    let (invoice_id, state) = load_state_for_line(persistence, line_id)?;
    let line: &InvoiceLine = state.find_line(line_id).ok_or_else(|| {
        ApiError::ResourceNotFound {
            resource_type: String::from("Line"),
            message: format!("Line {} does not exist", line_id.value()),
        }
    })?;
    AuthorizationService::authorize_prevalidate_line(actor, line)?;

    let result: TransitionResult = persistence
        .execute_transition(
            invoice_id,
            Command::PrevalidateLine {
                line_id,
                observations: request.observations,
            },
            actor.to_audit_actor(),
            cause,
            OffsetDateTime::now_utc(),
        )
        .map_err(translate_store_error)?;
    notify(listeners, &result);

    let message = format!(
        "Line {} prevalidated; invoice {} is '{}'",
        line_id.value(),
        invoice_id.value(),
        result.new_state.invoice.status
    );
    Ok(transition_response(&result, message))
}

/// Rejects one line; the parent invoice is re-aggregated in the same
/// transaction.
///
/// # Errors
///
/// Returns an error if the actor is not a director of the line's
/// campus, the observations are empty, or the line cannot be rejected.
pub fn reject_line(
    persistence: &mut SqlitePersistence,
    request: RejectLineRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    listeners: &TransitionListeners,
) -> Result<TransitionResponse, ApiError> {
    let line_id = LineId::new(request.line_id);
    let (invoice_id, state) = load_state_for_line(persistence, line_id)?;
    let line: &InvoiceLine = state.find_line(line_id).ok_or_else(|| {
        ApiError::ResourceNotFound {
            resource_type: String::from("Line"),
            message: format!("Line {} does not exist", line_id.value()),
        }
    })?;
    AuthorizationService::authorize_reject_line(actor, line)?;

    let result: TransitionResult = persistence
        .execute_transition(
            invoice_id,
            Command::RejectLine {
                line_id,
                observations: request.observations,
            },
            actor.to_audit_actor(),
            cause,
            OffsetDateTime::now_utc(),
        )
        .map_err(translate_store_error)?;
    notify(listeners, &result);

    let message = format!(
        "Line {} rejected; invoice {} is '{}'",
        line_id.value(),
        invoice_id.value(),
        result.new_state.invoice.status
    );
    Ok(transition_response(&result, message))
}

// ============================================================================
// Read-only queries
// ============================================================================

/// Loads an invoice with its lines for read-only consumers.
///
/// Read access is intentionally broader than write access: directors
/// see cross-campus lines for context, while the action policy still
/// denies them writes outside their campus.
///
/// # Errors
///
/// Returns an error if the invoice does not exist.
pub fn get_invoice(
    persistence: &mut SqlitePersistence,
    invoice_id: i64,
) -> Result<InvoiceView, ApiError> {
    let state: InvoiceState = persistence
        .get_invoice_state(InvoiceId::new(invoice_id))
        .map_err(translate_persistence_error)?;

    let lines: Vec<LineView> = state
        .lines
        .iter()
        .map(line_view)
        .collect::<Result<Vec<LineView>, ApiError>>()?;

    Ok(InvoiceView {
        invoice_id: state.invoice.id.value(),
        enseignant_id: state.invoice.enseignant_id.value(),
        campus_id: state.invoice.campus_id.value(),
        month_year: state.invoice.month_year.to_string(),
        status: state.invoice.status.as_str().to_string(),
        total_amount: state.invoice.total_amount.to_string(),
        prevalidated_by: state.invoice.prevalidated_by.clone(),
        validated_by: state.invoice.validated_by.clone(),
        paid_by: state.invoice.paid_by.clone(),
        payment_date: state
            .invoice
            .payment_date
            .map(format_date_view)
            .transpose()?,
        lines,
    })
}

/// Lists invoices, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if the status filter is not a valid status.
pub fn list_invoices(
    persistence: &mut SqlitePersistence,
    status: Option<&str>,
) -> Result<Vec<InvoiceSummary>, ApiError> {
    let status: Option<InvoiceStatus> = status
        .map(str::parse::<InvoiceStatus>)
        .transpose()
        .map_err(translate_domain_error)?;

    let invoices = persistence
        .list_invoices(status)
        .map_err(translate_persistence_error)?;

    Ok(invoices
        .into_iter()
        .map(|invoice| InvoiceSummary {
            invoice_id: invoice.id.value(),
            enseignant_id: invoice.enseignant_id.value(),
            campus_id: invoice.campus_id.value(),
            month_year: invoice.month_year.to_string(),
            status: invoice.status.as_str().to_string(),
            total_amount: invoice.total_amount.to_string(),
        })
        .collect())
}

/// Loads the audit trail of an invoice in commit order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_invoice_events(
    persistence: &mut SqlitePersistence,
    invoice_id: i64,
) -> Result<Vec<EventView>, ApiError> {
    let records: Vec<TransitionEventRecord> = persistence
        .list_events_for_invoice(InvoiceId::new(invoice_id))
        .map_err(translate_persistence_error)?;

    records
        .into_iter()
        .map(|record| {
            Ok(EventView {
                event_id: record.event_id,
                invoice_id: record.event.invoice_id.value(),
                line_id: record.event.line_id.map(|id| id.value()),
                actor_id: record.event.actor.id.clone(),
                actor_type: record.event.actor.actor_type.clone(),
                action: record.event.action.name.clone(),
                details: record.event.action.details.clone(),
                from_status: record.event.before.invoice_status.as_str().to_string(),
                to_status: record.event.after.invoice_status.as_str().to_string(),
                occurred_at: format_timestamp_view(record.event.occurred_at)?,
            })
        })
        .collect()
}
