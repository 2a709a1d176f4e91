// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row models and serializable payloads.
//!
//! Statuses, dates, and timestamps are stored as text; amounts and hour
//! quantities as integers (cents and hundredths). Conversion back to
//! domain entities is explicit and surfaces `ReconstructionError` on any
//! stored value the domain refuses.

use crate::diesel_schema::{audit_events, invoice_lines, invoices};
use crate::error::PersistenceError;
use diesel::prelude::*;
use facturation_audit::{Action, Actor, Cause, StatusSnapshot, TransitionEvent};
use facturation_domain::{
    CampusId, Hours, Invoice, InvoiceId, InvoiceLine, InvoiceStatus, LineDraft, LineId,
    LineStatus, Money, MonthYear, TeacherId,
};
use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Iso8601;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub actor_type: String,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

/// A persisted transition event with its assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEventRecord {
    /// The event id assigned by the database.
    pub event_id: i64,
    /// The reconstructed transition event.
    pub event: TransitionEvent,
}

/// Formats a timestamp for storage.
pub(crate) fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .format(&Iso8601::DEFAULT)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Parses a stored timestamp.
pub(crate) fn parse_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Iso8601::DEFAULT)
        .map_err(|e| PersistenceError::ReconstructionError(format!("timestamp '{value}': {e}")))
}

/// Formats a calendar date for storage.
pub(crate) fn format_date(value: Date) -> Result<String, PersistenceError> {
    value
        .format(&DATE_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Parses a stored calendar date.
pub(crate) fn parse_date(value: &str) -> Result<Date, PersistenceError> {
    Date::parse(value, &DATE_FORMAT)
        .map_err(|e| PersistenceError::ReconstructionError(format!("date '{value}': {e}")))
}

/// Formats a time of day for storage.
pub(crate) fn format_time(value: Time) -> Result<String, PersistenceError> {
    value
        .format(&TIME_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Parses a stored time of day.
pub(crate) fn parse_time(value: &str) -> Result<Time, PersistenceError> {
    Time::parse(value, &TIME_FORMAT)
        .map_err(|e| PersistenceError::ReconstructionError(format!("time '{value}': {e}")))
}

fn parse_optional_timestamp(
    value: Option<String>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.as_deref().map(parse_timestamp).transpose()
}

/// A full invoice row as read from the database.
#[derive(Debug, Clone, Queryable)]
pub struct InvoiceRow {
    pub invoice_id: i64,
    pub enseignant_id: i64,
    pub campus_id: i64,
    pub month_year: String,
    pub status: String,
    pub total_amount_cents: i64,
    pub prevalidated_by: Option<String>,
    pub prevalidated_at: Option<String>,
    pub validated_by: Option<String>,
    pub validated_at: Option<String>,
    pub paid_by: Option<String>,
    pub payment_date: Option<String>,
    pub created_at: String,
}

impl InvoiceRow {
    /// Reconstructs the domain invoice from this row.
    ///
    /// # Errors
    ///
    /// Returns `ReconstructionError` if a stored value is not valid.
    pub fn into_domain(self) -> Result<Invoice, PersistenceError> {
        let status: InvoiceStatus = self
            .status
            .parse()
            .map_err(|e| PersistenceError::ReconstructionError(format!("{e}")))?;
        let month_year: MonthYear = self
            .month_year
            .parse()
            .map_err(|e| PersistenceError::ReconstructionError(format!("{e}")))?;
        let payment_date: Option<Date> = self.payment_date.as_deref().map(parse_date).transpose()?;

        Ok(Invoice {
            id: InvoiceId::new(self.invoice_id),
            enseignant_id: TeacherId::new(self.enseignant_id),
            campus_id: CampusId::new(self.campus_id),
            month_year,
            status,
            total_amount: Money::from_cents(self.total_amount_cents),
            prevalidated_by: self.prevalidated_by,
            prevalidated_at: parse_optional_timestamp(self.prevalidated_at)?,
            validated_by: self.validated_by,
            validated_at: parse_optional_timestamp(self.validated_at)?,
            paid_by: self.paid_by,
            payment_date,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Insert model for a fresh pending invoice.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invoices)]
pub struct NewInvoiceRow {
    pub enseignant_id: i64,
    pub campus_id: i64,
    pub month_year: String,
    pub status: String,
    pub total_amount_cents: i64,
    pub created_at: String,
}

impl NewInvoiceRow {
    /// Builds the insert model for a fresh pending invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the creation timestamp cannot be formatted.
    pub fn pending(
        enseignant_id: TeacherId,
        campus_id: CampusId,
        month_year: MonthYear,
        total_amount: Money,
        created_at: OffsetDateTime,
    ) -> Result<Self, PersistenceError> {
        Ok(Self {
            enseignant_id: enseignant_id.value(),
            campus_id: campus_id.value(),
            month_year: month_year.to_string(),
            status: InvoiceStatus::Pending.as_str().to_string(),
            total_amount_cents: total_amount.cents(),
            created_at: format_timestamp(created_at)?,
        })
    }
}

/// A full line row as read from the database.
#[derive(Debug, Clone, Queryable)]
pub struct LineRow {
    pub line_id: i64,
    pub invoice_id: i64,
    pub date_cours: String,
    pub heure_debut: String,
    pub heure_fin: String,
    pub campus_id: i64,
    pub filiere: String,
    pub classe: String,
    pub intitule: String,
    pub retard: i32,
    pub quantite_heures_centiemes: i64,
    pub prix_unitaire_cents: i64,
    pub total_ttc_cents: i64,
    pub status: String,
    pub prevalidated_by: Option<String>,
    pub prevalidated_at: Option<String>,
    pub observations: Option<String>,
}

impl LineRow {
    /// Reconstructs the domain line from this row.
    ///
    /// # Errors
    ///
    /// Returns `ReconstructionError` if a stored value is not valid.
    pub fn into_domain(self) -> Result<InvoiceLine, PersistenceError> {
        let status: LineStatus = self
            .status
            .parse()
            .map_err(|e| PersistenceError::ReconstructionError(format!("{e}")))?;

        Ok(InvoiceLine {
            id: LineId::new(self.line_id),
            invoice_id: InvoiceId::new(self.invoice_id),
            date_cours: parse_date(&self.date_cours)?,
            heure_debut: parse_time(&self.heure_debut)?,
            heure_fin: parse_time(&self.heure_fin)?,
            campus_id: CampusId::new(self.campus_id),
            filiere: self.filiere,
            classe: self.classe,
            intitule: self.intitule,
            retard: self.retard != 0,
            quantite_heures: Hours::from_centiemes(self.quantite_heures_centiemes),
            prix_unitaire: Money::from_cents(self.prix_unitaire_cents),
            total_ttc: Money::from_cents(self.total_ttc_cents),
            status,
            prevalidated_by: self.prevalidated_by,
            prevalidated_at: parse_optional_timestamp(self.prevalidated_at)?,
            observations: self.observations,
        })
    }
}

/// Insert model for a fresh pending line.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invoice_lines)]
pub struct NewLineRow {
    pub invoice_id: i64,
    pub date_cours: String,
    pub heure_debut: String,
    pub heure_fin: String,
    pub campus_id: i64,
    pub filiere: String,
    pub classe: String,
    pub intitule: String,
    pub retard: i32,
    pub quantite_heures_centiemes: i64,
    pub prix_unitaire_cents: i64,
    pub total_ttc_cents: i64,
    pub status: String,
}

impl NewLineRow {
    /// Builds the insert model for a pending line from a draft.
    ///
    /// # Errors
    ///
    /// Returns an error if a date or time cannot be formatted.
    pub fn from_draft(invoice_id: InvoiceId, draft: &LineDraft) -> Result<Self, PersistenceError> {
        Ok(Self {
            invoice_id: invoice_id.value(),
            date_cours: format_date(draft.date_cours)?,
            heure_debut: format_time(draft.heure_debut)?,
            heure_fin: format_time(draft.heure_fin)?,
            campus_id: draft.campus_id.value(),
            filiere: draft.filiere.clone(),
            classe: draft.classe.clone(),
            intitule: draft.intitule.clone(),
            retard: i32::from(draft.retard),
            quantite_heures_centiemes: draft.quantite_heures.centiemes(),
            prix_unitaire_cents: draft.prix_unitaire.cents(),
            total_ttc_cents: draft.quantite_heures.total_at(draft.prix_unitaire).cents(),
            status: LineStatus::Pending.as_str().to_string(),
        })
    }
}

/// A full audit event row as read from the database.
#[derive(Debug, Clone, Queryable)]
pub struct AuditEventRow {
    pub event_id: i64,
    pub invoice_id: i64,
    pub line_id: Option<i64>,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_status: String,
    pub after_status: String,
    pub before_total_cents: i64,
    pub after_total_cents: i64,
    pub occurred_at: String,
}

impl AuditEventRow {
    /// Reconstructs the transition event from this row.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored value or JSON payload is not valid.
    pub fn into_record(self) -> Result<TransitionEventRecord, PersistenceError> {
        let actor: ActorData = serde_json::from_str(&self.actor_json)?;
        let cause: CauseData = serde_json::from_str(&self.cause_json)?;
        let action: ActionData = serde_json::from_str(&self.action_json)?;
        let before_status: InvoiceStatus = self
            .before_status
            .parse()
            .map_err(|e| PersistenceError::ReconstructionError(format!("{e}")))?;
        let after_status: InvoiceStatus = self
            .after_status
            .parse()
            .map_err(|e| PersistenceError::ReconstructionError(format!("{e}")))?;

        let event: TransitionEvent = TransitionEvent::new(
            Actor::new(actor.id, actor.actor_type),
            Cause::new(cause.id, cause.description),
            Action::new(action.name, action.details),
            InvoiceId::new(self.invoice_id),
            self.line_id.map(LineId::new),
            StatusSnapshot::new(before_status, Money::from_cents(self.before_total_cents)),
            StatusSnapshot::new(after_status, Money::from_cents(self.after_total_cents)),
            parse_timestamp(&self.occurred_at)?,
        );

        Ok(TransitionEventRecord {
            event_id: self.event_id,
            event,
        })
    }
}

/// Insert model for an audit event.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_events)]
pub struct NewAuditEventRow {
    pub invoice_id: i64,
    pub line_id: Option<i64>,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_status: String,
    pub after_status: String,
    pub before_total_cents: i64,
    pub after_total_cents: i64,
    pub occurred_at: String,
}

impl NewAuditEventRow {
    /// Builds the insert model for a committed transition event.
    ///
    /// # Errors
    ///
    /// Returns an error if a payload cannot be serialized.
    pub fn from_event(event: &TransitionEvent) -> Result<Self, PersistenceError> {
        let actor_json: String = serde_json::to_string(&ActorData {
            id: event.actor.id.clone(),
            actor_type: event.actor.actor_type.clone(),
        })?;
        let cause_json: String = serde_json::to_string(&CauseData {
            id: event.cause.id.clone(),
            description: event.cause.description.clone(),
        })?;
        let action_json: String = serde_json::to_string(&ActionData {
            name: event.action.name.clone(),
            details: event.action.details.clone(),
        })?;

        Ok(Self {
            invoice_id: event.invoice_id.value(),
            line_id: event.line_id.map(|id| id.value()),
            actor_json,
            cause_json,
            action_json,
            before_status: event.before.invoice_status.as_str().to_string(),
            after_status: event.after.invoice_status.as_str().to_string(),
            before_total_cents: event.before.total_amount.cents(),
            after_total_cents: event.after.total_amount.cents(),
            occurred_at: format_timestamp(event.occurred_at)?,
        })
    }
}
