// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the AURLOM invoicing workflow.
//!
//! This crate provides database persistence for invoices, their lines,
//! and the audit events produced by workflow transitions. It is built
//! on Diesel over `SQLite`.
//!
//! ## Transaction boundary
//!
//! Every transition runs as one serializable transaction: begin, load
//! the invoice and all sibling lines, run the pure transition engine,
//! persist the changed rows and the audit event, commit. The invoice
//! row is the lock boundary; sibling lines are always re-read inside
//! the transaction before an invoice-level flip is decided, so two
//! interleaved line approvals cannot lose an update or flip the
//! invoice twice.
//!
//! A transaction that hits a busy/locked database surfaces
//! `ConcurrencyConflict`; the transactional entry points retry once
//! with a fresh read before returning it to the caller.
//!
//! ## Testing
//!
//! Standard tests run against unique in-memory `SQLite` databases
//! (atomic counter naming, embedded migrations); no external
//! infrastructure is required.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::prelude::*;
use diesel::SqliteConnection;
use facturation::{Command, CoreError, InvoiceState, TransitionResult, apply};
use facturation_audit::{Actor, Cause};
use facturation_domain::{
    CampusId, Invoice, InvoiceId, InvoiceStatus, LineDraft, LineId, Money, MonthYear, TeacherId,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::TransitionEventRecord;
pub use error::{PersistenceError, WorkflowStoreError};

use data_models::LineRow;

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based
/// collisions. Each call to `new_in_memory()` receives a unique
/// sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// The outcome of an import upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// The invoice the import landed on.
    pub invoice_id: InvoiceId,
    /// True when an existing pending invoice had its lines replaced.
    pub replaced: bool,
}

/// Computes the pending total of a draft batch.
fn drafts_total(drafts: &[LineDraft]) -> Money {
    drafts.iter().fold(Money::ZERO, |sum, draft| {
        sum.plus(draft.quantite_heures.total_at(draft.prix_unitaire))
    })
}

/// Loads an invoice and all of its lines inside the caller's transaction.
fn load_state(
    conn: &mut SqliteConnection,
    invoice_id: InvoiceId,
) -> Result<InvoiceState, PersistenceError> {
    let invoice: Invoice = queries::invoices::load_invoice_row(conn, invoice_id)?
        .ok_or(PersistenceError::InvoiceNotFound(invoice_id.value()))?
        .into_domain()?;
    let lines = queries::invoices::load_lines_for_invoice(conn, invoice_id)?
        .into_iter()
        .map(LineRow::into_domain)
        .collect::<Result<Vec<_>, PersistenceError>>()?;
    Ok(InvoiceState::new(invoice, lines))
}

/// Persistence adapter for the invoicing workflow.
pub struct SqlitePersistence {
    conn: SqliteConnection,
}

impl SqlitePersistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        // Unique shared in-memory database name per call so tests are isolated
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("facturation_memdb_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::initialize_database(&shared_memory_url)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::initialize_database(path_str)?;

        // WAL mode improves read concurrency for file-based databases
        backend::enable_wal_mode(&mut conn)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    // ========================================================================
    // Creation & import
    // ========================================================================

    /// Creates a pending invoice with its lines in one transaction.
    ///
    /// The invoice total is the sum of the draft totals, so the
    /// aggregation invariant holds from the first committed state.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateInvoice` if an invoice already exists for the
    /// teacher and month, or another error if persistence fails.
    pub fn create_invoice(
        &mut self,
        enseignant_id: TeacherId,
        campus_id: CampusId,
        month_year: MonthYear,
        drafts: &[LineDraft],
        created_at: OffsetDateTime,
    ) -> Result<InvoiceId, PersistenceError> {
        let total: Money = drafts_total(drafts);

        self.conn
            .immediate_transaction::<InvoiceId, PersistenceError, _>(|conn| {
                let row = data_models::NewInvoiceRow::pending(
                    enseignant_id,
                    campus_id,
                    month_year,
                    total,
                    created_at,
                )?;
                let invoice_id = InvoiceId::new(mutations::invoices::insert_invoice(conn, &row)?);
                mutations::invoices::insert_lines(conn, invoice_id, drafts)?;

                info!(
                    invoice_id = invoice_id.value(),
                    enseignant_id = enseignant_id.value(),
                    month_year = %month_year,
                    line_count = drafts.len(),
                    "Created pending invoice"
                );
                Ok(invoice_id)
            })
    }

    /// Upserts an invoice for a CSV import batch.
    ///
    /// The upsert key is `(enseignant_id, month_year)`. A missing
    /// invoice is created pending; an existing pending invoice has its
    /// lines replaced and its total recomputed in the same transaction,
    /// so the aggregation invariant is never observable as violated. An
    /// invoice that has left pending refuses the import with
    /// `InvalidState`.
    ///
    /// # Errors
    ///
    /// Returns an error if the target invoice is not pending or
    /// persistence fails.
    pub fn upsert_invoice_for_import(
        &mut self,
        enseignant_id: TeacherId,
        campus_id: CampusId,
        month_year: MonthYear,
        drafts: &[LineDraft],
        now: OffsetDateTime,
    ) -> Result<ImportOutcome, WorkflowStoreError> {
        let total: Money = drafts_total(drafts);

        self.conn
            .immediate_transaction::<ImportOutcome, WorkflowStoreError, _>(|conn| {
                let existing: Option<InvoiceId> =
                    queries::invoices::find_invoice_id_by_period(conn, enseignant_id, month_year)?;

                match existing {
                    None => {
                        let row = data_models::NewInvoiceRow::pending(
                            enseignant_id,
                            campus_id,
                            month_year,
                            total,
                            now,
                        )?;
                        let invoice_id =
                            InvoiceId::new(mutations::invoices::insert_invoice(conn, &row)?);
                        mutations::invoices::insert_lines(conn, invoice_id, drafts)?;

                        info!(
                            invoice_id = invoice_id.value(),
                            month_year = %month_year,
                            "Import created pending invoice"
                        );
                        Ok(ImportOutcome {
                            invoice_id,
                            replaced: false,
                        })
                    }
                    Some(invoice_id) => {
                        let state: InvoiceState = load_state(conn, invoice_id)?;
                        if state.invoice.status != InvoiceStatus::Pending {
                            return Err(WorkflowStoreError::Core(CoreError::InvalidState {
                                entity: String::from("invoice"),
                                current: state.invoice.status.as_str().to_string(),
                                attempted: String::from("replace lines"),
                            }));
                        }

                        mutations::invoices::delete_lines_for_invoice(conn, invoice_id)?;
                        mutations::invoices::insert_lines(conn, invoice_id, drafts)?;
                        mutations::invoices::update_invoice_total(conn, invoice_id, total.cents())?;

                        info!(
                            invoice_id = invoice_id.value(),
                            month_year = %month_year,
                            line_count = drafts.len(),
                            "Import replaced lines of pending invoice"
                        );
                        Ok(ImportOutcome {
                            invoice_id,
                            replaced: true,
                        })
                    }
                }
            })
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Runs a workflow transition as one serializable transaction.
    ///
    /// Loads the invoice with all sibling lines, applies the transition
    /// engine, persists the changed rows and the audit event, and
    /// commits. A busy/locked database is retried once with a fresh
    /// read before `ConcurrencyConflict` reaches the caller.
    ///
    /// # Errors
    ///
    /// Returns the engine's refusal (`Core`) or a storage failure
    /// (`Persistence`); on any error nothing is committed.
    pub fn execute_transition(
        &mut self,
        invoice_id: InvoiceId,
        command: Command,
        actor: Actor,
        cause: Cause,
        now: OffsetDateTime,
    ) -> Result<TransitionResult, WorkflowStoreError> {
        match self.try_execute_transition(
            invoice_id,
            command.clone(),
            actor.clone(),
            cause.clone(),
            now,
        ) {
            Err(WorkflowStoreError::Persistence(PersistenceError::ConcurrencyConflict(msg))) => {
                warn!(
                    invoice_id = invoice_id.value(),
                    %msg,
                    "Transition hit a concurrent modification, retrying once"
                );
                self.try_execute_transition(invoice_id, command, actor, cause, now)
            }
            other => other,
        }
    }

    fn try_execute_transition(
        &mut self,
        invoice_id: InvoiceId,
        command: Command,
        actor: Actor,
        cause: Cause,
        now: OffsetDateTime,
    ) -> Result<TransitionResult, WorkflowStoreError> {
        self.conn
            .immediate_transaction::<TransitionResult, WorkflowStoreError, _>(|conn| {
                let state: InvoiceState = load_state(conn, invoice_id)?;
                let result: TransitionResult = apply(&state, command, actor, cause, now)?;

                if let Some(event) = &result.event {
                    mutations::invoices::update_invoice(conn, &result.new_state.invoice)?;
                    for line in &result.new_state.lines {
                        if state.find_line(line.id) != Some(line) {
                            mutations::invoices::update_line(conn, line)?;
                        }
                    }
                    let event_id: i64 = mutations::audit::insert_audit_event(conn, event)?;

                    info!(
                        invoice_id = invoice_id.value(),
                        event_id,
                        action = %event.action.name,
                        from = %event.before.invoice_status,
                        to = %event.after.invoice_status,
                        "Committed workflow transition"
                    );
                } else {
                    debug!(
                        invoice_id = invoice_id.value(),
                        "Transition was an idempotent no-op"
                    );
                }

                Ok(result)
            })
    }

    // ========================================================================
    // Read queries
    // ========================================================================

    /// Loads an invoice with all of its lines.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNotFound` if the id does not exist, or another
    /// error if the query fails.
    pub fn get_invoice_state(
        &mut self,
        invoice_id: InvoiceId,
    ) -> Result<InvoiceState, PersistenceError> {
        load_state(&mut self.conn, invoice_id)
    }

    /// Finds the invoice for a teacher and month.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_invoice_id_by_period(
        &mut self,
        enseignant_id: TeacherId,
        month_year: MonthYear,
    ) -> Result<Option<InvoiceId>, PersistenceError> {
        queries::invoices::find_invoice_id_by_period(&mut self.conn, enseignant_id, month_year)
    }

    /// Finds the owning invoice of a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_invoice_id_for_line(
        &mut self,
        line_id: LineId,
    ) -> Result<Option<InvoiceId>, PersistenceError> {
        queries::invoices::find_invoice_id_for_line(&mut self.conn, line_id)
    }

    /// Lists invoices, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_invoices(
        &mut self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, PersistenceError> {
        queries::invoices::list_invoice_rows(&mut self.conn, status.map(|s| s.as_str()))?
            .into_iter()
            .map(data_models::InvoiceRow::into_domain)
            .collect()
    }

    /// Loads the audit trail of an invoice in commit order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_events_for_invoice(
        &mut self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<TransitionEventRecord>, PersistenceError> {
        queries::audit::load_events_for_invoice(&mut self.conn, invoice_id)?
            .into_iter()
            .map(data_models::AuditEventRow::into_record)
            .collect()
    }
}
