// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use facturation::CoreError;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// A stored row could not be mapped back to a domain entity.
    ReconstructionError(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// The requested invoice was not found.
    InvoiceNotFound(i64),
    /// The requested line was not found.
    LineNotFound(i64),
    /// An invoice already exists for this teacher and month.
    DuplicateInvoice {
        enseignant_id: i64,
        month_year: String,
    },
    /// A unique constraint was violated.
    UniqueViolation(String),
    /// The database detected a concurrent modification; the caller may retry.
    ConcurrencyConflict(String),
    /// The requested resource was not found.
    NotFound(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::ReconstructionError(msg) => {
                write!(f, "Entity reconstruction error: {msg}")
            }
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::InvoiceNotFound(id) => write!(f, "Invoice not found: {id}"),
            Self::LineNotFound(id) => write!(f, "Line not found: {id}"),
            Self::DuplicateInvoice {
                enseignant_id,
                month_year,
            } => {
                write!(
                    f,
                    "An invoice already exists for teacher {enseignant_id} in {month_year}"
                )
            }
            Self::UniqueViolation(msg) => write!(f, "Unique constraint violation: {msg}"),
            Self::ConcurrencyConflict(msg) => {
                write!(f, "Concurrent modification detected: {msg}")
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::DatabaseErrorInformation as _;

        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                info,
            ) => Self::UniqueViolation(info.message().to_string()),
            diesel::result::Error::DatabaseError(_, info)
                if info.message().contains("locked") || info.message().contains("busy") =>
            {
                Self::ConcurrencyConflict(info.message().to_string())
            }
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Errors surfaced by the transactional workflow entry points.
///
/// These operations span loading state, applying the transition engine,
/// and persisting the outcome, so either layer can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowStoreError {
    /// The transition engine refused the command.
    Core(CoreError),
    /// The storage layer failed.
    Persistence(PersistenceError),
}

impl std::fmt::Display for WorkflowStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Core(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for WorkflowStoreError {}

impl From<CoreError> for WorkflowStoreError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<PersistenceError> for WorkflowStoreError {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(err)
    }
}

impl From<diesel::result::Error> for WorkflowStoreError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Persistence(err.into())
    }
}
