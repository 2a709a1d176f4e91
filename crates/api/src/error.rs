// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use facturation::CoreError;
use facturation_domain::{CampusId, DomainError};
use facturation_persistence::{PersistenceError, WorkflowStoreError};

/// Authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The actor's role does not permit the action.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A director attempted to act outside their campus.
    CampusMismatch {
        /// The action that was attempted.
        action: String,
        /// The campus of the target entity.
        target_campus: CampusId,
        /// The actor's own campus, if any.
        actor_campus: Option<CampusId>,
    },
    /// A teacher attempted to act on another teacher's invoice.
    NotOwner {
        /// The action that was attempted.
        action: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::CampusMismatch {
                action,
                target_campus,
                actor_campus,
            } => match actor_campus {
                Some(actor_campus) => write!(
                    f,
                    "Unauthorized: '{action}' targets campus {target_campus} but the actor is scoped to campus {actor_campus}"
                ),
                None => write!(
                    f,
                    "Unauthorized: '{action}' targets campus {target_campus} but the actor has no campus scope"
                ),
            },
            Self::NotOwner { action } => {
                write!(
                    f,
                    "Unauthorized: '{action}' is limited to the owning teacher"
                )
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API
/// contract: the calling layer surfaces the kind plus the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// A human-readable description of the denial.
        message: String,
    },
    /// The transition is not legal from the entity's current status.
    InvalidState {
        /// The entity whose status blocks the transition.
        entity: String,
        /// The entity's current status.
        current: String,
        /// The transition that was attempted.
        attempted: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A concurrent modification or uniqueness conflict; the caller may retry.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The CSV payload is malformed.
    InvalidCsvFormat {
        /// A human-readable description of the format problem.
        reason: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized { action, message } => {
                write!(f, "Unauthorized '{action}': {message}")
            }
            Self::InvalidState {
                entity,
                current,
                attempted,
            } => {
                write!(
                    f,
                    "Cannot {attempted}: {entity} is in status '{current}'"
                )
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::InvalidCsvFormat { reason } => {
                write!(f, "Invalid CSV format: {reason}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let action: String = match &err {
            AuthError::Unauthorized { action, .. }
            | AuthError::CampusMismatch { action, .. }
            | AuthError::NotOwner { action } => action.clone(),
        };
        Self::Unauthorized {
            action,
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidInvoiceStatus { status } => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Invalid invoice status: '{status}'"),
        },
        DomainError::InvalidLineStatus { status } => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Invalid line status: '{status}'"),
        },
        DomainError::InvalidStatusTransition { from, to, reason } => ApiError::InvalidState {
            entity: String::from("invoice"),
            current: from,
            attempted: format!("transition to '{to}' ({reason})"),
        },
        DomainError::InvalidMonthYear { value } => ApiError::InvalidInput {
            field: String::from("month_year"),
            message: format!("Invalid month period '{value}': expected YYYY-MM"),
        },
        DomainError::InvalidHours { centiemes } => ApiError::InvalidInput {
            field: String::from("quantite_heures"),
            message: format!(
                "Invalid hour quantity: {centiemes} hundredths. Must be greater than 0"
            ),
        },
        DomainError::InvalidRate { cents } => ApiError::InvalidInput {
            field: String::from("prix_unitaire"),
            message: format!("Invalid unit rate: {cents} cents. Must not be negative"),
        },
        DomainError::InvalidAmount { value } => ApiError::InvalidInput {
            field: String::from("amount"),
            message: format!("Invalid decimal amount: '{value}'"),
        },
        DomainError::TotalMismatch { expected, actual } => ApiError::InvalidInput {
            field: String::from("total_ttc"),
            message: format!("Line total {actual} does not match hours times rate ({expected})"),
        },
        DomainError::EmptyRejectionReason => ApiError::InvalidInput {
            field: String::from("reason"),
            message: String::from("Rejection requires a non-empty reason"),
        },
        DomainError::EmptyIntitule => ApiError::InvalidInput {
            field: String::from("intitule"),
            message: String::from("Line description must not be empty"),
        },
        DomainError::InvalidTimeRange {
            heure_debut,
            heure_fin,
        } => ApiError::InvalidInput {
            field: String::from("heure_fin"),
            message: format!(
                "Session end time {heure_fin} must be after start time {heure_debut}"
            ),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::InvalidState {
            entity,
            current,
            attempted,
        } => ApiError::InvalidState {
            entity,
            current,
            attempted,
        },
        CoreError::LineNotFound {
            invoice_id,
            line_id,
        } => ApiError::ResourceNotFound {
            resource_type: String::from("Line"),
            message: format!("Line {line_id} does not belong to invoice {invoice_id}"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// This translation is explicit and ensures persistence errors are not leaked directly.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::InvoiceNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Invoice"),
            message: format!("Invoice {id} does not exist"),
        },
        PersistenceError::LineNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Line"),
            message: format!("Line {id} does not exist"),
        },
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message,
        },
        PersistenceError::DuplicateInvoice {
            enseignant_id,
            month_year,
        } => ApiError::Conflict {
            message: format!(
                "An invoice already exists for teacher {enseignant_id} in {month_year}"
            ),
        },
        PersistenceError::ConcurrencyConflict(message) => ApiError::Conflict { message },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}

/// Translates a workflow store error into an API error.
#[must_use]
pub fn translate_store_error(err: WorkflowStoreError) -> ApiError {
    match err {
        WorkflowStoreError::Core(core_err) => translate_core_error(core_err),
        WorkflowStoreError::Persistence(persistence_err) => {
            translate_persistence_error(persistence_err)
        }
    }
}
