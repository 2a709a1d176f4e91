// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use facturation_domain::{DomainError, InvoiceId, LineId};

/// Errors that can occur during workflow transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated (caller input error).
    DomainViolation(DomainError),
    /// The requested transition is not legal from the current status.
    InvalidState {
        /// The entity whose status blocks the transition ("invoice" or "line").
        entity: String,
        /// The entity's current status.
        current: String,
        /// The transition that was attempted.
        attempted: String,
    },
    /// The referenced line does not belong to the invoice.
    LineNotFound {
        /// The invoice whose state was loaded.
        invoice_id: InvoiceId,
        /// The missing line.
        line_id: LineId,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
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
            Self::LineNotFound {
                invoice_id,
                line_id,
            } => {
                write!(f, "Line {line_id} not found on invoice {invoice_id}")
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
