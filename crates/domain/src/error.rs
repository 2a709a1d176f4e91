// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::Money;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invoice status string is not a valid status.
    InvalidInvoiceStatus {
        /// The unrecognized status string.
        status: String,
    },
    /// Line status string is not a valid status.
    InvalidLineStatus {
        /// The unrecognized status string.
        status: String,
    },
    /// A status transition is not permitted by the lifecycle rules.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition is not permitted.
        reason: String,
    },
    /// Month period key is not a valid `YYYY-MM` value.
    InvalidMonthYear {
        /// The invalid period key.
        value: String,
    },
    /// Hour quantity must be strictly positive.
    InvalidHours {
        /// The invalid quantity in hundredths of an hour.
        centiemes: i64,
    },
    /// Unit rate must not be negative.
    InvalidRate {
        /// The invalid rate in cents.
        cents: i64,
    },
    /// A decimal amount string could not be parsed.
    InvalidAmount {
        /// The invalid amount string.
        value: String,
    },
    /// A line's stored total does not equal hours times rate.
    TotalMismatch {
        /// The recomputed total.
        expected: Money,
        /// The stored total.
        actual: Money,
    },
    /// Rejection requires a non-empty reason.
    EmptyRejectionReason,
    /// A line must carry a description.
    EmptyIntitule,
    /// A line's end time is not after its start time.
    InvalidTimeRange {
        /// The session start time.
        heure_debut: time::Time,
        /// The session end time.
        heure_fin: time::Time,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInvoiceStatus { status } => {
                write!(f, "Invalid invoice status: '{status}'")
            }
            Self::InvalidLineStatus { status } => {
                write!(f, "Invalid line status: '{status}'")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Invalid status transition from '{from}' to '{to}': {reason}")
            }
            Self::InvalidMonthYear { value } => {
                write!(f, "Invalid month period '{value}': expected YYYY-MM")
            }
            Self::InvalidHours { centiemes } => {
                write!(
                    f,
                    "Invalid hour quantity: {centiemes} hundredths. Must be greater than 0"
                )
            }
            Self::InvalidRate { cents } => {
                write!(f, "Invalid unit rate: {cents} cents. Must not be negative")
            }
            Self::InvalidAmount { value } => {
                write!(f, "Invalid decimal amount: '{value}'")
            }
            Self::TotalMismatch { expected, actual } => {
                write!(
                    f,
                    "Line total {actual} does not match hours times rate ({expected})"
                )
            }
            Self::EmptyRejectionReason => {
                write!(f, "Rejection requires a non-empty reason")
            }
            Self::EmptyIntitule => write!(f, "Line description must not be empty"),
            Self::InvalidTimeRange {
                heure_debut,
                heure_fin,
            } => {
                write!(
                    f,
                    "Session end time {heure_fin} must be after start time {heure_debut}"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
