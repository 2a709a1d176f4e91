// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invoice status tracking and transition logic.
//!
//! This module defines invoice status states and valid transitions.
//! Status transitions are actor-initiated only; the system never
//! advances an invoice based on time alone. The one derived transition
//! (a pending invoice following its lines) is computed by the
//! aggregation rule and still goes through `validate_transition`.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Invoice status states tracking an invoice through the approval workflow.
///
/// Status is tracked per invoice; lines carry their own [`crate::LineStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Submitted by the teacher, awaiting director prevalidation
    Pending,
    /// Every non-rejected line approved by the campus director
    Prevalidated,
    /// Approved by an accountant or admin
    Validated,
    /// Payment recorded; final success state
    Paid,
    /// Refused at pending or prevalidated stage; absorbing
    Rejected,
}

impl InvoiceStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Prevalidated => "prevalidated",
            Self::Validated => "validated",
            Self::Paid => "paid",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInvoiceStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "prevalidated" => Ok(Self::Prevalidated),
            "validated" => Ok(Self::Validated),
            "paid" => Ok(Self::Paid),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidInvoiceStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if this status is terminal (cannot transition to another state).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Rejected)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// The status chain is monotonic: `pending → prevalidated → validated
    /// → paid`. `rejected` is reachable from `pending` or `prevalidated`
    /// and is absorbing.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        // Cannot transition from terminal states
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        // Valid transitions based on current state
        let valid = match self {
            Self::Pending => matches!(new_status, Self::Prevalidated | Self::Rejected),
            Self::Prevalidated => matches!(new_status, Self::Validated | Self::Rejected),
            Self::Validated => matches!(new_status, Self::Paid),
            Self::Paid | Self::Rejected => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by invoice lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        let statuses = vec![
            InvoiceStatus::Pending,
            InvoiceStatus::Prevalidated,
            InvoiceStatus::Validated,
            InvoiceStatus::Paid,
            InvoiceStatus::Rejected,
        ];

        for status in statuses {
            let s = status.as_str();
            match InvoiceStatus::parse_str(s) {
                Ok(parsed) => assert_eq!(status, parsed),
                Err(e) => panic!("Failed to parse status string: {s}: {e}"),
            }
        }
    }

    #[test]
    fn test_invalid_status_string() {
        let result = InvoiceStatus::parse_str("invalid_status");
        assert!(result.is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!InvoiceStatus::Pending.is_terminal());
        assert!(!InvoiceStatus::Prevalidated.is_terminal());
        assert!(!InvoiceStatus::Validated.is_terminal());
        assert!(InvoiceStatus::Paid.is_terminal());
        assert!(InvoiceStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_valid_transitions_from_pending() {
        let current = InvoiceStatus::Pending;

        assert!(
            current
                .validate_transition(InvoiceStatus::Prevalidated)
                .is_ok()
        );
        assert!(current.validate_transition(InvoiceStatus::Rejected).is_ok());
    }

    #[test]
    fn test_invalid_transitions_from_pending() {
        let current = InvoiceStatus::Pending;

        assert!(
            current
                .validate_transition(InvoiceStatus::Validated)
                .is_err()
        );
        assert!(current.validate_transition(InvoiceStatus::Paid).is_err());
        assert!(current.validate_transition(InvoiceStatus::Pending).is_err());
    }

    #[test]
    fn test_valid_transitions_from_prevalidated() {
        let current = InvoiceStatus::Prevalidated;

        assert!(
            current
                .validate_transition(InvoiceStatus::Validated)
                .is_ok()
        );
        assert!(current.validate_transition(InvoiceStatus::Rejected).is_ok());
    }

    #[test]
    fn test_invalid_transitions_from_prevalidated() {
        let current = InvoiceStatus::Prevalidated;

        assert!(current.validate_transition(InvoiceStatus::Paid).is_err());
        assert!(current.validate_transition(InvoiceStatus::Pending).is_err());
    }

    #[test]
    fn test_valid_transitions_from_validated() {
        let current = InvoiceStatus::Validated;

        assert!(current.validate_transition(InvoiceStatus::Paid).is_ok());
    }

    #[test]
    fn test_validated_cannot_be_rejected() {
        // Rejection is only reachable from pending or prevalidated
        let current = InvoiceStatus::Validated;

        assert!(
            current
                .validate_transition(InvoiceStatus::Rejected)
                .is_err()
        );
    }

    #[test]
    fn test_no_transitions_from_terminal_states() {
        let terminal_states = vec![InvoiceStatus::Paid, InvoiceStatus::Rejected];

        for terminal in terminal_states {
            assert!(terminal.validate_transition(InvoiceStatus::Pending).is_err());
            assert!(
                terminal
                    .validate_transition(InvoiceStatus::Prevalidated)
                    .is_err()
            );
            assert!(
                terminal
                    .validate_transition(InvoiceStatus::Validated)
                    .is_err()
            );
            assert!(terminal.validate_transition(InvoiceStatus::Paid).is_err());
        }
    }
}
