// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for lifecycle constraint violations.
//!
//! These tests verify that invalid state transitions and wrong-state
//! operations are rejected with specific error kinds and leave no
//! partial state behind.

use crate::{Command, CoreError, InvoiceState, apply};
use facturation_domain::{DomainError, InvoiceStatus, LineId, LineStatus};
use time::macros::date;

use super::helpers::{
    create_admin_actor, create_director_actor, create_test_cause, create_pending_state, test_now,
};

fn apply_with(state: &InvoiceState, command: Command) -> Result<crate::TransitionResult, CoreError> {
    apply(
        state,
        command,
        create_admin_actor(),
        create_test_cause(),
        test_now(),
    )
}

fn prevalidated_state() -> InvoiceState {
    let state = create_pending_state(2);
    apply(
        &state,
        Command::PrevalidateInvoice { line_ids: None },
        create_director_actor(),
        create_test_cause(),
        test_now(),
    )
    .unwrap()
    .new_state
}

fn validated_state() -> InvoiceState {
    apply_with(&prevalidated_state(), Command::ValidateInvoice)
        .unwrap()
        .new_state
}

fn paid_state() -> InvoiceState {
    apply_with(
        &validated_state(),
        Command::MarkInvoicePaid {
            payment_date: date!(2026 - 03 - 05),
        },
    )
    .unwrap()
    .new_state
}

// ============================================================================
// Invalid invoice-level transitions
// ============================================================================

#[test]
fn test_validate_pending_invoice_is_invalid_state() {
    let state = create_pending_state(2);

    let err = apply_with(&state, Command::ValidateInvoice).unwrap_err();

    assert!(matches!(err, CoreError::InvalidState { .. }));
}

#[test]
fn test_mark_pending_invoice_paid_is_invalid_state() {
    let state = create_pending_state(2);

    let err = apply_with(
        &state,
        Command::MarkInvoicePaid {
            payment_date: date!(2026 - 03 - 05),
        },
    )
    .unwrap_err();

    assert!(matches!(err, CoreError::InvalidState { .. }));
}

#[test]
fn test_mark_prevalidated_invoice_paid_is_invalid_state() {
    let err = apply_with(
        &prevalidated_state(),
        Command::MarkInvoicePaid {
            payment_date: date!(2026 - 03 - 05),
        },
    )
    .unwrap_err();

    assert!(matches!(err, CoreError::InvalidState { .. }));
}

#[test]
fn test_reject_validated_invoice_is_invalid_state() {
    // Rejection is only reachable from pending or prevalidated
    let err = apply_with(
        &validated_state(),
        Command::RejectInvoice {
            reason: String::from("Trop tard"),
        },
    )
    .unwrap_err();

    assert!(matches!(err, CoreError::InvalidState { .. }));
}

#[test]
fn test_reject_paid_invoice_is_invalid_state() {
    let err = apply_with(
        &paid_state(),
        Command::RejectInvoice {
            reason: String::from("Trop tard"),
        },
    )
    .unwrap_err();

    assert!(matches!(err, CoreError::InvalidState { .. }));
}

#[test]
fn test_prevalidate_validated_invoice_is_invalid_state() {
    let err = apply_with(
        &validated_state(),
        Command::PrevalidateInvoice { line_ids: None },
    )
    .unwrap_err();

    assert!(matches!(err, CoreError::InvalidState { .. }));
}

// ============================================================================
// Invalid line-level transitions
// ============================================================================

#[test]
fn test_prevalidate_rejected_line_is_invalid_state() {
    let state = create_pending_state(2);
    let rejected = apply_with(
        &state,
        Command::RejectLine {
            line_id: LineId::new(1),
            observations: String::from("Doublon"),
        },
    )
    .unwrap()
    .new_state;

    let err = apply_with(
        &rejected,
        Command::PrevalidateLine {
            line_id: LineId::new(1),
            observations: None,
        },
    )
    .unwrap_err();

    assert!(matches!(err, CoreError::InvalidState { .. }));
}

#[test]
fn test_reject_prevalidated_line_is_invalid_state() {
    let state = create_pending_state(2);
    let approved = apply_with(
        &state,
        Command::PrevalidateLine {
            line_id: LineId::new(1),
            observations: None,
        },
    )
    .unwrap()
    .new_state;

    let err = apply_with(
        &approved,
        Command::RejectLine {
            line_id: LineId::new(1),
            observations: String::from("Erreur"),
        },
    )
    .unwrap_err();

    assert!(matches!(err, CoreError::InvalidState { .. }));
}

#[test]
fn test_line_review_on_rejected_invoice_is_invalid_state() {
    let state = create_pending_state(2);
    let rejected = apply_with(
        &state,
        Command::RejectInvoice {
            reason: String::from("Facture en double"),
        },
    )
    .unwrap()
    .new_state;

    // Lines kept their pending status, but the invoice left the review phase
    let err = apply_with(
        &rejected,
        Command::PrevalidateLine {
            line_id: LineId::new(1),
            observations: None,
        },
    )
    .unwrap_err();

    assert!(matches!(err, CoreError::InvalidState { .. }));
}

#[test]
fn test_unknown_line_is_not_found() {
    let state = create_pending_state(1);

    let err = apply_with(
        &state,
        Command::PrevalidateLine {
            line_id: LineId::new(42),
            observations: None,
        },
    )
    .unwrap_err();

    assert!(matches!(
        err,
        CoreError::LineNotFound { line_id, .. } if line_id == LineId::new(42)
    ));
}

// ============================================================================
// Input validation
// ============================================================================

#[test]
fn test_reject_invoice_with_empty_reason_is_validation_error() {
    let state = create_pending_state(2);

    let err = apply_with(
        &state,
        Command::RejectInvoice {
            reason: String::new(),
        },
    )
    .unwrap_err();

    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::EmptyRejectionReason)
    ));
}

#[test]
fn test_reject_line_with_blank_observations_is_validation_error() {
    let state = create_pending_state(2);

    let err = apply_with(
        &state,
        Command::RejectLine {
            line_id: LineId::new(1),
            observations: String::from("   "),
        },
    )
    .unwrap_err();

    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::EmptyRejectionReason)
    ));
}

#[test]
fn test_failed_rejection_leaves_no_partial_state() {
    let state = create_pending_state(2);

    let _ = apply_with(
        &state,
        Command::RejectInvoice {
            reason: String::new(),
        },
    )
    .unwrap_err();

    // The input state is untouched by construction; re-applying a valid
    // command still sees every line pending
    assert_eq!(state.invoice.status, InvoiceStatus::Pending);
    assert!(
        state
            .lines
            .iter()
            .all(|line| line.status == LineStatus::Pending)
    );
}
