// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the transition operations and the aggregation rule.

use crate::{Command, InvoiceState, TransitionResult, apply};
use facturation_domain::{InvoiceStatus, LineId, LineStatus, Money};
use time::macros::date;

use super::helpers::{
    assert_total_invariant, create_admin_actor, create_director_actor, create_test_cause,
    create_pending_state, test_now,
};

fn apply_ok(state: &InvoiceState, command: Command) -> TransitionResult {
    apply(
        state,
        command,
        create_director_actor(),
        create_test_cause(),
        test_now(),
    )
    .expect("transition should succeed")
}

fn apply_admin_ok(state: &InvoiceState, command: Command) -> TransitionResult {
    apply(
        state,
        command,
        create_admin_actor(),
        create_test_cause(),
        test_now(),
    )
    .expect("transition should succeed")
}

// ============================================================================
// Line-by-line prevalidation
// ============================================================================

#[test]
fn test_invoice_stays_pending_until_last_line_prevalidated() {
    let state = create_pending_state(3);

    // Director prevalidates two of the three lines individually
    let result = apply_ok(
        &state,
        Command::PrevalidateLine {
            line_id: LineId::new(1),
            observations: None,
        },
    );
    assert_eq!(result.new_state.invoice.status, InvoiceStatus::Pending);
    assert_total_invariant(&result.new_state);

    let result = apply_ok(
        &result.new_state,
        Command::PrevalidateLine {
            line_id: LineId::new(2),
            observations: None,
        },
    );
    assert_eq!(result.new_state.invoice.status, InvoiceStatus::Pending);
    assert!(result.new_state.invoice.prevalidated_by.is_none());

    // The third line completes the set; the invoice follows
    let result = apply_ok(
        &result.new_state,
        Command::PrevalidateLine {
            line_id: LineId::new(3),
            observations: None,
        },
    );
    assert_eq!(result.new_state.invoice.status, InvoiceStatus::Prevalidated);
    assert_eq!(
        result.new_state.invoice.prevalidated_by.as_deref(),
        Some("directeur-3")
    );
    assert_eq!(
        result.new_state.invoice.prevalidated_at,
        Some(test_now())
    );
    assert_total_invariant(&result.new_state);

    let event = result.event.expect("flip must produce an event");
    assert_eq!(event.before.invoice_status, InvoiceStatus::Pending);
    assert_eq!(event.after.invoice_status, InvoiceStatus::Prevalidated);
    assert_eq!(event.line_id, Some(LineId::new(3)));
}

#[test]
fn test_invoice_flips_exactly_once_across_last_two_lines() {
    let state = create_pending_state(3);

    let first = apply_ok(
        &state,
        Command::PrevalidateLine {
            line_id: LineId::new(1),
            observations: None,
        },
    );

    // The two remaining lines are approved back to back; only the
    // second approval carries the invoice-level flip
    let second = apply_ok(
        &first.new_state,
        Command::PrevalidateLine {
            line_id: LineId::new(2),
            observations: None,
        },
    );
    let third = apply_ok(
        &second.new_state,
        Command::PrevalidateLine {
            line_id: LineId::new(3),
            observations: None,
        },
    );

    let flips: usize = [&first, &second, &third]
        .iter()
        .filter_map(|r| r.event.as_ref())
        .filter(|e| e.changed_invoice_status())
        .count();
    assert_eq!(flips, 1);
    assert_eq!(third.new_state.invoice.status, InvoiceStatus::Prevalidated);
}

#[test]
fn test_prevalidate_line_records_observations() {
    let state = create_pending_state(1);

    let result = apply_ok(
        &state,
        Command::PrevalidateLine {
            line_id: LineId::new(1),
            observations: Some(String::from("Heures conformes au planning")),
        },
    );

    let line = &result.new_state.lines[0];
    assert_eq!(line.status, LineStatus::Prevalidated);
    assert_eq!(line.prevalidated_by.as_deref(), Some("directeur-3"));
    assert_eq!(
        line.observations.as_deref(),
        Some("Heures conformes au planning")
    );
}

// ============================================================================
// Invoice-level prevalidation
// ============================================================================

#[test]
fn test_prevalidate_invoice_without_line_ids_takes_all_lines() {
    let state = create_pending_state(3);

    let result = apply_ok(&state, Command::PrevalidateInvoice { line_ids: None });

    assert_eq!(result.new_state.invoice.status, InvoiceStatus::Prevalidated);
    assert!(
        result
            .new_state
            .lines
            .iter()
            .all(|line| line.status == LineStatus::Prevalidated)
    );
    assert_total_invariant(&result.new_state);
}

#[test]
fn test_prevalidate_invoice_with_subset_keeps_invoice_pending() {
    let state = create_pending_state(3);

    let result = apply_ok(
        &state,
        Command::PrevalidateInvoice {
            line_ids: Some(vec![LineId::new(1), LineId::new(2)]),
        },
    );

    assert_eq!(result.new_state.invoice.status, InvoiceStatus::Pending);
    assert_eq!(result.new_state.lines[0].status, LineStatus::Prevalidated);
    assert_eq!(result.new_state.lines[1].status, LineStatus::Prevalidated);
    assert_eq!(result.new_state.lines[2].status, LineStatus::Pending);
}

#[test]
fn test_prevalidate_invoice_with_unknown_line_fails() {
    let state = create_pending_state(2);

    let result = apply(
        &state,
        Command::PrevalidateInvoice {
            line_ids: Some(vec![LineId::new(99)]),
        },
        create_director_actor(),
        create_test_cause(),
        test_now(),
    );

    assert!(matches!(
        result.unwrap_err(),
        crate::CoreError::LineNotFound { .. }
    ));
}

// ============================================================================
// Validation and payment
// ============================================================================

#[test]
fn test_validate_prevalidated_invoice() {
    let state = create_pending_state(3);
    let prevalidated = apply_ok(&state, Command::PrevalidateInvoice { line_ids: None });
    let total_before: Money = prevalidated.new_state.invoice.total_amount;
    assert_eq!(total_before, Money::from_cents(36000));

    let result = apply_admin_ok(&prevalidated.new_state, Command::ValidateInvoice);

    assert_eq!(result.new_state.invoice.status, InvoiceStatus::Validated);
    assert_eq!(
        result.new_state.invoice.validated_by.as_deref(),
        Some("comptable-1")
    );
    assert_eq!(result.new_state.invoice.validated_at, Some(test_now()));
    // Validation never touches the total
    assert_eq!(result.new_state.invoice.total_amount, total_before);
}

#[test]
fn test_mark_validated_invoice_paid() {
    let state = create_pending_state(2);
    let prevalidated = apply_ok(&state, Command::PrevalidateInvoice { line_ids: None });
    let validated = apply_admin_ok(&prevalidated.new_state, Command::ValidateInvoice);

    let result = apply_admin_ok(
        &validated.new_state,
        Command::MarkInvoicePaid {
            payment_date: date!(2026 - 03 - 05),
        },
    );

    assert_eq!(result.new_state.invoice.status, InvoiceStatus::Paid);
    assert_eq!(
        result.new_state.invoice.paid_by.as_deref(),
        Some("comptable-1")
    );
    assert_eq!(
        result.new_state.invoice.payment_date,
        Some(date!(2026 - 03 - 05))
    );
}

// ============================================================================
// Rejection
// ============================================================================

#[test]
fn test_rejecting_every_line_rejects_the_invoice() {
    let state = create_pending_state(2);

    let first = apply_ok(
        &state,
        Command::RejectLine {
            line_id: LineId::new(1),
            observations: String::from("Cours non assuré"),
        },
    );
    assert_eq!(first.new_state.invoice.status, InvoiceStatus::Pending);
    assert_eq!(
        first.new_state.invoice.total_amount,
        Money::from_cents(12000)
    );

    let second = apply_ok(
        &first.new_state,
        Command::RejectLine {
            line_id: LineId::new(2),
            observations: String::from("Doublon"),
        },
    );

    assert_eq!(second.new_state.invoice.status, InvoiceStatus::Rejected);
    assert_eq!(second.new_state.invoice.total_amount, Money::ZERO);
    assert_total_invariant(&second.new_state);
}

#[test]
fn test_rejecting_last_pending_line_completes_prevalidation() {
    let state = create_pending_state(3);

    let first = apply_ok(
        &state,
        Command::PrevalidateInvoice {
            line_ids: Some(vec![LineId::new(1), LineId::new(2)]),
        },
    );

    // Rejecting the only remaining pending line leaves every
    // non-rejected line prevalidated, so the invoice advances
    let second = apply_ok(
        &first.new_state,
        Command::RejectLine {
            line_id: LineId::new(3),
            observations: String::from("Hors période"),
        },
    );

    assert_eq!(second.new_state.invoice.status, InvoiceStatus::Prevalidated);
    assert_eq!(
        second.new_state.invoice.total_amount,
        Money::from_cents(24000)
    );
    assert_total_invariant(&second.new_state);
}

#[test]
fn test_reject_invoice_keeps_lines_and_total_for_audit() {
    let state = create_pending_state(2);

    let result = apply_admin_ok(
        &state,
        Command::RejectInvoice {
            reason: String::from("Facture en double"),
        },
    );

    assert_eq!(result.new_state.invoice.status, InvoiceStatus::Rejected);
    // No cascade: lines retain their last status
    assert!(
        result
            .new_state
            .lines
            .iter()
            .all(|line| line.status == LineStatus::Pending)
    );
    assert_eq!(
        result.new_state.invoice.total_amount,
        Money::from_cents(24000)
    );

    let event = result.event.expect("rejection must produce an event");
    assert_eq!(event.action.details.as_deref(), Some("Facture en double"));
}

#[test]
fn test_reject_prevalidated_invoice() {
    let state = create_pending_state(1);
    let prevalidated = apply_ok(&state, Command::PrevalidateInvoice { line_ids: None });

    let result = apply_admin_ok(
        &prevalidated.new_state,
        Command::RejectInvoice {
            reason: String::from("Taux horaire non conforme"),
        },
    );

    assert_eq!(result.new_state.invoice.status, InvoiceStatus::Rejected);
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_line_event_carries_line_scope_and_snapshots() {
    let state = create_pending_state(2);

    let result = apply_ok(
        &state,
        Command::PrevalidateLine {
            line_id: LineId::new(1),
            observations: None,
        },
    );

    let event = result.event.expect("line approval must produce an event");
    assert_eq!(event.invoice_id, state.invoice.id);
    assert_eq!(event.line_id, Some(LineId::new(1)));
    assert_eq!(event.action.name, "PrevalidateLine");
    // The invoice did not flip; snapshots agree on status
    assert!(!event.changed_invoice_status());
    assert_eq!(event.occurred_at, test_now());
}
