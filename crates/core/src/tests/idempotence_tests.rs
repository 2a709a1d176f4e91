// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for idempotent repeats of completed transitions.
//!
//! The UI issues transitions as independent, retryable network calls; a
//! double-click must not produce a second state change or a confusing
//! error.

use crate::{Command, InvoiceState, apply};
use facturation_domain::{InvoiceStatus, LineId};
use time::macros::date;

use super::helpers::{
    create_admin_actor, create_director_actor, create_test_cause, create_pending_state, test_now,
};

fn run(state: &InvoiceState, command: Command) -> crate::TransitionResult {
    apply(
        state,
        command,
        create_admin_actor(),
        create_test_cause(),
        test_now(),
    )
    .expect("transition should succeed")
}

fn run_director(state: &InvoiceState, command: Command) -> crate::TransitionResult {
    apply(
        state,
        command,
        create_director_actor(),
        create_test_cause(),
        test_now(),
    )
    .expect("transition should succeed")
}

#[test]
fn test_mark_paid_twice_keeps_payment_date_and_emits_one_event() {
    let state = create_pending_state(2);
    let prevalidated = run_director(&state, Command::PrevalidateInvoice { line_ids: None });
    let validated = run(&prevalidated.new_state, Command::ValidateInvoice);

    let first = run(
        &validated.new_state,
        Command::MarkInvoicePaid {
            payment_date: date!(2026 - 03 - 05),
        },
    );
    assert!(first.event.is_some());

    // The repeat arrives with a different date; the original wins
    let second = run(
        &first.new_state,
        Command::MarkInvoicePaid {
            payment_date: date!(2026 - 03 - 09),
        },
    );

    assert!(second.is_noop());
    assert_eq!(second.new_state, first.new_state);
    assert_eq!(
        second.new_state.invoice.payment_date,
        Some(date!(2026 - 03 - 05))
    );
}

#[test]
fn test_validate_twice_is_noop() {
    let state = create_pending_state(2);
    let prevalidated = run_director(&state, Command::PrevalidateInvoice { line_ids: None });

    let first = run(&prevalidated.new_state, Command::ValidateInvoice);
    let second = run(&first.new_state, Command::ValidateInvoice);

    assert!(second.is_noop());
    assert_eq!(second.new_state, first.new_state);
    assert_eq!(
        second.new_state.invoice.validated_at,
        first.new_state.invoice.validated_at
    );
}

#[test]
fn test_reject_invoice_twice_is_noop() {
    let state = create_pending_state(2);

    let first = run(
        &state,
        Command::RejectInvoice {
            reason: String::from("Facture en double"),
        },
    );
    let second = run(
        &first.new_state,
        Command::RejectInvoice {
            reason: String::from("Facture en double"),
        },
    );

    assert!(second.is_noop());
    assert_eq!(second.new_state.invoice.status, InvoiceStatus::Rejected);
}

#[test]
fn test_prevalidate_line_twice_is_noop() {
    let state = create_pending_state(2);

    let first = run_director(
        &state,
        Command::PrevalidateLine {
            line_id: LineId::new(1),
            observations: None,
        },
    );
    let second = run_director(
        &first.new_state,
        Command::PrevalidateLine {
            line_id: LineId::new(1),
            observations: None,
        },
    );

    assert!(second.is_noop());
    assert_eq!(second.new_state, first.new_state);
}

#[test]
fn test_repeat_of_flipping_line_approval_is_noop_after_flip() {
    // The approval that completes the set flips the invoice to
    // prevalidated; the re-sent call must still succeed as a no-op even
    // though the invoice is no longer pending
    let state = create_pending_state(1);

    let first = run_director(
        &state,
        Command::PrevalidateLine {
            line_id: LineId::new(1),
            observations: None,
        },
    );
    assert_eq!(first.new_state.invoice.status, InvoiceStatus::Prevalidated);

    let second = run_director(
        &first.new_state,
        Command::PrevalidateLine {
            line_id: LineId::new(1),
            observations: None,
        },
    );

    assert!(second.is_noop());
    assert_eq!(second.new_state, first.new_state);
}

#[test]
fn test_prevalidate_invoice_twice_is_noop() {
    let state = create_pending_state(3);

    let first = run_director(&state, Command::PrevalidateInvoice { line_ids: None });
    let second = run_director(
        &first.new_state,
        Command::PrevalidateInvoice { line_ids: None },
    );

    assert!(second.is_noop());
    assert_eq!(second.new_state, first.new_state);
}
