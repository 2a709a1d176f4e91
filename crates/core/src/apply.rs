// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{InvoiceState, TransitionResult};
use facturation_audit::{Action, Actor, Cause, StatusSnapshot, TransitionEvent};
use facturation_domain::{
    AggregatedStatus, Invoice, InvoiceAggregate, InvoiceLine, InvoiceStatus, LineId, LineStatus,
    aggregate_lines, validate_rejection_reason,
};
use time::OffsetDateTime;

/// Transitions an invoice to a target status, mapping lifecycle
/// violations to `InvalidState`.
fn advance_invoice(
    invoice: &mut Invoice,
    target: InvoiceStatus,
    attempted: &str,
) -> Result<(), CoreError> {
    invoice
        .status
        .validate_transition(target)
        .map_err(|_| CoreError::InvalidState {
            entity: String::from("invoice"),
            current: invoice.status.as_str().to_string(),
            attempted: attempted.to_string(),
        })?;
    invoice.status = target;
    Ok(())
}

/// Transitions a line to a target status, mapping lifecycle violations
/// to `InvalidState`.
fn advance_line(
    line: &mut InvoiceLine,
    target: LineStatus,
    attempted: &str,
) -> Result<(), CoreError> {
    line.status
        .validate_transition(target)
        .map_err(|_| CoreError::InvalidState {
            entity: String::from("line"),
            current: line.status.as_str().to_string(),
            attempted: attempted.to_string(),
        })?;
    line.status = target;
    Ok(())
}

/// Re-evaluates the aggregation rule after a line mutation.
///
/// The total is always refreshed. The invoice status follows its lines
/// only while the invoice is still pending; aggregation never moves an
/// invoice that has already advanced. A flip to prevalidated is stamped
/// with the actor whose line action completed the set.
fn reaggregate(state: &mut InvoiceState, actor: &Actor, now: OffsetDateTime) {
    let aggregate: InvoiceAggregate = aggregate_lines(&state.lines);
    state.invoice.total_amount = aggregate.total_amount;

    if state.invoice.status != InvoiceStatus::Pending {
        return;
    }
    match aggregate.status {
        AggregatedStatus::Pending => {}
        AggregatedStatus::Prevalidated => {
            // Pending -> Prevalidated is always legal
            state.invoice.status = InvoiceStatus::Prevalidated;
            state.invoice.prevalidated_by = Some(actor.id.clone());
            state.invoice.prevalidated_at = Some(now);
        }
        AggregatedStatus::Rejected => {
            // Every line rejected closes the invoice rather than
            // leaving it stranded in pending
            state.invoice.status = InvoiceStatus::Rejected;
        }
    }
}

/// Returns an idempotent no-op result for an already-completed command.
fn noop(state: &InvoiceState) -> TransitionResult {
    TransitionResult {
        new_state: state.clone(),
        event: None,
    }
}

/// Applies a command to the current invoice state, producing a new
/// state and the audit event recording the transition.
///
/// The function is pure: it never touches storage. Callers must run it
/// inside the transaction that loaded `state` and persist `new_state`
/// and the event atomically.
///
/// Repeating a command whose transition has already completed (a
/// double-submitted "validate", a re-sent line approval) succeeds as a
/// no-op returning the current state with no event.
///
/// # Arguments
///
/// * `state` - The invoice and all of its lines (immutable)
/// * `command` - The transition to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The transition timestamp
///
/// # Errors
///
/// Returns an error if:
/// - The transition is not legal from the current status (`InvalidState`)
/// - A referenced line does not belong to the invoice (`LineNotFound`)
/// - Required input is missing or malformed (`DomainViolation`)
#[allow(clippy::too_many_lines)]
pub fn apply(
    state: &InvoiceState,
    command: Command,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    match command {
        Command::PrevalidateInvoice { line_ids } => {
            match state.invoice.status {
                InvoiceStatus::Pending => {}
                InvoiceStatus::Prevalidated => return Ok(noop(state)),
                other => {
                    return Err(CoreError::InvalidState {
                        entity: String::from("invoice"),
                        current: other.as_str().to_string(),
                        attempted: String::from("prevalidate invoice"),
                    });
                }
            }

            // Listed lines must all exist; omitted means every pending line
            let target_ids: Vec<LineId> = match line_ids {
                Some(ids) => {
                    for id in &ids {
                        if state.find_line(*id).is_none() {
                            return Err(CoreError::LineNotFound {
                                invoice_id: state.invoice.id,
                                line_id: *id,
                            });
                        }
                    }
                    ids
                }
                None => state
                    .lines
                    .iter()
                    .filter(|line| line.status == LineStatus::Pending)
                    .map(|line| line.id)
                    .collect(),
            };

            let before: StatusSnapshot = state.to_snapshot();
            let mut new_state: InvoiceState = state.clone();

            let mut changed: usize = 0;
            for line in &mut new_state.lines {
                if !target_ids.contains(&line.id) {
                    continue;
                }
                match line.status {
                    LineStatus::Pending => {
                        advance_line(line, LineStatus::Prevalidated, "prevalidate line")?;
                        line.prevalidated_by = Some(actor.id.clone());
                        line.prevalidated_at = Some(now);
                        changed += 1;
                    }
                    // An already-reviewed listed line is a repeat, not an error
                    LineStatus::Prevalidated => {}
                    LineStatus::Rejected => {
                        return Err(CoreError::InvalidState {
                            entity: String::from("line"),
                            current: LineStatus::Rejected.as_str().to_string(),
                            attempted: String::from("prevalidate line"),
                        });
                    }
                }
            }

            reaggregate(&mut new_state, &actor, now);

            if new_state == *state {
                return Ok(TransitionResult {
                    new_state,
                    event: None,
                });
            }

            let after: StatusSnapshot = new_state.to_snapshot();
            let action: Action = Action::new(
                String::from("PrevalidateInvoice"),
                Some(format!("Prevalidated {changed} line(s)")),
            );
            let event: TransitionEvent = TransitionEvent::new(
                actor,
                cause,
                action,
                state.invoice.id,
                None,
                before,
                after,
                now,
            );

            Ok(TransitionResult {
                new_state,
                event: Some(event),
            })
        }
        Command::ValidateInvoice => {
            if state.invoice.status == InvoiceStatus::Validated {
                return Ok(noop(state));
            }

            let before: StatusSnapshot = state.to_snapshot();
            let mut new_state: InvoiceState = state.clone();

            advance_invoice(
                &mut new_state.invoice,
                InvoiceStatus::Validated,
                "validate invoice",
            )?;
            new_state.invoice.validated_by = Some(actor.id.clone());
            new_state.invoice.validated_at = Some(now);

            let after: StatusSnapshot = new_state.to_snapshot();
            let action: Action = Action::new(String::from("ValidateInvoice"), None);
            let event: TransitionEvent = TransitionEvent::new(
                actor,
                cause,
                action,
                state.invoice.id,
                None,
                before,
                after,
                now,
            );

            Ok(TransitionResult {
                new_state,
                event: Some(event),
            })
        }
        Command::MarkInvoicePaid { payment_date } => {
            // A repeated payment keeps the original payment_date
            if state.invoice.status == InvoiceStatus::Paid {
                return Ok(noop(state));
            }

            let before: StatusSnapshot = state.to_snapshot();
            let mut new_state: InvoiceState = state.clone();

            advance_invoice(&mut new_state.invoice, InvoiceStatus::Paid, "mark paid")?;
            new_state.invoice.paid_by = Some(actor.id.clone());
            new_state.invoice.payment_date = Some(payment_date);

            let after: StatusSnapshot = new_state.to_snapshot();
            let action: Action = Action::new(
                String::from("MarkInvoicePaid"),
                Some(format!("Paid on {payment_date}")),
            );
            let event: TransitionEvent = TransitionEvent::new(
                actor,
                cause,
                action,
                state.invoice.id,
                None,
                before,
                after,
                now,
            );

            Ok(TransitionResult {
                new_state,
                event: Some(event),
            })
        }
        Command::RejectInvoice { reason } => {
            validate_rejection_reason(&reason)?;

            if state.invoice.status == InvoiceStatus::Rejected {
                return Ok(noop(state));
            }

            let before: StatusSnapshot = state.to_snapshot();
            let mut new_state: InvoiceState = state.clone();

            advance_invoice(
                &mut new_state.invoice,
                InvoiceStatus::Rejected,
                "reject invoice",
            )?;
            // Lines retain their last status for audit; the total keeps
            // the sum of the non-rejected lines

            let after: StatusSnapshot = new_state.to_snapshot();
            let action: Action = Action::new(String::from("RejectInvoice"), Some(reason));
            let event: TransitionEvent = TransitionEvent::new(
                actor,
                cause,
                action,
                state.invoice.id,
                None,
                before,
                after,
                now,
            );

            Ok(TransitionResult {
                new_state,
                event: Some(event),
            })
        }
        Command::PrevalidateLine {
            line_id,
            observations,
        } => {
            let line: &InvoiceLine =
                state
                    .find_line(line_id)
                    .ok_or(CoreError::LineNotFound {
                        invoice_id: state.invoice.id,
                        line_id,
                    })?;

            // A re-sent approval of an already-prevalidated line is a
            // no-op even after the invoice advanced
            if line.status == LineStatus::Prevalidated {
                return Ok(noop(state));
            }
            if state.invoice.status != InvoiceStatus::Pending {
                return Err(CoreError::InvalidState {
                    entity: String::from("invoice"),
                    current: state.invoice.status.as_str().to_string(),
                    attempted: String::from("prevalidate line"),
                });
            }

            let before: StatusSnapshot = state.to_snapshot();
            let mut new_state: InvoiceState = state.clone();

            if let Some(line) = new_state.lines.iter_mut().find(|l| l.id == line_id) {
                advance_line(line, LineStatus::Prevalidated, "prevalidate line")?;
                line.prevalidated_by = Some(actor.id.clone());
                line.prevalidated_at = Some(now);
                if observations.is_some() {
                    line.observations = observations.clone();
                }
            }

            reaggregate(&mut new_state, &actor, now);

            let after: StatusSnapshot = new_state.to_snapshot();
            let action: Action = Action::new(String::from("PrevalidateLine"), observations);
            let event: TransitionEvent = TransitionEvent::new(
                actor,
                cause,
                action,
                state.invoice.id,
                Some(line_id),
                before,
                after,
                now,
            );

            Ok(TransitionResult {
                new_state,
                event: Some(event),
            })
        }
        Command::RejectLine {
            line_id,
            observations,
        } => {
            validate_rejection_reason(&observations)?;

            let line: &InvoiceLine =
                state
                    .find_line(line_id)
                    .ok_or(CoreError::LineNotFound {
                        invoice_id: state.invoice.id,
                        line_id,
                    })?;

            if line.status == LineStatus::Rejected {
                return Ok(noop(state));
            }
            if state.invoice.status != InvoiceStatus::Pending {
                return Err(CoreError::InvalidState {
                    entity: String::from("invoice"),
                    current: state.invoice.status.as_str().to_string(),
                    attempted: String::from("reject line"),
                });
            }

            let before: StatusSnapshot = state.to_snapshot();
            let mut new_state: InvoiceState = state.clone();

            if let Some(line) = new_state.lines.iter_mut().find(|l| l.id == line_id) {
                advance_line(line, LineStatus::Rejected, "reject line")?;
                line.observations = Some(observations.clone());
            }

            reaggregate(&mut new_state, &actor, now);

            let after: StatusSnapshot = new_state.to_snapshot();
            let action: Action = Action::new(String::from("RejectLine"), Some(observations));
            let event: TransitionEvent = TransitionEvent::new(
                actor,
                cause,
                action,
                state.invoice.id,
                Some(line_id),
                before,
                after,
                now,
            );

            Ok(TransitionResult {
                new_state,
                event: Some(event),
            })
        }
    }
}
