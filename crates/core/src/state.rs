// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use facturation_audit::{StatusSnapshot, TransitionEvent};
use facturation_domain::{Invoice, InvoiceLine, LineId};

/// The complete workflow state scoped to a single invoice.
///
/// Every transition operates on one invoice and all of its lines; the
/// invoice row is the lock boundary, so sibling lines are always loaded
/// together before a transition is decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceState {
    /// The invoice this state is scoped to.
    pub invoice: Invoice,
    /// All lines belonging to the invoice.
    pub lines: Vec<InvoiceLine>,
}

impl InvoiceState {
    /// Creates a state from an invoice and its lines.
    #[must_use]
    pub const fn new(invoice: Invoice, lines: Vec<InvoiceLine>) -> Self {
        Self { invoice, lines }
    }

    /// Looks up a line by id.
    #[must_use]
    pub fn find_line(&self, line_id: LineId) -> Option<&InvoiceLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub const fn to_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::new(self.invoice.status, self.invoice.total_amount)
    }
}

/// The result of a transition.
///
/// Transitions are atomic: they either succeed completely or fail
/// without side effects. A repeated, already-completed transition
/// succeeds as a no-op and carries no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The state after the transition.
    pub new_state: InvoiceState,
    /// The audit event recording this transition, or `None` when the
    /// command was an idempotent no-op.
    pub event: Option<TransitionEvent>,
}

impl TransitionResult {
    /// Returns true if the command changed nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.event.is_none()
    }
}
