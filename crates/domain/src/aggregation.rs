// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The aggregation rule deriving invoice-level state from its lines.
//!
//! An invoice's total is always the sum of its non-rejected lines, and
//! its status during the prevalidation phase follows its lines: it stays
//! pending while any line is pending, becomes prevalidated once every
//! non-rejected line is prevalidated, and auto-rejects when every line
//! has been rejected. `validated` and `paid` are invoice-only states and
//! are never derived here.
//!
//! This rule is evaluated transactionally alongside every line mutation,
//! never lazily at read time.

use crate::line_status::LineStatus;
use crate::types::{InvoiceLine, Money};

/// The invoice status implied by a line set during the prevalidation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatedStatus {
    /// At least one line still awaits review (or the invoice has no lines).
    Pending,
    /// Every non-rejected line has been prevalidated.
    Prevalidated,
    /// Every line has been rejected.
    Rejected,
}

/// The outcome of evaluating the aggregation rule over an invoice's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceAggregate {
    /// Sum of `total_ttc` over all non-rejected lines.
    pub total_amount: Money,
    /// The status the line set implies.
    pub status: AggregatedStatus,
}

/// Evaluates the aggregation rule over an invoice's lines.
///
/// An invoice with no lines aggregates to `Pending` with a zero total:
/// emptiness never flips an invoice forward or rejects it.
#[must_use]
pub fn aggregate_lines(lines: &[InvoiceLine]) -> InvoiceAggregate {
    let total_amount: Money = lines
        .iter()
        .filter(|line| line.status != LineStatus::Rejected)
        .fold(Money::ZERO, |sum, line| sum.plus(line.total_ttc));

    let status: AggregatedStatus = if lines.is_empty() {
        AggregatedStatus::Pending
    } else if lines.iter().all(|line| line.status == LineStatus::Rejected) {
        AggregatedStatus::Rejected
    } else if lines.iter().any(|line| line.status == LineStatus::Pending) {
        AggregatedStatus::Pending
    } else {
        AggregatedStatus::Prevalidated
    };

    InvoiceAggregate {
        total_amount,
        status,
    }
}
