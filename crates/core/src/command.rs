// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use facturation_domain::LineId;
use time::Date;

/// A command represents actor intent as data only.
///
/// Commands are the only way to request workflow transitions. Creation
/// and import are persistence concerns and do not go through the
/// transition engine; the five approval transitions do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Prevalidate an invoice, line by line.
    ///
    /// With `line_ids` given, only the listed lines transition; the
    /// invoice itself flips only once every non-rejected line is
    /// prevalidated. With `line_ids` omitted, every eligible line is
    /// prevalidated and the invoice follows.
    PrevalidateInvoice {
        /// The lines to prevalidate, or `None` for all eligible lines.
        line_ids: Option<Vec<LineId>>,
    },
    /// Validate a prevalidated invoice (accountant/admin approval).
    ///
    /// Validation is invoice-granular only; there is no line-level
    /// equivalent.
    ValidateInvoice,
    /// Record payment of a validated invoice. Terminal success state.
    MarkInvoicePaid {
        /// The date payment was made.
        payment_date: Date,
    },
    /// Reject a pending or prevalidated invoice. Terminal.
    ///
    /// Lines retain their last status for audit; nothing cascades.
    RejectInvoice {
        /// The rejection reason; must be non-empty.
        reason: String,
    },
    /// Prevalidate a single line (director review).
    PrevalidateLine {
        /// The line to prevalidate.
        line_id: LineId,
        /// Optional reviewer note attached at approval time.
        observations: Option<String>,
    },
    /// Reject a single line (director review).
    RejectLine {
        /// The line to reject.
        line_id: LineId,
        /// The rejection reason; must be non-empty.
        observations: String,
    },
}
