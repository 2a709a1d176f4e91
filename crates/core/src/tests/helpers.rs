// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use crate::InvoiceState;
use facturation_audit::{Actor, Cause};
use facturation_domain::{
    CampusId, Hours, Invoice, InvoiceId, InvoiceLine, LineDraft, LineId, LineStatus, Money,
    MonthYear, TeacherId,
};
use time::OffsetDateTime;
use time::macros::{date, datetime, time};

pub fn create_director_actor() -> Actor {
    Actor::new(
        String::from("directeur-3"),
        String::from("directeur_campus"),
    )
}

pub fn create_admin_actor() -> Actor {
    Actor::new(String::from("comptable-1"), String::from("comptable"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-123"), String::from("API request"))
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-02-15 10:00 UTC)
}

pub fn create_test_line(id: i64, invoice_id: InvoiceId) -> InvoiceLine {
    let draft = LineDraft {
        date_cours: date!(2026 - 02 - 10),
        heure_debut: time!(9:00),
        heure_fin: time!(11:00),
        campus_id: CampusId::new(3),
        filiere: String::from("BTS MCO"),
        classe: String::from("MCO1"),
        intitule: String::from("Gestion commerciale"),
        retard: false,
        // 2.00 h at 60.00/h = 120.00 per line
        quantite_heures: Hours::from_centiemes(200),
        prix_unitaire: Money::from_cents(6000),
    };
    InvoiceLine::from_draft(LineId::new(id), invoice_id, &draft)
}

/// Creates a pending invoice with `line_count` pending lines of 120.00 each.
///
/// The invoice total reflects the lines, as the import flow leaves it.
pub fn create_pending_state(line_count: usize) -> InvoiceState {
    let invoice_id = InvoiceId::new(1);
    let mut invoice = Invoice::new(
        invoice_id,
        TeacherId::new(7),
        CampusId::new(3),
        MonthYear::new(2026, 2).unwrap(),
        datetime!(2026-02-01 08:00 UTC),
    );

    let lines: Vec<InvoiceLine> = (1..=line_count as i64)
        .map(|id| create_test_line(id, invoice_id))
        .collect();
    invoice.total_amount = lines
        .iter()
        .fold(Money::ZERO, |sum, line| sum.plus(line.total_ttc));

    InvoiceState::new(invoice, lines)
}

/// Asserts the aggregation invariant: the invoice total equals the sum
/// of its non-rejected lines' totals.
pub fn assert_total_invariant(state: &InvoiceState) {
    let expected: Money = state
        .lines
        .iter()
        .filter(|line| line.status != LineStatus::Rejected)
        .fold(Money::ZERO, |sum, line| sum.plus(line.total_ttc));
    assert_eq!(
        state.invoice.total_amount, expected,
        "invoice total must equal the sum of non-rejected lines"
    );
}
