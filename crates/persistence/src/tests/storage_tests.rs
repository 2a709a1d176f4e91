// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Round-trip tests for invoice and line storage.

use crate::PersistenceError;
use facturation_domain::{InvoiceStatus, LineStatus, Money, MonthYear};

use super::helpers::{
    create_draft, create_persistence, create_two_line_invoice, test_campus, test_month,
    test_now, test_teacher,
};

#[test]
fn test_create_and_load_invoice_round_trip() {
    let mut persistence = create_persistence();

    let invoice_id = create_two_line_invoice(&mut persistence);
    let state = persistence.get_invoice_state(invoice_id).unwrap();

    assert_eq!(state.invoice.id, invoice_id);
    assert_eq!(state.invoice.enseignant_id, test_teacher());
    assert_eq!(state.invoice.campus_id, test_campus());
    assert_eq!(state.invoice.month_year, test_month());
    assert_eq!(state.invoice.status, InvoiceStatus::Pending);
    assert_eq!(state.invoice.total_amount, Money::from_cents(24000));
    assert_eq!(state.invoice.created_at, test_now());
    assert!(state.invoice.prevalidated_by.is_none());

    assert_eq!(state.lines.len(), 2);
    for line in &state.lines {
        assert_eq!(line.invoice_id, invoice_id);
        assert_eq!(line.status, LineStatus::Pending);
        assert_eq!(line.total_ttc, Money::from_cents(12000));
        assert_eq!(line.filiere, "BTS MCO");
        assert!(line.prevalidated_at.is_none());
        assert!(line.observations.is_none());
    }
}

#[test]
fn test_duplicate_invoice_for_same_period_is_refused() {
    let mut persistence = create_persistence();
    create_two_line_invoice(&mut persistence);

    let result = persistence.create_invoice(
        test_teacher(),
        test_campus(),
        test_month(),
        &[create_draft(17)],
        test_now(),
    );

    assert!(matches!(
        result.unwrap_err(),
        PersistenceError::DuplicateInvoice { enseignant_id: 7, .. }
    ));
}

#[test]
fn test_same_teacher_different_month_is_allowed() {
    let mut persistence = create_persistence();
    create_two_line_invoice(&mut persistence);

    let result = persistence.create_invoice(
        test_teacher(),
        test_campus(),
        MonthYear::new(2026, 3).unwrap(),
        &[create_draft(5)],
        test_now(),
    );

    assert!(result.is_ok());
}

#[test]
fn test_unknown_invoice_is_not_found() {
    let mut persistence = create_persistence();

    let err = persistence
        .get_invoice_state(facturation_domain::InvoiceId::new(999))
        .unwrap_err();

    assert!(matches!(err, PersistenceError::InvoiceNotFound(999)));
}

#[test]
fn test_find_invoice_by_period() {
    let mut persistence = create_persistence();
    let invoice_id = create_two_line_invoice(&mut persistence);

    let found = persistence
        .find_invoice_id_by_period(test_teacher(), test_month())
        .unwrap();
    assert_eq!(found, Some(invoice_id));

    let missing = persistence
        .find_invoice_id_by_period(test_teacher(), MonthYear::new(2026, 4).unwrap())
        .unwrap();
    assert_eq!(missing, None);
}

#[test]
fn test_find_owning_invoice_of_line() {
    let mut persistence = create_persistence();
    let invoice_id = create_two_line_invoice(&mut persistence);
    let state = persistence.get_invoice_state(invoice_id).unwrap();

    let found = persistence
        .find_invoice_id_for_line(state.lines[0].id)
        .unwrap();
    assert_eq!(found, Some(invoice_id));

    let missing = persistence
        .find_invoice_id_for_line(facturation_domain::LineId::new(999))
        .unwrap();
    assert_eq!(missing, None);
}

#[test]
fn test_list_invoices_with_status_filter() {
    let mut persistence = create_persistence();
    create_two_line_invoice(&mut persistence);

    let pending = persistence
        .list_invoices(Some(InvoiceStatus::Pending))
        .unwrap();
    assert_eq!(pending.len(), 1);

    let paid = persistence.list_invoices(Some(InvoiceStatus::Paid)).unwrap();
    assert!(paid.is_empty());

    let all = persistence.list_invoices(None).unwrap();
    assert_eq!(all.len(), 1);
}
