// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use crate::SqlitePersistence;
use facturation_audit::{Actor, Cause};
use facturation_domain::{CampusId, Hours, InvoiceId, LineDraft, Money, MonthYear, TeacherId};
use time::OffsetDateTime;
use time::macros::{date, datetime, time};

pub fn create_persistence() -> SqlitePersistence {
    SqlitePersistence::new_in_memory().expect("in-memory database should initialize")
}

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
    Cause::new(String::from("req-789"), String::from("API request"))
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-02-15 10:00 UTC)
}

pub fn test_teacher() -> TeacherId {
    TeacherId::new(7)
}

pub fn test_campus() -> CampusId {
    CampusId::new(3)
}

pub fn test_month() -> MonthYear {
    MonthYear::new(2026, 2).unwrap()
}

/// A 2.00 h draft at 60.00/h (total 120.00).
pub fn create_draft(day: u8) -> LineDraft {
    LineDraft {
        date_cours: date!(2026 - 02 - 01).replace_day(day).unwrap(),
        heure_debut: time!(9:00),
        heure_fin: time!(11:00),
        campus_id: test_campus(),
        filiere: String::from("BTS MCO"),
        classe: String::from("MCO1"),
        intitule: String::from("Gestion commerciale"),
        retard: false,
        quantite_heures: Hours::from_centiemes(200),
        prix_unitaire: Money::from_cents(6000),
    }
}

/// Creates a pending two-line invoice and returns its id.
pub fn create_two_line_invoice(persistence: &mut SqlitePersistence) -> InvoiceId {
    persistence
        .create_invoice(
            test_teacher(),
            test_campus(),
            test_month(),
            &[create_draft(3), create_draft(10)],
            test_now(),
        )
        .expect("invoice creation should succeed")
}
