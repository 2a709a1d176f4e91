// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::{Arc, Mutex};

use facturation_audit::{Cause, TransitionEvent, TransitionListener, TransitionListeners};
use facturation_domain::{CampusId, TeacherId};
use facturation_persistence::SqlitePersistence;

use crate::auth::{AuthenticatedActor, Role};
use crate::handlers::submit_invoice;
use crate::request_response::{LineItemRequest, SubmitInvoiceRequest};

pub const TEST_CAMPUS: i64 = 3;
pub const OTHER_CAMPUS: i64 = 9;
pub const TEST_TEACHER: i64 = 7;

pub fn create_persistence() -> SqlitePersistence {
    SqlitePersistence::new_in_memory().expect("in-memory database should initialize")
}

pub fn teacher_actor() -> AuthenticatedActor {
    AuthenticatedActor::teacher(String::from("enseignant-7"), TeacherId::new(TEST_TEACHER))
}

pub fn other_teacher_actor() -> AuthenticatedActor {
    AuthenticatedActor::teacher(String::from("enseignant-8"), TeacherId::new(8))
}

pub fn director_actor() -> AuthenticatedActor {
    AuthenticatedActor::director(String::from("directeur-3"), CampusId::new(TEST_CAMPUS))
}

pub fn other_campus_director() -> AuthenticatedActor {
    AuthenticatedActor::director(String::from("directeur-9"), CampusId::new(OTHER_CAMPUS))
}

pub fn comptable_actor() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("comptable-1"), Role::Comptable)
}

pub fn admin_actor() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-1"), Role::SuperAdmin)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn no_listeners() -> TransitionListeners {
    TransitionListeners::new()
}

/// A listener recording the action names of every event it receives.
pub struct RecordingListener {
    seen: Arc<Mutex<Vec<String>>>,
}

impl TransitionListener for RecordingListener {
    fn on_transition(&self, event: &TransitionEvent) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(event.action.name.clone());
        }
    }
}

/// Returns a registry with one recording listener and the shared log.
pub fn recording_listeners() -> (TransitionListeners, Arc<Mutex<Vec<String>>>) {
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let mut listeners = TransitionListeners::new();
    listeners.register(Box::new(RecordingListener {
        seen: Arc::clone(&seen),
    }));
    (listeners, seen)
}

/// A 2.00 h line item at 60.00/h (total 120.00).
pub fn line_item(day: u8) -> LineItemRequest {
    LineItemRequest {
        date_cours: format!("2026-02-{day:02}"),
        heure_debut: String::from("09:00"),
        heure_fin: String::from("11:00"),
        campus_id: TEST_CAMPUS,
        filiere: String::from("BTS MCO"),
        classe: String::from("MCO1"),
        intitule: String::from("Gestion commerciale"),
        retard: false,
        quantite_heures: String::from("2"),
        prix_unitaire: String::from("60.00"),
    }
}

pub fn submit_request(line_count: u8) -> SubmitInvoiceRequest {
    SubmitInvoiceRequest {
        enseignant_id: TEST_TEACHER,
        campus_id: TEST_CAMPUS,
        month_year: String::from("2026-02"),
        lines: (1..=line_count).map(line_item).collect(),
    }
}

/// Submits a pending invoice with `line_count` lines and returns its id.
pub fn submit_test_invoice(persistence: &mut SqlitePersistence, line_count: u8) -> i64 {
    submit_invoice(persistence, submit_request(line_count), &teacher_actor())
        .expect("submission should succeed")
        .invoice_id
}

/// Returns the line ids of an invoice in id order.
pub fn line_ids(persistence: &mut SqlitePersistence, invoice_id: i64) -> Vec<i64> {
    crate::handlers::get_invoice(persistence, invoice_id)
        .expect("invoice should exist")
        .lines
        .iter()
        .map(|line| line.line_id)
        .collect()
}
