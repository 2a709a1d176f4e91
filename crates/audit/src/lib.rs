// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use facturation_domain::{InvoiceId, InvoiceStatus, LineId, Money};
use time::OffsetDateTime;

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change.
/// Identity and role resolution happen in the external identity provider;
/// the workflow engine records what it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "enseignant", "directeur_campus",
    /// "comptable", "super_admin", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }
}

/// Represents the reason or trigger for an action.
///
/// A cause describes why a state change was initiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID, import batch ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
///
/// An action describes what state change occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`PrevalidateLine`", "`ValidateInvoice`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A snapshot of an invoice's aggregate state at a point in time.
///
/// Captures the two values the aggregation rule maintains: the invoice
/// status and the running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// The invoice status.
    pub invoice_status: InvoiceStatus,
    /// The invoice total at that moment.
    pub total_amount: Money,
}

impl StatusSnapshot {
    /// Creates a new `StatusSnapshot`.
    ///
    /// # Arguments
    ///
    /// * `invoice_status` - The invoice status
    /// * `total_amount` - The invoice total
    #[must_use]
    pub const fn new(invoice_status: InvoiceStatus, total_amount: Money) -> Self {
        Self {
            invoice_status,
            total_amount,
        }
    }
}

/// An immutable audit event representing a workflow transition.
///
/// Every successful state change must produce exactly one transition
/// event. Events are immutable once created and capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - Which invoice (and, for line operations, which line) was affected
/// - The invoice aggregate state before and after the transition
/// - When the transition occurred
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The invoice this transition applies to.
    pub invoice_id: InvoiceId,
    /// The line this transition applies to, for line-granular actions.
    pub line_id: Option<LineId>,
    /// The invoice aggregate state before the transition.
    pub before: StatusSnapshot,
    /// The invoice aggregate state after the transition.
    pub after: StatusSnapshot,
    /// When the transition occurred.
    pub occurred_at: OffsetDateTime,
}

impl TransitionEvent {
    /// Creates a new `TransitionEvent`.
    ///
    /// Once created, a transition event is immutable.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `invoice_id` - The affected invoice
    /// * `line_id` - The affected line, for line-granular actions
    /// * `before` - The invoice aggregate state before the transition
    /// * `after` - The invoice aggregate state after the transition
    /// * `occurred_at` - When the transition occurred
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        invoice_id: InvoiceId,
        line_id: Option<LineId>,
        before: StatusSnapshot,
        after: StatusSnapshot,
        occurred_at: OffsetDateTime,
    ) -> Self {
        Self {
            actor,
            cause,
            action,
            invoice_id,
            line_id,
            before,
            after,
            occurred_at,
        }
    }

    /// Returns true if the event records an invoice-level status change.
    ///
    /// Line operations that do not flip the parent invoice keep the same
    /// before and after invoice status.
    #[must_use]
    pub fn changed_invoice_status(&self) -> bool {
        self.before.invoice_status != self.after.invoice_status
    }
}

/// A downstream consumer of transition events.
///
/// Listeners are notified after a transition has committed; delivery is
/// fire-and-forget and never part of the transaction. A listener must
/// not assume it can veto or retry the transition.
pub trait TransitionListener: Send + Sync {
    /// Called once per committed transition event.
    fn on_transition(&self, event: &TransitionEvent);
}

/// A registry of transition listeners.
///
/// The owning service notifies every registered listener, in
/// registration order, after each committed transition.
#[derive(Default)]
pub struct TransitionListeners {
    listeners: Vec<Box<dyn TransitionListener>>,
}

impl TransitionListeners {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers a listener.
    pub fn register(&mut self, listener: Box<dyn TransitionListener>) {
        self.listeners.push(listener);
    }

    /// Notifies every registered listener of a committed event.
    pub fn notify_all(&self, event: &TransitionEvent) {
        for listener in &self.listeners {
            listener.on_transition(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facturation_domain::{InvoiceId, InvoiceStatus, Money};
    use std::sync::{Arc, Mutex};
    use time::macros::datetime;

    fn create_test_event() -> TransitionEvent {
        let actor: Actor = Actor::new(
            String::from("directeur-3"),
            String::from("directeur_campus"),
        );
        let cause: Cause = Cause::new(String::from("req-42"), String::from("API request"));
        let action: Action = Action::new(String::from("PrevalidateLine"), None);
        let before: StatusSnapshot =
            StatusSnapshot::new(InvoiceStatus::Pending, Money::from_cents(36000));
        let after: StatusSnapshot =
            StatusSnapshot::new(InvoiceStatus::Prevalidated, Money::from_cents(36000));

        TransitionEvent::new(
            actor,
            cause,
            action,
            InvoiceId::new(7),
            None,
            before,
            after,
            datetime!(2026-02-15 10:30 UTC),
        )
    }

    #[test]
    fn test_actor_creation_requires_all_fields() {
        let actor: Actor = Actor::new(String::from("enseignant-12"), String::from("enseignant"));

        assert_eq!(actor.id, "enseignant-12");
        assert_eq!(actor.actor_type, "enseignant");
    }

    #[test]
    fn test_cause_creation_requires_all_fields() {
        let cause: Cause = Cause::new(String::from("req-456"), String::from("User request"));

        assert_eq!(cause.id, "req-456");
        assert_eq!(cause.description, "User request");
    }

    #[test]
    fn test_action_creation_with_details() {
        let action: Action = Action::new(
            String::from("RejectInvoice"),
            Some(String::from("Heures non conformes")),
        );

        assert_eq!(action.name, "RejectInvoice");
        assert_eq!(action.details, Some(String::from("Heures non conformes")));
    }

    #[test]
    fn test_event_records_invoice_status_change() {
        let event = create_test_event();

        assert!(event.changed_invoice_status());
        assert_eq!(event.before.invoice_status, InvoiceStatus::Pending);
        assert_eq!(event.after.invoice_status, InvoiceStatus::Prevalidated);
    }

    #[test]
    fn test_event_without_invoice_flip() {
        let mut event = create_test_event();
        event.after = event.before;

        assert!(!event.changed_invoice_status());
    }

    #[test]
    fn test_event_equality() {
        let event1 = create_test_event();
        let event2 = create_test_event();

        assert_eq!(event1, event2);
    }

    struct RecordingListener {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl TransitionListener for RecordingListener {
        fn on_transition(&self, event: &TransitionEvent) {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(event.action.name.clone());
            }
        }
    }

    #[test]
    fn test_listeners_receive_every_committed_event() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = TransitionListeners::new();
        listeners.register(Box::new(RecordingListener {
            seen: Arc::clone(&seen),
        }));

        let event = create_test_event();
        listeners.notify_all(&event);
        listeners.notify_all(&event);

        let recorded = seen.lock().unwrap();
        assert_eq!(
            recorded.as_slice(),
            ["PrevalidateLine", "PrevalidateLine"]
        );
    }
}
