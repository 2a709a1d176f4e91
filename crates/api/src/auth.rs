// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authorization types and the workflow transition policy.
//!
//! Identity and role resolution belong to the external identity
//! provider; this module receives an already-authenticated actor and
//! decides, in one pure function, whether the actor may request a given
//! transition. Status legality is a separate concern enforced by the
//! transition engine (`InvalidState`); this policy answers only the
//! role and scope question (`Unauthorized`).

use facturation_audit::Actor;
use facturation_domain::{CampusId, Invoice, InvoiceLine, InvoiceStatus, TeacherId};

use crate::error::AuthError;

/// Actor roles for authorization.
///
/// Roles determine what transitions an authenticated actor may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Teacher: submits hour claims for their own invoices.
    ///
    /// Teachers may:
    /// - submit a new monthly invoice for themselves
    /// - provide import batches for their own invoices
    ///
    /// Teachers never advance the approval workflow.
    Enseignant,
    /// Campus director: first-level approval within one campus.
    ///
    /// Directors may:
    /// - prevalidate pending invoices and individual lines
    /// - reject pending invoices and individual lines
    ///
    /// Write access is strictly scoped to the director's own campus,
    /// even though read access is broader (directors can see
    /// cross-campus lines for context but cannot act on them).
    DirecteurCampus,
    /// Accountant: second-level approval and payment, all campuses.
    Comptable,
    /// Admin: same workflow authority as accountants.
    SuperAdmin,
}

/// An authenticated actor with an associated role and scope.
///
/// Supplied by the external identity provider; trusted as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
    /// The teacher this actor represents, for `Enseignant` actors.
    pub teacher_id: Option<TeacherId>,
    /// The campus this actor is scoped to, for `DirecteurCampus` actors.
    pub campus_id: Option<CampusId>,
}

impl AuthenticatedActor {
    /// Creates an actor with no teacher or campus scope.
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self {
            id,
            role,
            teacher_id: None,
            campus_id: None,
        }
    }

    /// Creates a teacher actor owning the given teacher id.
    #[must_use]
    pub const fn teacher(id: String, teacher_id: TeacherId) -> Self {
        Self {
            id,
            role: Role::Enseignant,
            teacher_id: Some(teacher_id),
            campus_id: None,
        }
    }

    /// Creates a campus director actor scoped to the given campus.
    #[must_use]
    pub const fn director(id: String, campus_id: CampusId) -> Self {
        Self {
            id,
            role: Role::DirecteurCampus,
            teacher_id: None,
            campus_id: Some(campus_id),
        }
    }

    /// Converts this authenticated actor into an audit Actor.
    ///
    /// This is used when recording transition events to attribute
    /// actions to the authenticated actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        let actor_type: String = match self.role {
            Role::Enseignant => String::from("enseignant"),
            Role::DirecteurCampus => String::from("directeur_campus"),
            Role::Comptable => String::from("comptable"),
            Role::SuperAdmin => String::from("super_admin"),
        };
        Actor::new(self.id.clone(), actor_type)
    }
}

/// A transition an actor requests, with the scope data the policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowTransition<'a> {
    /// Create a new pending invoice (teacher submission).
    SubmitInvoice {
        /// The teacher the invoice belongs to.
        enseignant_id: TeacherId,
    },
    /// Create or replace a pending invoice from an import batch.
    ImportInvoice {
        /// The teacher the batch belongs to.
        enseignant_id: TeacherId,
    },
    /// Prevalidate an invoice (director, line-by-line gate).
    PrevalidateInvoice {
        /// The target invoice.
        invoice: &'a Invoice,
    },
    /// Prevalidate one line (director).
    PrevalidateLine {
        /// The target line.
        line: &'a InvoiceLine,
    },
    /// Reject one line (director).
    RejectLine {
        /// The target line.
        line: &'a InvoiceLine,
    },
    /// Validate a prevalidated invoice (accountant/admin).
    ValidateInvoice,
    /// Record payment of a validated invoice (accountant/admin).
    MarkInvoicePaid,
    /// Reject an invoice.
    RejectInvoice {
        /// The target invoice.
        invoice: &'a Invoice,
    },
}

impl WorkflowTransition<'_> {
    /// A short name for error messages.
    #[must_use]
    const fn action_name(&self) -> &'static str {
        match self {
            Self::SubmitInvoice { .. } => "submit_invoice",
            Self::ImportInvoice { .. } => "import_invoice",
            Self::PrevalidateInvoice { .. } => "prevalidate_invoice",
            Self::PrevalidateLine { .. } => "prevalidate_line",
            Self::RejectLine { .. } => "reject_line",
            Self::ValidateInvoice => "validate_invoice",
            Self::MarkInvoicePaid => "mark_invoice_paid",
            Self::RejectInvoice { .. } => "reject_invoice",
        }
    }
}

/// Checks a director's campus scope against a target campus.
fn check_campus_scope(
    actor: &AuthenticatedActor,
    target_campus: CampusId,
    action: &str,
) -> Result<(), AuthError> {
    if actor.campus_id == Some(target_campus) {
        Ok(())
    } else {
        Err(AuthError::CampusMismatch {
            action: action.to_string(),
            target_campus,
            actor_campus: actor.campus_id,
        })
    }
}

/// Decides whether an actor may request a transition.
///
/// This is the single policy function: every handler and every UI
/// capability computation goes through it, so the role/scope matrix
/// lives in exactly one place.
///
/// The decision covers role and scope only. Whether the transition is
/// legal from the entity's current status is the transition engine's
/// concern, with one exception: a director's authority to reject an
/// invoice exists only while it is pending, so that rule is part of the
/// policy, not the lifecycle.
///
/// # Errors
///
/// Returns an error describing the missing role, ownership, or campus
/// scope.
pub fn can_transition(
    actor: &AuthenticatedActor,
    transition: &WorkflowTransition<'_>,
) -> Result<(), AuthError> {
    let action: &'static str = transition.action_name();

    match *transition {
        WorkflowTransition::SubmitInvoice { enseignant_id } => match actor.role {
            Role::Enseignant => {
                if actor.teacher_id == Some(enseignant_id) {
                    Ok(())
                } else {
                    Err(AuthError::NotOwner {
                        action: action.to_string(),
                    })
                }
            }
            _ => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Enseignant"),
            }),
        },
        WorkflowTransition::ImportInvoice { enseignant_id } => match actor.role {
            // Teachers import their own batches; back office imports anyone's
            Role::Enseignant => {
                if actor.teacher_id == Some(enseignant_id) {
                    Ok(())
                } else {
                    Err(AuthError::NotOwner {
                        action: action.to_string(),
                    })
                }
            }
            Role::Comptable | Role::SuperAdmin => Ok(()),
            Role::DirecteurCampus => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Enseignant, Comptable or SuperAdmin"),
            }),
        },
        WorkflowTransition::PrevalidateInvoice { invoice } => match actor.role {
            Role::DirecteurCampus => check_campus_scope(actor, invoice.campus_id, action),
            _ => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("DirecteurCampus"),
            }),
        },
        WorkflowTransition::PrevalidateLine { line } | WorkflowTransition::RejectLine { line } => {
            match actor.role {
                Role::DirecteurCampus => check_campus_scope(actor, line.campus_id, action),
                _ => Err(AuthError::Unauthorized {
                    action: action.to_string(),
                    required_role: String::from("DirecteurCampus"),
                }),
            }
        }
        WorkflowTransition::ValidateInvoice | WorkflowTransition::MarkInvoicePaid => {
            match actor.role {
                Role::Comptable | Role::SuperAdmin => Ok(()),
                Role::Enseignant | Role::DirecteurCampus => Err(AuthError::Unauthorized {
                    action: action.to_string(),
                    required_role: String::from("Comptable or SuperAdmin"),
                }),
            }
        }
        WorkflowTransition::RejectInvoice { invoice } => match actor.role {
            Role::Comptable | Role::SuperAdmin => Ok(()),
            Role::DirecteurCampus => {
                check_campus_scope(actor, invoice.campus_id, action)?;
                // A director's rejection authority ends once the invoice
                // leaves pending; later rejection belongs to the back office
                if invoice.status == InvoiceStatus::Pending {
                    Ok(())
                } else {
                    Err(AuthError::Unauthorized {
                        action: action.to_string(),
                        required_role: String::from("Comptable or SuperAdmin"),
                    })
                }
            }
            Role::Enseignant => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("DirecteurCampus, Comptable or SuperAdmin"),
            }),
        },
    }
}

/// Authorization service for enforcing role-based access control.
///
/// Thin named wrappers over [`can_transition`] so handlers read like
/// the operations they gate.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor may submit an invoice for a teacher.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not the owning teacher.
    pub fn authorize_submit_invoice(
        actor: &AuthenticatedActor,
        enseignant_id: TeacherId,
    ) -> Result<(), AuthError> {
        can_transition(actor, &WorkflowTransition::SubmitInvoice { enseignant_id })
    }

    /// Checks if an actor may import a batch for a teacher.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor fails the policy.
    pub fn authorize_import_invoice(
        actor: &AuthenticatedActor,
        enseignant_id: TeacherId,
    ) -> Result<(), AuthError> {
        can_transition(actor, &WorkflowTransition::ImportInvoice { enseignant_id })
    }

    /// Checks if an actor may prevalidate an invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a director of the invoice's campus.
    pub fn authorize_prevalidate_invoice(
        actor: &AuthenticatedActor,
        invoice: &Invoice,
    ) -> Result<(), AuthError> {
        can_transition(actor, &WorkflowTransition::PrevalidateInvoice { invoice })
    }

    /// Checks if an actor may prevalidate a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a director of the line's campus.
    pub fn authorize_prevalidate_line(
        actor: &AuthenticatedActor,
        line: &InvoiceLine,
    ) -> Result<(), AuthError> {
        can_transition(actor, &WorkflowTransition::PrevalidateLine { line })
    }

    /// Checks if an actor may reject a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a director of the line's campus.
    pub fn authorize_reject_line(
        actor: &AuthenticatedActor,
        line: &InvoiceLine,
    ) -> Result<(), AuthError> {
        can_transition(actor, &WorkflowTransition::RejectLine { line })
    }

    /// Checks if an actor may validate an invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an accountant or admin.
    pub fn authorize_validate_invoice(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        can_transition(actor, &WorkflowTransition::ValidateInvoice)
    }

    /// Checks if an actor may mark an invoice paid.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an accountant or admin.
    pub fn authorize_mark_invoice_paid(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        can_transition(actor, &WorkflowTransition::MarkInvoicePaid)
    }

    /// Checks if an actor may reject an invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor fails the policy.
    pub fn authorize_reject_invoice(
        actor: &AuthenticatedActor,
        invoice: &Invoice,
    ) -> Result<(), AuthError> {
        can_transition(actor, &WorkflowTransition::RejectInvoice { invoice })
    }
}
