// ==========================================
// Cổng đăng ký học phần - Access Gate
// ==========================================
// Responsibility: one authorization decision composing both state
// machines: the active phase must permit the action class AND, for
// review actions, the approval core must accept the transition
// Rule: pure reads, no mutation; deny reasons are structured so the
// calling layer never string-matches
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::{ActorRole, PhaseKind, ProposalState};
use crate::engine::approval_core::{ApprovalCore, ReviewAction, TransitionError};
use crate::engine::phase_core::PhaseWindowCore;
use crate::repository::phase_repo::PhaseRepository;
use crate::repository::proposal_repo::ProposalRepository;
use crate::repository::term_repo::TermRepository;

// ==========================================
// GateAction - action classes
// ==========================================
// The static mapping from each class to its legal phases and roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateAction {
    SubmitProposal,         // faculty assistant files a course proposal
    ReviewProposal,         // department head / training office review
    DeclareEnrollmentIntent,// student declares intended enrollment
    AssembleTimetable,      // training office builds the timetable
    RegisterCourse,         // student binding registration
    RecordPaymentOutcome,   // external payment fact attached to a registration
}

impl GateAction {
    /// Phases during which the action class is legal
    pub fn allowed_phases(&self) -> &'static [PhaseKind] {
        match self {
            GateAction::SubmitProposal | GateAction::ReviewProposal => {
                &[PhaseKind::PreApproval]
            }
            GateAction::DeclareEnrollmentIntent => &[PhaseKind::EnrollmentIntent],
            GateAction::AssembleTimetable => &[PhaseKind::TimetableAssembly],
            GateAction::RegisterCourse => &[PhaseKind::CourseRegistration],
            GateAction::RecordPaymentOutcome => {
                &[PhaseKind::CourseRegistration, PhaseKind::SteadyState]
            }
        }
    }

    /// Roles that may request the action class at all. Review legality per
    /// proposal is decided by the approval core on top of this.
    pub fn allowed_roles(&self) -> &'static [ActorRole] {
        match self {
            GateAction::SubmitProposal => &[ActorRole::FacultyAssistant],
            GateAction::ReviewProposal => {
                &[ActorRole::DepartmentHead, ActorRole::TrainingOffice]
            }
            GateAction::DeclareEnrollmentIntent
            | GateAction::RegisterCourse
            | GateAction::RecordPaymentOutcome => &[ActorRole::Student],
            GateAction::AssembleTimetable => &[ActorRole::TrainingOffice],
        }
    }
}

// ==========================================
// GateDecision / DenyReason
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenyReason {
    /// The term's active phase (if any) does not permit this action class
    WrongPhase {
        required: Vec<PhaseKind>,
        active: Option<PhaseKind>,
    },
    /// The role may never request this action class, or does not hold the
    /// gate for the proposal's current state
    WrongRole { role: String },
    /// The targeted proposal accepts no such transition (terminal or
    /// out-of-order repeat)
    InvalidTransition { state: ProposalState },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateDecision {
    Permit,
    Deny(DenyReason),
}

impl GateDecision {
    pub fn is_permitted(&self) -> bool {
        matches!(self, GateDecision::Permit)
    }
}

// ==========================================
// AccessGate
// ==========================================
pub struct AccessGate {
    term_repo: Arc<TermRepository>,
    phase_repo: Arc<PhaseRepository>,
    proposal_repo: Arc<ProposalRepository>,
}

impl AccessGate {
    pub fn new(
        term_repo: Arc<TermRepository>,
        phase_repo: Arc<PhaseRepository>,
        proposal_repo: Arc<ProposalRepository>,
    ) -> Self {
        Self {
            term_repo,
            phase_repo,
            proposal_repo,
        }
    }

    /// Decide whether `actor` may perform `action` against `term_id` at
    /// instant `at`. Review actions must name their target proposal.
    ///
    /// Unknown term or proposal ids are caller errors (`NotFound`), not
    /// policy denials.
    pub fn decide(
        &self,
        actor: ActorRole,
        action: GateAction,
        term_id: &str,
        proposal_id: Option<&str>,
        at: NaiveDateTime,
    ) -> ApiResult<GateDecision> {
        self.term_repo
            .find_by_id(term_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Term with id={term_id}")))?;

        // 1. phase gate
        let phases = self.phase_repo.find_by_term(term_id)?;
        let resolution = PhaseWindowCore::resolve_active(&phases, at);
        if resolution.active_count > 1 {
            tracing::warn!(
                term_id = term_id,
                active_count = resolution.active_count,
                "overlapping enabled phases observed at read time; earliest start wins"
            );
        }
        let active = resolution.winner.map(|p| p.kind);

        let allowed_phases = action.allowed_phases();
        if !active.is_some_and(|kind| allowed_phases.contains(&kind)) {
            return Ok(GateDecision::Deny(DenyReason::WrongPhase {
                required: allowed_phases.to_vec(),
                active,
            }));
        }

        // 2. role gate
        if !action.allowed_roles().contains(&actor) {
            return Ok(GateDecision::Deny(DenyReason::WrongRole {
                role: actor.to_db_str().to_string(),
            }));
        }

        // 3. per-proposal transition gate
        if action == GateAction::ReviewProposal {
            let proposal_id = proposal_id.ok_or_else(|| {
                ApiError::InvalidInput("review actions must name a proposal".to_string())
            })?;
            let proposal = self.proposal_repo.find_by_id(proposal_id)?.ok_or_else(|| {
                ApiError::NotFound(format!("CourseProposal with id={proposal_id}"))
            })?;

            // approve and reject share the gate, so one probe covers both
            if let Err(e) =
                ApprovalCore::check(proposal.state, actor, ReviewAction::Approve)
            {
                return Ok(GateDecision::Deny(match e {
                    TransitionError::Forbidden { role, .. } => DenyReason::WrongRole {
                        role: role.to_db_str().to_string(),
                    },
                    TransitionError::InvalidTransition { state } => {
                        DenyReason::InvalidTransition { state }
                    }
                }));
            }
        }

        Ok(GateDecision::Permit)
    }

    /// Same decision for a raw role string from the identity collaborator.
    /// Unknown role strings deny as `WrongRole` rather than erroring.
    pub fn decide_raw(
        &self,
        actor_role: &str,
        action: GateAction,
        term_id: &str,
        proposal_id: Option<&str>,
        at: NaiveDateTime,
    ) -> ApiResult<GateDecision> {
        match ActorRole::from_db_str(actor_role) {
            Some(actor) => self.decide(actor, action, term_id, proposal_id, at),
            None => Ok(GateDecision::Deny(DenyReason::WrongRole {
                role: actor_role.to_string(),
            })),
        }
    }
}
