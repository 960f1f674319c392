// ==========================================
// Cổng đăng ký học phần - Proposal API
// ==========================================
// Responsibility: the two-tier approval operations, composing the proposal
// store with the approval core
// Rule: every successful transition appends an immutable audit record;
// the optimistic revision check decides races, never a silent double-apply
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::audit::TransitionLog;
use crate::domain::proposal::CourseProposal;
use crate::domain::types::{ActorRole, ProposalState};
use crate::engine::approval_core::{ApprovalCore, ReviewAction};
use crate::engine::events::{TransitionEvent, TransitionEventKind, TransitionEventPublisher};
use crate::repository::audit_repo::TransitionLogRepository;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryError;
use crate::repository::proposal_repo::ProposalRepository;

// ==========================================
// ProposalApi
// ==========================================
pub struct ProposalApi {
    proposal_repo: Arc<ProposalRepository>,
    catalog_repo: Arc<CatalogRepository>,
    transition_log_repo: Arc<TransitionLogRepository>,
    event_publisher: Option<Arc<dyn TransitionEventPublisher>>,
}

impl ProposalApi {
    pub fn new(
        proposal_repo: Arc<ProposalRepository>,
        catalog_repo: Arc<CatalogRepository>,
        transition_log_repo: Arc<TransitionLogRepository>,
        event_publisher: Option<Arc<dyn TransitionEventPublisher>>,
    ) -> Self {
        Self {
            proposal_repo,
            catalog_repo,
            transition_log_repo,
            event_publisher,
        }
    }

    // ==========================================
    // Submission
    // ==========================================

    /// Create a proposal in PENDING after validating both references.
    pub fn submit(
        &self,
        course_id: &str,
        teacher_id: &str,
        proposed_by: &str,
    ) -> ApiResult<CourseProposal> {
        if course_id.trim().is_empty() || teacher_id.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "course and teacher references must not be empty".to_string(),
            ));
        }
        if proposed_by.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "proposer reference must not be empty".to_string(),
            ));
        }

        if !self.catalog_repo.course_exists(course_id)? {
            return Err(ApiError::NotFound(format!("Course with id={course_id}")));
        }
        if !self.catalog_repo.teacher_exists(teacher_id)? {
            return Err(ApiError::NotFound(format!("Teacher with id={teacher_id}")));
        }

        let now = chrono::Local::now().naive_local();
        let proposal = CourseProposal {
            proposal_id: uuid::Uuid::new_v4().to_string(),
            course_id: course_id.to_string(),
            teacher_id: teacher_id.to_string(),
            proposed_by: proposed_by.to_string(),
            state: ProposalState::Pending,
            rejection_reason: None,
            last_transition_ts: now,
            last_transition_role: None,
            created_at: now,
            revision: 0,
        };

        self.proposal_repo.insert(&proposal)?;

        let log = TransitionLog {
            log_id: uuid::Uuid::new_v4().to_string(),
            proposal_id: proposal.proposal_id.clone(),
            actor_role: ActorRole::FacultyAssistant.to_db_str().to_string(),
            from_state: None,
            to_state: ProposalState::Pending.to_db_str().to_string(),
            reason: None,
            payload_json: Some(serde_json::json!({
                "course_id": course_id,
                "teacher_id": teacher_id,
                "proposed_by": proposed_by,
            })),
            logged_at: now,
        };
        self.transition_log_repo.insert(&log)?;

        self.publish(TransitionEvent::new(
            proposal.proposal_id.clone(),
            TransitionEventKind::ProposalSubmitted,
            Some(proposed_by.to_string()),
            now,
            None,
        ));

        Ok(proposal)
    }

    // ==========================================
    // Review transitions
    // ==========================================

    /// Advance the proposal through the acting role's gate.
    pub fn approve(&self, proposal_id: &str, actor: ActorRole) -> ApiResult<CourseProposal> {
        self.review(proposal_id, actor, ReviewAction::Approve, None)
    }

    /// Close the proposal as REJECTED with a mandatory reason.
    pub fn reject(
        &self,
        proposal_id: &str,
        actor: ActorRole,
        reason: &str,
    ) -> ApiResult<CourseProposal> {
        if reason.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "rejection reason must not be empty".to_string(),
            ));
        }
        self.review(proposal_id, actor, ReviewAction::Reject, Some(reason.trim()))
    }

    fn review(
        &self,
        proposal_id: &str,
        actor: ActorRole,
        action: ReviewAction,
        reason: Option<&str>,
    ) -> ApiResult<CourseProposal> {
        let proposal = self
            .proposal_repo
            .find_by_id(proposal_id)?
            .ok_or_else(|| ApiError::NotFound(format!("CourseProposal with id={proposal_id}")))?;

        let next_state = ApprovalCore::check(proposal.state, actor, action)?;
        let now = chrono::Local::now().naive_local();

        match self.proposal_repo.transition(
            proposal_id,
            proposal.revision,
            next_state,
            actor.to_db_str(),
            reason,
            now,
        ) {
            Ok(()) => {}
            Err(RepositoryError::OptimisticLockFailure { .. }) => {
                // lost the race: re-evaluate against the committed state so
                // the caller gets the accurate verdict, not a stale one
                let committed = self.proposal_repo.find_by_id(proposal_id)?.ok_or_else(|| {
                    ApiError::NotFound(format!("CourseProposal with id={proposal_id}"))
                })?;
                ApprovalCore::check(committed.state, actor, action)?;
                return Err(ApiError::Conflict(format!(
                    "proposal {proposal_id} was reviewed concurrently"
                )));
            }
            Err(e) => return Err(e.into()),
        }

        let log = TransitionLog {
            log_id: uuid::Uuid::new_v4().to_string(),
            proposal_id: proposal_id.to_string(),
            actor_role: actor.to_db_str().to_string(),
            from_state: Some(proposal.state.to_db_str().to_string()),
            to_state: next_state.to_db_str().to_string(),
            reason: reason.map(|r| r.to_string()),
            payload_json: Some(serde_json::json!({ "action": action.to_string() })),
            logged_at: now,
        };
        self.transition_log_repo.insert(&log)?;

        let event_kind = match action {
            ReviewAction::Approve => TransitionEventKind::ProposalApproved,
            ReviewAction::Reject => TransitionEventKind::ProposalRejected,
        };
        self.publish(TransitionEvent::new(
            proposal_id,
            event_kind,
            Some(actor.to_db_str().to_string()),
            now,
            Some(format!("{} -> {}", proposal.state, next_state)),
        ));

        self.proposal_repo
            .find_by_id(proposal_id)?
            .ok_or_else(|| ApiError::NotFound(format!("CourseProposal with id={proposal_id}")))
    }

    // ==========================================
    // Reads
    // ==========================================

    pub fn state_of(&self, proposal_id: &str) -> ApiResult<ProposalState> {
        let proposal = self
            .proposal_repo
            .find_by_id(proposal_id)?
            .ok_or_else(|| ApiError::NotFound(format!("CourseProposal with id={proposal_id}")))?;
        Ok(proposal.state)
    }

    pub fn find(&self, proposal_id: &str) -> ApiResult<Option<CourseProposal>> {
        Ok(self.proposal_repo.find_by_id(proposal_id)?)
    }

    /// Full audit history, oldest first (dispute resolution)
    pub fn history(&self, proposal_id: &str) -> ApiResult<Vec<TransitionLog>> {
        self.proposal_repo
            .find_by_id(proposal_id)?
            .ok_or_else(|| ApiError::NotFound(format!("CourseProposal with id={proposal_id}")))?;

        Ok(self.transition_log_repo.find_by_proposal(proposal_id)?)
    }

    // ==========================================
    // Event delivery
    // ==========================================

    fn publish(&self, event: TransitionEvent) {
        if let Some(publisher) = &self.event_publisher {
            if let Err(e) = publisher.publish(event) {
                tracing::warn!("transition event delivery failed: {e}");
            }
        }
    }
}
