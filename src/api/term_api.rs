// ==========================================
// Cổng đăng ký học phần - Term API
// ==========================================
// Responsibility: academic-year/term administration and the phase
// scheduler operations, composing repositories with the phase-window core
// Rule: every committed write leaves an action record; event delivery is
// fire-and-forget
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::audit::{TermActionLog, TermActionType};
use crate::domain::phase::{Phase, PhaseSpec};
use crate::domain::term::{AcademicYear, Term};
use crate::domain::types::PhaseKind;
use crate::engine::events::{TransitionEvent, TransitionEventKind, TransitionEventPublisher};
use crate::engine::phase_core::PhaseWindowCore;
use crate::repository::audit_repo::TermActionLogRepository;
use crate::repository::phase_repo::PhaseRepository;
use crate::repository::term_repo::{AcademicYearRepository, TermRepository};

// ==========================================
// TermApi
// ==========================================
pub struct TermApi {
    year_repo: Arc<AcademicYearRepository>,
    term_repo: Arc<TermRepository>,
    phase_repo: Arc<PhaseRepository>,
    action_log_repo: Arc<TermActionLogRepository>,
    event_publisher: Option<Arc<dyn TransitionEventPublisher>>,
}

impl TermApi {
    pub fn new(
        year_repo: Arc<AcademicYearRepository>,
        term_repo: Arc<TermRepository>,
        phase_repo: Arc<PhaseRepository>,
        action_log_repo: Arc<TermActionLogRepository>,
        event_publisher: Option<Arc<dyn TransitionEventPublisher>>,
    ) -> Self {
        Self {
            year_repo,
            term_repo,
            phase_repo,
            action_log_repo,
            event_publisher,
        }
    }

    // ==========================================
    // Academic year / term administration
    // ==========================================

    pub fn create_academic_year(&self, label: &str) -> ApiResult<AcademicYear> {
        if label.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "academic year label must not be empty".to_string(),
            ));
        }

        let year = AcademicYear {
            year_id: uuid::Uuid::new_v4().to_string(),
            label: label.trim().to_string(),
            created_at: chrono::Local::now().naive_local(),
        };

        self.year_repo.insert(&year)?;
        Ok(year)
    }

    pub fn create_term(&self, year_id: &str, label: &str, short_code: &str) -> ApiResult<Term> {
        if label.trim().is_empty() || short_code.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "term label and short code must not be empty".to_string(),
            ));
        }

        self.year_repo
            .find_by_id(year_id)?
            .ok_or_else(|| ApiError::NotFound(format!("AcademicYear with id={year_id}")))?;

        let term = Term {
            term_id: uuid::Uuid::new_v4().to_string(),
            year_id: year_id.to_string(),
            label: label.trim().to_string(),
            short_code: short_code.trim().to_string(),
            start_date: None,
            end_date: None,
            is_current: false,
            created_at: chrono::Local::now().naive_local(),
        };

        self.term_repo.insert(&term)?;
        Ok(term)
    }

    pub fn find_term(&self, term_id: &str) -> ApiResult<Option<Term>> {
        Ok(self.term_repo.find_by_id(term_id)?)
    }

    /// The single term the whole system treats as "now"
    pub fn current_term(&self) -> ApiResult<Option<Term>> {
        Ok(self.term_repo.find_current()?)
    }

    // ==========================================
    // Scheduler operations
    // ==========================================

    /// Move the current-term pointer. Atomically clears any other term's
    /// flag; calling it again with the same term is a no-op.
    pub fn set_current_term(&self, term_id: &str, operator: &str) -> ApiResult<()> {
        if term_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("term id must not be empty".to_string()));
        }

        let changed = self.term_repo.set_current(term_id)?;
        if !changed {
            return Ok(());
        }

        let log = TermActionLog {
            log_id: uuid::Uuid::new_v4().to_string(),
            term_id: term_id.to_string(),
            action_type: TermActionType::SetCurrentTerm,
            actor: operator.to_string(),
            payload_json: Some(serde_json::json!({ "term_id": term_id })),
            logged_at: chrono::Local::now().naive_local(),
        };
        self.action_log_repo.insert(&log)?;

        self.publish(TransitionEvent::new(
            term_id,
            TransitionEventKind::CurrentTermChanged,
            Some(operator.to_string()),
            log.logged_at,
            None,
        ));

        Ok(())
    }

    /// Configure the term window. Existing phases are not retroactively
    /// validated; the next full phase replacement re-checks them.
    pub fn set_term_dates(
        &self,
        term_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        operator: &str,
    ) -> ApiResult<()> {
        if start > end {
            return Err(ApiError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        self.term_repo.set_dates(term_id, start, end)?;

        let log = TermActionLog {
            log_id: uuid::Uuid::new_v4().to_string(),
            term_id: term_id.to_string(),
            action_type: TermActionType::SetTermDates,
            actor: operator.to_string(),
            payload_json: Some(serde_json::json!({
                "start_date": start.to_string(),
                "end_date": end.to_string(),
            })),
            logged_at: chrono::Local::now().naive_local(),
        };
        self.action_log_repo.insert(&log)?;

        self.publish(TransitionEvent::new(
            term_id,
            TransitionEventKind::TermDatesChanged,
            Some(operator.to_string()),
            log.logged_at,
            Some(format!("dates set to [{start}, {end}]")),
        ));

        Ok(())
    }

    /// Replace the full phase set of a term in one atomic write.
    ///
    /// Validates the whole batch first (start < end per phase, inside the
    /// term bounds when configured, enabled windows pairwise disjoint); any
    /// violation names the offending phase and leaves the stored set as-is.
    pub fn replace_phases(
        &self,
        term_id: &str,
        specs: &[PhaseSpec],
        operator: &str,
    ) -> ApiResult<Vec<Phase>> {
        let term = self
            .term_repo
            .find_by_id(term_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Term with id={term_id}")))?;

        let phases: Vec<Phase> = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| Phase {
                phase_id: uuid::Uuid::new_v4().to_string(),
                term_id: term_id.to_string(),
                kind: spec.kind,
                start_ts: spec.start_ts,
                end_ts: spec.end_ts,
                is_enabled: spec.is_enabled,
                seq_no: i as i32,
            })
            .collect();

        PhaseWindowCore::validate_phase_set(&term, &phases).map_err(|violation| {
            ApiError::InvalidPhaseWindow {
                kind: violation.kind.to_string(),
                detail: format!("phase #{}: {}", violation.index, violation.detail),
            }
        })?;

        self.phase_repo.replace_for_term(term_id, &phases)?;

        let log = TermActionLog {
            log_id: uuid::Uuid::new_v4().to_string(),
            term_id: term_id.to_string(),
            action_type: TermActionType::ReplacePhases,
            actor: operator.to_string(),
            payload_json: Some(serde_json::json!({
                "phase_count": phases.len(),
                "kinds": phases.iter().map(|p| p.kind.to_db_str()).collect::<Vec<_>>(),
            })),
            logged_at: chrono::Local::now().naive_local(),
        };
        self.action_log_repo.insert(&log)?;

        self.publish(TransitionEvent::new(
            term_id,
            TransitionEventKind::PhasesReplaced,
            Some(operator.to_string()),
            log.logged_at,
            Some(format!("{} phases written", phases.len())),
        ));

        Ok(phases)
    }

    /// The active phase of a term at an instant, if any.
    ///
    /// No active phase is a normal outcome (gap, all disabled). Overlapping
    /// enabled phases (possible when term dates changed after the batch was
    /// written) resolve to the earliest start and raise a consistency
    /// warning in the log.
    pub fn current_phase(&self, term_id: &str, at: NaiveDateTime) -> ApiResult<Option<Phase>> {
        self.term_repo
            .find_by_id(term_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Term with id={term_id}")))?;

        let phases = self.phase_repo.find_by_term(term_id)?;
        let resolution = PhaseWindowCore::resolve_active(&phases, at);

        if resolution.active_count > 1 {
            tracing::warn!(
                term_id = term_id,
                active_count = resolution.active_count,
                "overlapping enabled phases observed at read time; earliest start wins"
            );
        }

        Ok(resolution.winner.cloned())
    }

    /// Whether the given phase kind is the active one at `at`
    pub fn is_action_permitted(
        &self,
        term_id: &str,
        kind: PhaseKind,
        at: NaiveDateTime,
    ) -> ApiResult<bool> {
        let current = self.current_phase(term_id, at)?;
        Ok(current.map(|p| p.kind) == Some(kind))
    }

    /// Ordered phase set of a term (batch order)
    pub fn list_phases(&self, term_id: &str) -> ApiResult<Vec<Phase>> {
        self.term_repo
            .find_by_id(term_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Term with id={term_id}")))?;

        Ok(self.phase_repo.find_by_term(term_id)?)
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
