// ==========================================
// Cổng đăng ký học phần - Engine Event Publishing
// ==========================================
// Responsibility: define the transition event trait; the notification
// layer supplies the adapter (dependency inversion, engine stays leaf)
// Rule: delivery is fire-and-forget; a failed publish never rolls back
// the committed write
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;

// ==========================================
// Transition event types
// ==========================================

/// Event classes emitted after committed writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionEventKind {
    CurrentTermChanged,
    TermDatesChanged,
    PhasesReplaced,
    ProposalSubmitted,
    ProposalApproved,
    ProposalRejected,
}

impl TransitionEventKind {
    pub fn as_str(&self) -> &str {
        match self {
            TransitionEventKind::CurrentTermChanged => "CurrentTermChanged",
            TransitionEventKind::TermDatesChanged => "TermDatesChanged",
            TransitionEventKind::PhasesReplaced => "PhasesReplaced",
            TransitionEventKind::ProposalSubmitted => "ProposalSubmitted",
            TransitionEventKind::ProposalApproved => "ProposalApproved",
            TransitionEventKind::ProposalRejected => "ProposalRejected",
        }
    }
}

/// A committed transition, as handed to the notification sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// Affected aggregate id (term or proposal)
    pub entity_id: String,
    /// Event class
    pub kind: TransitionEventKind,
    /// Acting party (raw role or operator reference)
    pub actor: Option<String>,
    /// When the write committed
    pub occurred_at: NaiveDateTime,
    /// Free-form description for downstream display
    pub detail: Option<String>,
}

impl TransitionEvent {
    pub fn new(
        entity_id: impl Into<String>,
        kind: TransitionEventKind,
        actor: Option<String>,
        occurred_at: NaiveDateTime,
        detail: Option<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            kind,
            actor,
            occurred_at,
            detail,
        }
    }
}

// ==========================================
// Publisher trait
// ==========================================

/// Transition event publisher.
///
/// The API layer publishes after every committed write and only logs a
/// warning when delivery fails; the write itself stands.
pub trait TransitionEventPublisher: Send + Sync {
    fn publish(&self, event: TransitionEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Default sink: structured log lines via tracing
pub struct TracingEventPublisher;

impl TransitionEventPublisher for TracingEventPublisher {
    fn publish(&self, event: TransitionEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::info!(
            kind = event.kind.as_str(),
            entity_id = %event.entity_id,
            actor = event.actor.as_deref().unwrap_or("-"),
            "transition event"
        );
        Ok(())
    }
}
