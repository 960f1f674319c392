// ==========================================
// Cổng đăng ký học phần - Approval Core (pure functions)
// ==========================================
// Responsibility: the two-tier approval transition table
//   PENDING --(department head approves)--> DEPT_APPROVED
//   PENDING --(department head rejects)---> REJECTED
//   DEPT_APPROVED --(training office approves)--> OFFICE_APPROVED
//   DEPT_APPROVED --(training office rejects)---> REJECTED
// Rule: stateless, no side effects, no I/O
// ==========================================

use crate::domain::types::{ActorRole, ProposalState};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ReviewAction - what a reviewer asks for
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewAction::Approve => write!(f, "APPROVE"),
            ReviewAction::Reject => write!(f, "REJECT"),
        }
    }
}

// ==========================================
// TransitionError - typed gate verdicts
// ==========================================
// Forbidden: the actor's gate has not been reached yet (or the role has no
// gate at all): wrong role for the current state.
// InvalidTransition: the proposal is terminal, or the actor's gate already
// passed: an out-of-order repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    Forbidden {
        role: ActorRole,
        state: ProposalState,
    },
    InvalidTransition {
        state: ProposalState,
    },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::Forbidden { role, state } => {
                write!(f, "role {role} does not hold the gate for state {state}")
            }
            TransitionError::InvalidTransition { state } => {
                write!(f, "no transition accepted from state {state}")
            }
        }
    }
}

// ==========================================
// ApprovalCore - pure transition table
// ==========================================
pub struct ApprovalCore;

impl ApprovalCore {
    /// The state a role's gate acts on. Roles outside the approval chain
    /// hold no gate.
    pub fn gate_state(role: ActorRole) -> Option<ProposalState> {
        match role {
            ActorRole::DepartmentHead => Some(ProposalState::Pending),
            ActorRole::TrainingOffice => Some(ProposalState::DeptApproved),
            _ => None,
        }
    }

    /// Target state of an approval from a chain state
    pub fn approve_target(state: ProposalState) -> Option<ProposalState> {
        match state {
            ProposalState::Pending => Some(ProposalState::DeptApproved),
            ProposalState::DeptApproved => Some(ProposalState::OfficeApproved),
            _ => None,
        }
    }

    /// Decide the outcome of a review request against the current state.
    ///
    /// Returns the resulting state on success. Verdict rules:
    /// - terminal state: `InvalidTransition` regardless of role
    /// - actor's gate is the current state: transition applies
    /// - actor's gate lies further along the chain: `Forbidden`
    ///   (the review is not theirs yet)
    /// - actor's gate already passed, or the role holds no gate:
    ///   the request is out of order / not theirs at all
    pub fn check(
        state: ProposalState,
        role: ActorRole,
        action: ReviewAction,
    ) -> Result<ProposalState, TransitionError> {
        if state.is_terminal() {
            return Err(TransitionError::InvalidTransition { state });
        }

        let gate = match Self::gate_state(role) {
            Some(gate) => gate,
            None => return Err(TransitionError::Forbidden { role, state }),
        };

        if gate == state {
            return match action {
                ReviewAction::Approve => match Self::approve_target(state) {
                    Some(next) => Ok(next),
                    None => Err(TransitionError::InvalidTransition { state }),
                },
                ReviewAction::Reject => Ok(ProposalState::Rejected),
            };
        }

        match (gate.chain_rank(), state.chain_rank()) {
            // gate still ahead: not this actor's turn yet
            (Some(g), Some(s)) if g > s => Err(TransitionError::Forbidden { role, state }),
            // gate already passed: repeat of an applied transition
            _ => Err(TransitionError::InvalidTransition { state }),
        }
    }
}
