// ==========================================
// Cổng đăng ký học phần - Proposal Domain Model
// ==========================================
// Đề xuất học phần (course proposal): a faculty assistant's request to
// offer a course with an assigned teacher, subject to two-tier approval
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::ProposalState;

// ==========================================
// CourseProposal - Đề xuất học phần
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseProposal {
    pub proposal_id: String,                  // proposal ID
    pub course_id: String,                    // proposed course reference
    pub teacher_id: String,                   // assigned teacher reference
    pub proposed_by: String,                  // proposing assistant reference (opaque)
    pub state: ProposalState,                 // current approval state
    pub rejection_reason: Option<String>,     // present only when state = REJECTED
    pub last_transition_ts: NaiveDateTime,    // when the state last changed
    pub last_transition_role: Option<String>, // raw role string of the last actor
    pub created_at: NaiveDateTime,            // creation time
    pub revision: i32,                        // optimistic lock counter
}

impl CourseProposal {
    /// No further transitions accepted once terminal
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn is_registrable(&self) -> bool {
        self.state == ProposalState::OfficeApproved
    }
}

// ==========================================
// Course / Teacher - reference catalog
// ==========================================
// Minimal reference data so proposal references can be validated.
// Populated by the surrounding system, read-mostly here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String, // course ID
    pub code: String,      // course code, e.g. "INT3306"
    pub name: String,      // display name
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub teacher_id: String,         // teacher ID
    pub name: String,               // display name
    pub department: Option<String>, // owning department
}
