// ==========================================
// Cổng đăng ký học phần - Domain Type Definitions
// ==========================================
// Serialization format: SCREAMING_SNAKE_CASE (aligned with database storage)
// Rule: one canonical vocabulary per state machine, no ad hoc status strings
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Giai đoạn (Phase Kind)
// ==========================================
// Fixed ordered enumeration of the sub-windows of a term.
// Ordering follows the academic calendar, earliest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseKind {
    PreApproval,        // course proposals submitted and reviewed
    EnrollmentIntent,   // students declare intended enrollments
    TimetableAssembly,  // training office assembles the timetable
    CourseRegistration, // binding registration window
    SteadyState,        // term in progress, no registration action
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl PhaseKind {
    /// Chuyển sang chuỗi lưu trữ (database storage string)
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PhaseKind::PreApproval => "PRE_APPROVAL",
            PhaseKind::EnrollmentIntent => "ENROLLMENT_INTENT",
            PhaseKind::TimetableAssembly => "TIMETABLE_ASSEMBLY",
            PhaseKind::CourseRegistration => "COURSE_REGISTRATION",
            PhaseKind::SteadyState => "STEADY_STATE",
        }
    }

    /// Phân tích từ chuỗi lưu trữ (parse from storage string)
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PRE_APPROVAL" => Some(PhaseKind::PreApproval),
            "ENROLLMENT_INTENT" => Some(PhaseKind::EnrollmentIntent),
            "TIMETABLE_ASSEMBLY" => Some(PhaseKind::TimetableAssembly),
            "COURSE_REGISTRATION" => Some(PhaseKind::CourseRegistration),
            "STEADY_STATE" => Some(PhaseKind::SteadyState),
            _ => None,
        }
    }

    /// All kinds in calendar order
    pub fn all() -> [PhaseKind; 5] {
        [
            PhaseKind::PreApproval,
            PhaseKind::EnrollmentIntent,
            PhaseKind::TimetableAssembly,
            PhaseKind::CourseRegistration,
            PhaseKind::SteadyState,
        ]
    }
}

// ==========================================
// Trạng thái đề xuất (Proposal State)
// ==========================================
// Directed, acyclic:
//   PENDING -> DEPT_APPROVED -> OFFICE_APPROVED
//   PENDING -> REJECTED
//   DEPT_APPROVED -> REJECTED
// Rule: OFFICE_APPROVED and REJECTED are terminal, no further transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalState {
    Pending,        // awaiting department-head review
    DeptApproved,   // awaiting training-office review
    OfficeApproved, // registrable
    Rejected,       // closed with reason
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ProposalState {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProposalState::Pending => "PENDING",
            ProposalState::DeptApproved => "DEPT_APPROVED",
            ProposalState::OfficeApproved => "OFFICE_APPROVED",
            ProposalState::Rejected => "REJECTED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ProposalState::Pending),
            "DEPT_APPROVED" => Some(ProposalState::DeptApproved),
            "OFFICE_APPROVED" => Some(ProposalState::OfficeApproved),
            "REJECTED" => Some(ProposalState::Rejected),
            _ => None,
        }
    }

    /// Terminal states accept no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalState::OfficeApproved | ProposalState::Rejected)
    }

    /// Position on the approval chain (REJECTED is off-chain)
    pub fn chain_rank(&self) -> Option<u8> {
        match self {
            ProposalState::Pending => Some(0),
            ProposalState::DeptApproved => Some(1),
            ProposalState::OfficeApproved => Some(2),
            ProposalState::Rejected => None,
        }
    }
}

// ==========================================
// Vai trò (Actor Role)
// ==========================================
// Supplied per request by the identity collaborator as an opaque string.
// Unknown strings parse to None and are denied at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    TrainingOffice,   // phòng đào tạo
    DepartmentHead,   // trưởng khoa
    FacultyAssistant, // trợ lý khoa
    Teacher,          // giảng viên
    Student,          // sinh viên
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ActorRole {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ActorRole::TrainingOffice => "TRAINING_OFFICE",
            ActorRole::DepartmentHead => "DEPARTMENT_HEAD",
            ActorRole::FacultyAssistant => "FACULTY_ASSISTANT",
            ActorRole::Teacher => "TEACHER",
            ActorRole::Student => "STUDENT",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "TRAINING_OFFICE" => Some(ActorRole::TrainingOffice),
            "DEPARTMENT_HEAD" => Some(ActorRole::DepartmentHead),
            "FACULTY_ASSISTANT" => Some(ActorRole::FacultyAssistant),
            "TEACHER" => Some(ActorRole::Teacher),
            "STUDENT" => Some(ActorRole::Student),
            _ => None,
        }
    }
}
