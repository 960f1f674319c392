// ==========================================
// Cổng đăng ký học phần - Domain Layer
// ==========================================
// Entities, typed enumerations, state-machine vocabulary
// Rule: no data access logic, no engine logic
// ==========================================

pub mod audit;
pub mod phase;
pub mod proposal;
pub mod term;
pub mod types;

// Re-export core types
pub use audit::{TermActionLog, TermActionType, TransitionLog};
pub use phase::{Phase, PhaseSpec};
pub use proposal::{Course, CourseProposal, Teacher};
pub use term::{AcademicYear, Term};
pub use types::{ActorRole, PhaseKind, ProposalState};
