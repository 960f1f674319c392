// ==========================================
// Cổng đăng ký học phần - Engine Layer
// ==========================================
// Responsibility: business rules as pure logic
// Rule: no data access, no mutation, no I/O
// ==========================================

pub mod approval_core;
pub mod events;
pub mod phase_core;

// Re-export core types
pub use approval_core::{ApprovalCore, ReviewAction, TransitionError};
pub use events::{
    TracingEventPublisher, TransitionEvent, TransitionEventKind, TransitionEventPublisher,
};
pub use phase_core::{ActiveResolution, PhaseWindowCore, PhaseWindowViolation};
