// ==========================================
// Cổng đăng ký học phần - Core Library
// ==========================================
// Scope: academic-term phase scheduling + course-proposal approval
// Stack: Rust + SQLite
// The UI, identity and payment collaborators consume this core through
// the API layer; they are not part of it.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities & types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - business rules
pub mod engine;

// Configuration layer
pub mod config;

// Database infrastructure (connection init / unified PRAGMAs / schema)
pub mod db;

// Logging
pub mod logging;

// API layer - business operations
pub mod api;

// Application layer - wiring
pub mod app;

// ==========================================
// Re-export core types
// ==========================================

// Domain types
pub use domain::types::{ActorRole, PhaseKind, ProposalState};

// Domain entities
pub use domain::{
    AcademicYear, Course, CourseProposal, Phase, PhaseSpec, Teacher, Term, TermActionLog,
    TransitionLog,
};

// Engine
pub use engine::{ApprovalCore, PhaseWindowCore, ReviewAction};

// API
pub use api::{AccessGate, ApiError, ApiResult, DenyReason, GateAction, GateDecision, ProposalApi, TermApi};

// ==========================================
// Constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// System name
pub const APP_NAME: &str = "Cổng đăng ký học phần";

// Database schema tag
pub const DB_VERSION: &str = "v0.1";
