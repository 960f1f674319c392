// ==========================================
// Cổng đăng ký học phần - API Layer
// ==========================================
// Responsibility: business operations for the surrounding REST surface,
// composing repositories with the engine cores
// ==========================================

pub mod access_gate;
pub mod error;
pub mod proposal_api;
pub mod term_api;

// Re-export core types
pub use access_gate::{AccessGate, DenyReason, GateAction, GateDecision};
pub use error::{ApiError, ApiResult};
pub use proposal_api::ProposalApi;
pub use term_api::TermApi;
