// ==========================================
// Cổng đăng ký học phần - Application Layer
// ==========================================
// Responsibility: wiring for the surrounding service process
// ==========================================

pub mod state;

// Re-export
pub use state::AppState;
