// ==========================================
// Cổng đăng ký học phần - Configuration Layer
// ==========================================

pub mod settings;

pub use settings::{default_db_path, Settings, DB_PATH_ENV};
