// ==========================================
// Cổng đăng ký học phần - Runtime Settings
// ==========================================
// Responsibility: resolve where the database lives; env var first,
// user data directory second
// ==========================================

use std::path::PathBuf;

/// Env var that overrides the database location (debug/test/CI)
pub const DB_PATH_ENV: &str = "REGPORTAL_DB_PATH";

/// Runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Database file path
    pub db_path: String,
}

impl Settings {
    /// Resolve settings from the environment
    pub fn from_env() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Resolve the default database path.
///
/// Order: `REGPORTAL_DB_PATH` env var, then the user data directory
/// (a separate directory in debug builds so development never touches
/// production data), then the working directory as a last resort.
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./regportal_core.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("regportal-core-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("regportal-core");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("regportal_core.db");
    }

    path.to_string_lossy().to_string()
}
