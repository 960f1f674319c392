// ==========================================
// Cổng đăng ký học phần - Service Bootstrap
// ==========================================
// Opens the database, bootstraps the schema and wires the APIs; the
// surrounding HTTP layer mounts on top of AppState.
// ==========================================

use regportal_core::app::AppState;
use regportal_core::config::Settings;
use regportal_core::logging;

fn main() {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", regportal_core::APP_NAME);
    tracing::info!("version: {}", regportal_core::VERSION);
    tracing::info!("==================================================");

    let settings = Settings::from_env();
    tracing::info!("database: {}", settings.db_path);

    let app_state = match AppState::new(settings.db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("AppState initialization failed: {e}");
            std::process::exit(1);
        }
    };

    match app_state.term_api.current_term() {
        Ok(Some(term)) => {
            tracing::info!("current term: {} ({})", term.label, term.short_code)
        }
        Ok(None) => tracing::info!("no current term configured"),
        Err(e) => tracing::warn!("cannot read current term: {e}"),
    }

    tracing::info!("core ready; mount the service layer on AppState");
}
