// ==========================================
// Cổng đăng ký học phần - Application State
// ==========================================
// Responsibility: application-level shared state; wires the repository
// layer and the API instances over one shared connection
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AccessGate, ProposalApi, TermApi};
use crate::db;
use crate::engine::events::{TracingEventPublisher, TransitionEventPublisher};
use crate::repository::{
    AcademicYearRepository, CatalogRepository, PhaseRepository, ProposalRepository,
    TermActionLogRepository, TermRepository, TransitionLogRepository,
};

/// Application state
///
/// Holds the API instances and shared resources for the surrounding
/// service layer.
pub struct AppState {
    /// Database path
    pub db_path: String,

    /// Term & phase scheduling API
    pub term_api: Arc<TermApi>,

    /// Proposal approval API
    pub proposal_api: Arc<ProposalApi>,

    /// Authorization gate
    pub access_gate: Arc<AccessGate>,

    /// Reference catalog store (populated by the surrounding system)
    pub catalog_repo: Arc<CatalogRepository>,
}

impl AppState {
    /// Build the full wiring over one shared connection.
    ///
    /// Opens the database, applies the unified PRAGMAs, bootstraps the
    /// schema, then constructs repositories and APIs.
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("initializing AppState, database: {}", db_path);

        let conn = db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("cannot open database: {e}"))?;
        db::init_schema(&conn).map_err(|e| format!("cannot initialize schema: {e}"))?;

        match db::read_schema_version(&conn) {
            Ok(Some(v)) if v != db::CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    "schema version {} differs from expected {}",
                    v,
                    db::CURRENT_SCHEMA_VERSION
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("cannot read schema version (continuing): {}", e),
        }

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Repository layer
        // ==========================================
        let year_repo = Arc::new(AcademicYearRepository::new(conn.clone()));
        let term_repo = Arc::new(TermRepository::new(conn.clone()));
        let phase_repo = Arc::new(PhaseRepository::new(conn.clone()));
        let proposal_repo = Arc::new(ProposalRepository::new(conn.clone()));
        let transition_log_repo = Arc::new(TransitionLogRepository::new(conn.clone()));
        let term_action_log_repo = Arc::new(TermActionLogRepository::new(conn.clone()));
        let catalog_repo = Arc::new(CatalogRepository::new(conn.clone()));

        // ==========================================
        // Event sink (fire-and-forget)
        // ==========================================
        let event_publisher: Option<Arc<dyn TransitionEventPublisher>> =
            Some(Arc::new(TracingEventPublisher));

        // ==========================================
        // API layer
        // ==========================================
        let term_api = Arc::new(TermApi::new(
            year_repo,
            term_repo.clone(),
            phase_repo.clone(),
            term_action_log_repo,
            event_publisher.clone(),
        ));

        let proposal_api = Arc::new(ProposalApi::new(
            proposal_repo.clone(),
            catalog_repo.clone(),
            transition_log_repo,
            event_publisher,
        ));

        let access_gate = Arc::new(AccessGate::new(term_repo, phase_repo, proposal_repo));

        tracing::info!("AppState ready");

        Ok(Self {
            db_path,
            term_api,
            proposal_api,
            access_gate,
            catalog_repo,
        })
    }
}
