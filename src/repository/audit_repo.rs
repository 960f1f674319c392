// ==========================================
// Cổng đăng ký học phần - Audit Repositories
// ==========================================
// Rule: append-only. No update or delete path exists in this module;
// audit history is the record of dispute resolution.
// ==========================================

use crate::domain::audit::{TermActionLog, TermActionType, TransitionLog};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::term_repo::parse_datetime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// TransitionLogRepository - approval audit
// ==========================================
pub struct TransitionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TransitionLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, log: &TransitionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO transition_log (
                log_id, proposal_id, actor_role, from_state, to_state,
                reason, payload_json, logged_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &log.log_id,
                &log.proposal_id,
                &log.actor_role,
                &log.from_state,
                &log.to_state,
                &log.reason,
                log.payload_json.as_ref().map(|v| v.to_string()),
                log.logged_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(log.log_id.clone())
    }

    /// Full history of a proposal, oldest first
    pub fn find_by_proposal(&self, proposal_id: &str) -> RepositoryResult<Vec<TransitionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT log_id, proposal_id, actor_role, from_state, to_state,
                      reason, payload_json, logged_at
               FROM transition_log
               WHERE proposal_id = ?
               ORDER BY logged_at, log_id"#,
        )?;
        let logs = stmt
            .query_map(params![proposal_id], |row| {
                Ok(TransitionLog {
                    log_id: row.get(0)?,
                    proposal_id: row.get(1)?,
                    actor_role: row.get(2)?,
                    from_state: row.get(3)?,
                    to_state: row.get(4)?,
                    reason: row.get(5)?,
                    payload_json: row
                        .get::<_, Option<String>>(6)?
                        .and_then(|s| serde_json::from_str(&s).ok()),
                    logged_at: parse_datetime(row.get::<_, String>(7)?, 7)?,
                })
            })?
            .collect::<Result<Vec<TransitionLog>, _>>()?;

        Ok(logs)
    }
}

// ==========================================
// TermActionLogRepository - scheduler audit
// ==========================================
pub struct TermActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TermActionLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, log: &TermActionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO term_action_log (
                log_id, term_id, action_type, actor, payload_json, logged_at
            ) VALUES (?, ?, ?, ?, ?, ?)"#,
            params![
                &log.log_id,
                &log.term_id,
                log.action_type.as_str(),
                &log.actor,
                log.payload_json.as_ref().map(|v| v.to_string()),
                log.logged_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(log.log_id.clone())
    }

    pub fn find_by_term(&self, term_id: &str) -> RepositoryResult<Vec<TermActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT log_id, term_id, action_type, actor, payload_json, logged_at
               FROM term_action_log
               WHERE term_id = ?
               ORDER BY logged_at, log_id"#,
        )?;
        let logs = stmt
            .query_map(params![term_id], |row| {
                let action_str: String = row.get(2)?;
                let action_type = TermActionType::from_str(&action_str).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        format!("unknown term action type: {action_str}").into(),
                    )
                })?;
                Ok(TermActionLog {
                    log_id: row.get(0)?,
                    term_id: row.get(1)?,
                    action_type,
                    actor: row.get(3)?,
                    payload_json: row
                        .get::<_, Option<String>>(4)?
                        .and_then(|s| serde_json::from_str(&s).ok()),
                    logged_at: parse_datetime(row.get::<_, String>(5)?, 5)?,
                })
            })?
            .collect::<Result<Vec<TermActionLog>, _>>()?;

        Ok(logs)
    }
}
