// ==========================================
// Cổng đăng ký học phần - Proposal Repository
// ==========================================
// Concurrency: state transitions carry an optimistic revision check so
// exactly one of two racing writers observes the pre-transition state
// ==========================================

use crate::domain::proposal::CourseProposal;
use crate::domain::types::ProposalState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::term_repo::parse_datetime;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct ProposalRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProposalRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, proposal: &CourseProposal) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO course_proposal (
                proposal_id, course_id, teacher_id, proposed_by, state,
                rejection_reason, last_transition_ts, last_transition_role,
                created_at, revision
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &proposal.proposal_id,
                &proposal.course_id,
                &proposal.teacher_id,
                &proposal.proposed_by,
                proposal.state.to_db_str(),
                &proposal.rejection_reason,
                proposal
                    .last_transition_ts
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
                &proposal.last_transition_role,
                proposal.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                proposal.revision,
            ],
        )?;

        Ok(proposal.proposal_id.clone())
    }

    pub fn find_by_id(&self, proposal_id: &str) -> RepositoryResult<Option<CourseProposal>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT proposal_id, course_id, teacher_id, proposed_by, state,
                      rejection_reason, last_transition_ts, last_transition_role,
                      created_at, revision
               FROM course_proposal
               WHERE proposal_id = ?"#,
            params![proposal_id],
            map_proposal_row,
        ) {
            Ok(proposal) => Ok(Some(proposal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_by_state(&self, state: ProposalState) -> RepositoryResult<Vec<CourseProposal>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT proposal_id, course_id, teacher_id, proposed_by, state,
                      rejection_reason, last_transition_ts, last_transition_role,
                      created_at, revision
               FROM course_proposal
               WHERE state = ?
               ORDER BY created_at"#,
        )?;
        let proposals = stmt
            .query_map(params![state.to_db_str()], map_proposal_row)?
            .collect::<Result<Vec<CourseProposal>, _>>()?;

        Ok(proposals)
    }

    /// Apply a state transition with an optimistic revision check.
    ///
    /// # Errors
    /// - `RepositoryError::OptimisticLockFailure`: revision moved underneath
    ///   the caller (a concurrent transition committed first)
    /// - `RepositoryError::NotFound`: proposal_id unknown
    pub fn transition(
        &self,
        proposal_id: &str,
        expected_revision: i32,
        to_state: ProposalState,
        actor_role: &str,
        rejection_reason: Option<&str>,
        at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows_affected = conn.execute(
            r#"UPDATE course_proposal
               SET state = ?, rejection_reason = ?, last_transition_ts = ?,
                   last_transition_role = ?, revision = revision + 1
               WHERE proposal_id = ? AND revision = ?"#,
            params![
                to_state.to_db_str(),
                rejection_reason,
                at.format("%Y-%m-%d %H:%M:%S").to_string(),
                actor_role,
                proposal_id,
                expected_revision,
            ],
        )?;

        if rows_affected == 0 {
            // distinguish missing record from a lost race
            let exists: Result<i32, _> = conn.query_row(
                "SELECT revision FROM course_proposal WHERE proposal_id = ?",
                params![proposal_id],
                |row| row.get(0),
            );

            return match exists {
                Ok(actual_revision) => Err(RepositoryError::OptimisticLockFailure {
                    entity: "CourseProposal".to_string(),
                    id: proposal_id.to_string(),
                    expected: expected_revision,
                    actual: actual_revision,
                }),
                Err(_) => Err(RepositoryError::NotFound {
                    entity: "CourseProposal".to_string(),
                    id: proposal_id.to_string(),
                }),
            };
        }

        Ok(())
    }
}

// ==========================================
// Row mapping
// ==========================================

fn map_proposal_row(row: &rusqlite::Row) -> rusqlite::Result<CourseProposal> {
    let state_str: String = row.get(4)?;
    let state = ProposalState::from_db_str(&state_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown proposal state: {state_str}").into(),
        )
    })?;

    Ok(CourseProposal {
        proposal_id: row.get(0)?,
        course_id: row.get(1)?,
        teacher_id: row.get(2)?,
        proposed_by: row.get(3)?,
        state,
        rejection_reason: row.get(5)?,
        last_transition_ts: parse_datetime(row.get::<_, String>(6)?, 6)?,
        last_transition_role: row.get(7)?,
        created_at: parse_datetime(row.get::<_, String>(8)?, 8)?,
        revision: row.get(9)?,
    })
}
