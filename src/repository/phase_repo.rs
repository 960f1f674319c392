// ==========================================
// Cổng đăng ký học phần - Phase Repository
// ==========================================
// Rule: the phase set of a term is written as a full batch in one
// transaction; there is no single-phase edit path
// ==========================================

use crate::domain::phase::Phase;
use crate::domain::types::PhaseKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct PhaseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PhaseRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Replace the full phase set of a term: delete + ordered insert,
    /// all inside one transaction. Phases of other terms are untouched.
    pub fn replace_for_term(&self, term_id: &str, phases: &[Phase]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM phase WHERE term_id = ?", params![term_id])?;

        let mut count = 0;
        for phase in phases {
            tx.execute(
                r#"INSERT INTO phase (
                    phase_id, term_id, kind, start_ts, end_ts, is_enabled, seq_no
                ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
                params![
                    &phase.phase_id,
                    &phase.term_id,
                    phase.kind.to_db_str(),
                    phase.start_ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                    phase.end_ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                    phase.is_enabled,
                    phase.seq_no,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    /// Ordered phase set of a term (batch order)
    pub fn find_by_term(&self, term_id: &str) -> RepositoryResult<Vec<Phase>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT phase_id, term_id, kind, start_ts, end_ts, is_enabled, seq_no
               FROM phase
               WHERE term_id = ?
               ORDER BY seq_no"#,
        )?;
        let phases = stmt
            .query_map(params![term_id], map_phase_row)?
            .collect::<Result<Vec<Phase>, _>>()?;

        Ok(phases)
    }

    pub fn find_by_id(&self, phase_id: &str) -> RepositoryResult<Option<Phase>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT phase_id, term_id, kind, start_ts, end_ts, is_enabled, seq_no
               FROM phase
               WHERE phase_id = ?"#,
            params![phase_id],
            map_phase_row,
        ) {
            Ok(phase) => Ok(Some(phase)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

// ==========================================
// Row mapping
// ==========================================

fn map_phase_row(row: &rusqlite::Row) -> rusqlite::Result<Phase> {
    let kind_str: String = row.get(2)?;
    let kind = PhaseKind::from_db_str(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown phase kind: {kind_str}").into(),
        )
    })?;

    Ok(Phase {
        phase_id: row.get(0)?,
        term_id: row.get(1)?,
        kind,
        start_ts: parse_ts(row.get::<_, String>(3)?, 3)?,
        end_ts: parse_ts(row.get::<_, String>(4)?, 4)?,
        is_enabled: row.get(5)?,
        seq_no: row.get(6)?,
    })
}

fn parse_ts(s: String, col: usize) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
    })
}
