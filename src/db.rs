// ==========================================
// Cổng đăng ký học phần - SQLite Connection Setup
// ==========================================
// Goals:
// - single place for Connection::open PRAGMA behavior, so every module
//   runs with foreign keys on and the same busy_timeout
// - schema bootstrap + schema_version bookkeeping (warn, no auto-migrate)
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema version the code expects
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply the unified PRAGMA set to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Read schema_version (None when the table does not exist yet).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Create all tables if missing and stamp the schema version.
///
/// Idempotent; safe to call on every startup.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS academic_year (
            year_id     TEXT PRIMARY KEY,
            label       TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS term (
            term_id     TEXT PRIMARY KEY,
            year_id     TEXT NOT NULL REFERENCES academic_year(year_id),
            label       TEXT NOT NULL,
            short_code  TEXT NOT NULL,
            start_date  TEXT,
            end_date    TEXT,
            is_current  INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        );

        -- database-level backstop for the single-current-term rule
        CREATE UNIQUE INDEX IF NOT EXISTS idx_term_single_current
            ON term(is_current) WHERE is_current = 1;

        CREATE TABLE IF NOT EXISTS phase (
            phase_id    TEXT PRIMARY KEY,
            term_id     TEXT NOT NULL REFERENCES term(term_id) ON DELETE CASCADE,
            kind        TEXT NOT NULL,
            start_ts    TEXT NOT NULL,
            end_ts      TEXT NOT NULL,
            is_enabled  INTEGER NOT NULL DEFAULT 1,
            seq_no      INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_phase_term ON phase(term_id, seq_no);

        CREATE TABLE IF NOT EXISTS course (
            course_id   TEXT PRIMARY KEY,
            code        TEXT NOT NULL UNIQUE,
            name        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS teacher (
            teacher_id  TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            department  TEXT
        );

        CREATE TABLE IF NOT EXISTS course_proposal (
            proposal_id          TEXT PRIMARY KEY,
            course_id            TEXT NOT NULL REFERENCES course(course_id),
            teacher_id           TEXT NOT NULL REFERENCES teacher(teacher_id),
            proposed_by          TEXT NOT NULL,
            state                TEXT NOT NULL,
            rejection_reason     TEXT,
            last_transition_ts   TEXT NOT NULL,
            last_transition_role TEXT,
            created_at           TEXT NOT NULL,
            revision             INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_proposal_state ON course_proposal(state);

        -- append-only; no UPDATE/DELETE path exists in the repository layer
        CREATE TABLE IF NOT EXISTS transition_log (
            log_id       TEXT PRIMARY KEY,
            proposal_id  TEXT NOT NULL REFERENCES course_proposal(proposal_id),
            actor_role   TEXT NOT NULL,
            from_state   TEXT,
            to_state     TEXT NOT NULL,
            reason       TEXT,
            payload_json TEXT,
            logged_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transition_log_proposal
            ON transition_log(proposal_id, logged_at);

        CREATE TABLE IF NOT EXISTS term_action_log (
            log_id       TEXT PRIMARY KEY,
            term_id      TEXT NOT NULL,
            action_type  TEXT NOT NULL,
            actor        TEXT NOT NULL,
            payload_json TEXT,
            logged_at    TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(
            read_schema_version(&conn).unwrap(),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }
}
