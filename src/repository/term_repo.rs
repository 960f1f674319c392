// ==========================================
// Cổng đăng ký học phần - Term Repositories
// ==========================================
// Rule: repositories do data mapping only, no business rules
// Concurrency: the current-term pointer moves inside one transaction,
// guarded additionally by the partial unique index on is_current
// ==========================================

use crate::domain::term::{AcademicYear, Term};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// AcademicYearRepository - Năm học
// ==========================================
pub struct AcademicYearRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AcademicYearRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, year: &AcademicYear) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            "INSERT INTO academic_year (year_id, label, created_at) VALUES (?, ?, ?)",
            params![
                &year.year_id,
                &year.label,
                year.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(year.year_id.clone())
    }

    pub fn find_by_id(&self, year_id: &str) -> RepositoryResult<Option<AcademicYear>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            "SELECT year_id, label, created_at FROM academic_year WHERE year_id = ?",
            params![year_id],
            |row| {
                Ok(AcademicYear {
                    year_id: row.get(0)?,
                    label: row.get(1)?,
                    created_at: parse_datetime(row.get::<_, String>(2)?, 2)?,
                })
            },
        ) {
            Ok(year) => Ok(Some(year)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<AcademicYear>> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT year_id, label, created_at FROM academic_year ORDER BY label")?;
        let years = stmt
            .query_map([], |row| {
                Ok(AcademicYear {
                    year_id: row.get(0)?,
                    label: row.get(1)?,
                    created_at: parse_datetime(row.get::<_, String>(2)?, 2)?,
                })
            })?
            .collect::<Result<Vec<AcademicYear>, _>>()?;

        Ok(years)
    }
}

// ==========================================
// TermRepository - Học kỳ
// ==========================================
pub struct TermRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TermRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, term: &Term) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO term (
                term_id, year_id, label, short_code,
                start_date, end_date, is_current, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &term.term_id,
                &term.year_id,
                &term.label,
                &term.short_code,
                &term.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
                &term.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
                term.is_current,
                term.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(term.term_id.clone())
    }

    pub fn find_by_id(&self, term_id: &str) -> RepositoryResult<Option<Term>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT term_id, year_id, label, short_code,
                      start_date, end_date, is_current, created_at
               FROM term
               WHERE term_id = ?"#,
            params![term_id],
            map_term_row,
        ) {
            Ok(term) => Ok(Some(term)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The single term flagged current, if any
    pub fn find_current(&self) -> RepositoryResult<Option<Term>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT term_id, year_id, label, short_code,
                      start_date, end_date, is_current, created_at
               FROM term
               WHERE is_current = 1"#,
            [],
            map_term_row,
        ) {
            Ok(term) => Ok(Some(term)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_by_year(&self, year_id: &str) -> RepositoryResult<Vec<Term>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT term_id, year_id, label, short_code,
                      start_date, end_date, is_current, created_at
               FROM term
               WHERE year_id = ?
               ORDER BY short_code"#,
        )?;
        let terms = stmt
            .query_map(params![year_id], map_term_row)?
            .collect::<Result<Vec<Term>, _>>()?;

        Ok(terms)
    }

    /// Move the current-term pointer in one transaction.
    ///
    /// Clears every other term's flag, then sets the target's. Returns
    /// `Ok(false)` when the target already was current (no-op).
    ///
    /// # Errors
    /// - `RepositoryError::NotFound`: unknown term_id
    pub fn set_current(&self, term_id: &str) -> RepositoryResult<bool> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let already_current: Option<bool> = match tx.query_row(
            "SELECT is_current FROM term WHERE term_id = ?",
            params![term_id],
            |row| row.get(0),
        ) {
            Ok(v) => Some(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        match already_current {
            None => {
                return Err(RepositoryError::NotFound {
                    entity: "Term".to_string(),
                    id: term_id.to_string(),
                })
            }
            Some(true) => {
                // idempotent: observable state already as requested
                return Ok(false);
            }
            Some(false) => {}
        }

        // clear before set: the partial unique index forbids two flags at once
        tx.execute("UPDATE term SET is_current = 0 WHERE is_current = 1", [])?;
        tx.execute(
            "UPDATE term SET is_current = 1 WHERE term_id = ?",
            params![term_id],
        )?;

        tx.commit()?;
        Ok(true)
    }

    /// Configure the term window. Existing phases are not re-validated here;
    /// validation happens on the next full phase replacement.
    pub fn set_dates(
        &self,
        term_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE term SET start_date = ?, end_date = ? WHERE term_id = ?",
            params![
                start.format("%Y-%m-%d").to_string(),
                end.format("%Y-%m-%d").to_string(),
                term_id,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Term".to_string(),
                id: term_id.to_string(),
            });
        }

        Ok(())
    }

    /// Count of terms flagged current (invariant probe for tests/diagnostics)
    pub fn count_current(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM term WHERE is_current = 1", [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }
}

// ==========================================
// Row mapping
// ==========================================

fn map_term_row(row: &rusqlite::Row) -> rusqlite::Result<Term> {
    Ok(Term {
        term_id: row.get(0)?,
        year_id: row.get(1)?,
        label: row.get(2)?,
        short_code: row.get(3)?,
        start_date: row
            .get::<_, Option<String>>(4)?
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        end_date: row
            .get::<_, Option<String>>(5)?
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        is_current: row.get(6)?,
        created_at: parse_datetime(row.get::<_, String>(7)?, 7)?,
    })
}

pub(super) fn parse_datetime(s: String, col: usize) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
    })
}
