// ==========================================
// Cổng đăng ký học phần - Term Domain Model
// ==========================================
// Năm học / Học kỳ (academic year / term)
// Rule: at most one term system-wide carries is_current = true
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// AcademicYear - Năm học
// ==========================================
// Immutable once created; many terms belong to one year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicYear {
    pub year_id: String,           // year ID
    pub label: String,             // display label, e.g. "2025-2026"
    pub created_at: NaiveDateTime, // creation time
}

// ==========================================
// Term - Học kỳ
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub term_id: String,               // term ID
    pub year_id: String,               // owning academic year
    pub label: String,                 // display label, e.g. "Học kỳ 1"
    pub short_code: String,            // short code, e.g. "HK1-2025"
    pub start_date: Option<NaiveDate>, // unset until explicitly configured
    pub end_date: Option<NaiveDate>,   // unset until explicitly configured
    pub is_current: bool,              // the single "current term" pointer
    pub created_at: NaiveDateTime,     // creation time
}

impl Term {
    /// Both bounds configured
    pub fn has_dates(&self) -> bool {
        self.start_date.is_some() && self.end_date.is_some()
    }

    /// Whether a calendar date falls inside the term window (inclusive).
    /// Terms without configured dates bound nothing.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => true,
        }
    }
}
