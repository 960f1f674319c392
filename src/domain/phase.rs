// ==========================================
// Cổng đăng ký học phần - Phase Domain Model
// ==========================================
// Giai đoạn (phase): a time-boxed sub-window of a term
// Rule: replaced only as a full ordered batch, never edited one at a time
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::PhaseKind;

// ==========================================
// Phase - Giai đoạn
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub phase_id: String,        // phase ID
    pub term_id: String,         // owning term
    pub kind: PhaseKind,         // phase kind
    pub start_ts: NaiveDateTime, // window start (inclusive)
    pub end_ts: NaiveDateTime,   // window end (inclusive)
    pub is_enabled: bool,        // disabled phases never activate
    pub seq_no: i32,             // position within the submitted batch
}

impl Phase {
    /// Active means enabled and `at` inside the inclusive window
    pub fn is_active_at(&self, at: NaiveDateTime) -> bool {
        self.is_enabled && self.start_ts <= at && at <= self.end_ts
    }

    /// Inclusive window overlap with another phase
    pub fn overlaps(&self, other: &Phase) -> bool {
        self.start_ts <= other.end_ts && other.start_ts <= self.end_ts
    }
}

// ==========================================
// PhaseSpec - batch submission payload
// ==========================================
// One entry of the full phase set the caller submits for a term;
// ids and seq_no are assigned on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub kind: PhaseKind,
    pub start_ts: NaiveDateTime,
    pub end_ts: NaiveDateTime,
    pub is_enabled: bool,
}
