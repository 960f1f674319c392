// ==========================================
// Cổng đăng ký học phần - Audit Domain Model
// ==========================================
// Rule: every successful write appends a record; history is append-only,
// never mutated or deleted (dispute resolution: who approved this and when)
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// TransitionLog - approval audit record
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionLog {
    pub log_id: String,                  // log ID
    pub proposal_id: String,             // audited proposal
    pub actor_role: String,              // raw role string of the acting party
    pub from_state: Option<String>,      // None for proposal creation
    pub to_state: String,                // resulting state
    pub reason: Option<String>,          // rejection reason when applicable
    pub payload_json: Option<JsonValue>, // operation parameters (JSON)
    pub logged_at: NaiveDateTime,        // when the transition committed
}

// ==========================================
// TermActionLog - term/phase operation record
// ==========================================
// Mirrors the proposal audit for the scheduler aggregate: current-term
// switches, date changes and batch phase replacements all leave a trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermActionLog {
    pub log_id: String,                  // log ID
    pub term_id: String,                 // affected term
    pub action_type: TermActionType,     // operation class
    pub actor: String,                   // operator reference
    pub payload_json: Option<JsonValue>, // operation parameters (JSON)
    pub logged_at: NaiveDateTime,        // when the write committed
}

// ==========================================
// TermActionType - scheduler operation classes
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermActionType {
    SetCurrentTerm, // current-term pointer moved
    SetTermDates,   // term window configured
    ReplacePhases,  // full phase batch replaced
}

impl TermActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermActionType::SetCurrentTerm => "SET_CURRENT_TERM",
            TermActionType::SetTermDates => "SET_TERM_DATES",
            TermActionType::ReplacePhases => "REPLACE_PHASES",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SET_CURRENT_TERM" => Some(TermActionType::SetCurrentTerm),
            "SET_TERM_DATES" => Some(TermActionType::SetTermDates),
            "REPLACE_PHASES" => Some(TermActionType::ReplacePhases),
            _ => None,
        }
    }
}
