// ==========================================
// Cổng đăng ký học phần - Phase Window Core (pure functions)
// ==========================================
// Responsibility: phase-set validation and active-phase resolution
// Rule: stateless, no side effects, no I/O
// ==========================================

use crate::domain::phase::Phase;
use crate::domain::term::Term;
use crate::domain::types::PhaseKind;
use chrono::NaiveDateTime;

// ==========================================
// PhaseWindowViolation - batch validation failure
// ==========================================
// Names the offending phase so the caller can point at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseWindowViolation {
    pub index: usize,    // position in the submitted batch
    pub kind: PhaseKind, // kind of the offending phase
    pub detail: String,  // human-readable cause
}

// ==========================================
// ActiveResolution - read-time phase lookup
// ==========================================
#[derive(Debug, Clone)]
pub struct ActiveResolution<'a> {
    /// Earliest-starting active phase, if any
    pub winner: Option<&'a Phase>,
    /// Number of simultaneously active enabled phases. More than one means
    /// the stored set drifted (e.g. a later term-date change) and the caller
    /// should emit a consistency warning.
    pub active_count: usize,
}

// ==========================================
// PhaseWindowCore - pure function toolkit
// ==========================================
pub struct PhaseWindowCore;

impl PhaseWindowCore {
    /// Validate a full phase batch against its term.
    ///
    /// Per phase: start < end, and the window inside the term bounds when
    /// the term has dates configured. Across the batch: enabled phases must
    /// be pairwise non-overlapping. First violation wins; the caller keeps
    /// the stored set untouched on any error.
    pub fn validate_phase_set(
        term: &Term,
        phases: &[Phase],
    ) -> Result<(), PhaseWindowViolation> {
        for (index, phase) in phases.iter().enumerate() {
            if phase.start_ts >= phase.end_ts {
                return Err(PhaseWindowViolation {
                    index,
                    kind: phase.kind,
                    detail: format!(
                        "window start {} is not before end {}",
                        phase.start_ts, phase.end_ts
                    ),
                });
            }

            if term.has_dates()
                && !(term.contains_date(phase.start_ts.date())
                    && term.contains_date(phase.end_ts.date()))
            {
                return Err(PhaseWindowViolation {
                    index,
                    kind: phase.kind,
                    detail: format!(
                        "window [{}, {}] falls outside the term dates",
                        phase.start_ts, phase.end_ts
                    ),
                });
            }
        }

        // pairwise overlap among enabled phases only
        for (i, a) in phases.iter().enumerate() {
            if !a.is_enabled {
                continue;
            }
            for b in phases.iter().skip(i + 1) {
                if !b.is_enabled {
                    continue;
                }
                if a.overlaps(b) {
                    return Err(PhaseWindowViolation {
                        index: i,
                        kind: a.kind,
                        detail: format!(
                            "enabled window overlaps {} ([{}, {}] vs [{}, {}])",
                            b.kind, a.start_ts, a.end_ts, b.start_ts, b.end_ts
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// Resolve the active phase at an instant.
    ///
    /// A phase is active when enabled and `at` lies in its inclusive window.
    /// No match is a normal outcome (gap between windows, all disabled).
    /// Should the stored set contain overlapping enabled phases despite the
    /// write-time check, the earliest start wins deterministically.
    pub fn resolve_active(phases: &[Phase], at: NaiveDateTime) -> ActiveResolution<'_> {
        let mut active: Vec<&Phase> = phases.iter().filter(|p| p.is_active_at(at)).collect();
        active.sort_by_key(|p| p.start_ts);

        ActiveResolution {
            winner: active.first().copied(),
            active_count: active.len(),
        }
    }
}
