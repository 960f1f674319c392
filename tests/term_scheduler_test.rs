// ==========================================
// Term scheduler tests
// ==========================================
// Responsibility: current-term pointer, term dates, phase batches,
// active-phase resolution
// ==========================================


#[cfg(test)]
mod term_scheduler_test {
    use regportal_core::api::ApiError;
    use regportal_core::app::AppState;
    use regportal_core::domain::{PhaseSpec, Term};
    use regportal_core::PhaseKind;
    use rusqlite::Connection;
    use tempfile::NamedTempFile;

    use crate::test_helpers::{date, dt, setup_app};

    // ==========================================
    // Helpers
    // ==========================================

    fn setup_with_term() -> (NamedTempFile, AppState, Term) {
        let (temp_file, app) = setup_app();
        let year = app.term_api.create_academic_year("2025-2026").unwrap();
        let term = app
            .term_api
            .create_term(&year.year_id, "Học kỳ 1", "HK1-2025")
            .unwrap();
        (temp_file, app, term)
    }

    fn count_current_terms(db_path: &str) -> i64 {
        let conn = Connection::open(db_path).unwrap();
        conn.query_row("SELECT COUNT(*) FROM term WHERE is_current = 1", [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    // ==========================================
    // Current-term pointer
    // ==========================================

    #[test]
    fn test_set_current_term_unknown_fails() {
        let (_tmp, app) = setup_app();
        let err = app
            .term_api
            .set_current_term("missing-term", "admin")
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_set_current_term_moves_pointer_atomically() {
        let (_tmp, app, term_a) = setup_with_term();
        let term_b = app
            .term_api
            .create_term(&term_a.year_id, "Học kỳ 2", "HK2-2025")
            .unwrap();

        app.term_api.set_current_term(&term_a.term_id, "admin").unwrap();
        assert_eq!(
            app.term_api.current_term().unwrap().unwrap().term_id,
            term_a.term_id
        );

        app.term_api.set_current_term(&term_b.term_id, "admin").unwrap();
        assert_eq!(
            app.term_api.current_term().unwrap().unwrap().term_id,
            term_b.term_id
        );
        assert_eq!(count_current_terms(&app.db_path), 1);
    }

    #[test]
    fn test_set_current_term_idempotent() {
        let (_tmp, app, term) = setup_with_term();

        app.term_api.set_current_term(&term.term_id, "admin").unwrap();
        app.term_api.set_current_term(&term.term_id, "admin").unwrap();

        assert_eq!(
            app.term_api.current_term().unwrap().unwrap().term_id,
            term.term_id
        );
        assert_eq!(count_current_terms(&app.db_path), 1);

        // the no-op repeat leaves no extra action record
        let conn = Connection::open(&app.db_path).unwrap();
        let log_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM term_action_log WHERE action_type = 'SET_CURRENT_TERM'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(log_count, 1);
    }

    // ==========================================
    // Term dates
    // ==========================================

    #[test]
    fn test_set_term_dates_inverted_range_fails() {
        let (_tmp, app, term) = setup_with_term();
        let err = app
            .term_api
            .set_term_dates(&term.term_id, date(2026, 1, 31), date(2025, 9, 1), "admin")
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRange { .. }));
    }

    #[test]
    fn test_set_term_dates_unknown_term_fails() {
        let (_tmp, app) = setup_app();
        let err = app
            .term_api
            .set_term_dates("missing-term", date(2025, 9, 1), date(2026, 1, 31), "admin")
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_set_term_dates_does_not_revalidate_existing_phases() {
        let (_tmp, app, term) = setup_with_term();
        app.term_api
            .set_term_dates(&term.term_id, date(2025, 9, 1), date(2026, 1, 31), "admin")
            .unwrap();
        app.term_api
            .replace_phases(
                &term.term_id,
                &[PhaseSpec {
                    kind: PhaseKind::CourseRegistration,
                    start_ts: dt(2025, 12, 1, 8, 0),
                    end_ts: dt(2025, 12, 20, 17, 0),
                    is_enabled: true,
                }],
                "admin",
            )
            .unwrap();

        // shrinking the window succeeds; the stored phases stay as they are
        app.term_api
            .set_term_dates(&term.term_id, date(2025, 9, 1), date(2025, 11, 30), "admin")
            .unwrap();
        assert_eq!(app.term_api.list_phases(&term.term_id).unwrap().len(), 1);
    }

    // ==========================================
    // Phase batches
    // ==========================================

    #[test]
    fn test_replace_phases_writes_ordered_batch() {
        let (_tmp, app, term) = setup_with_term();
        app.term_api
            .set_term_dates(&term.term_id, date(2025, 9, 1), date(2026, 1, 31), "admin")
            .unwrap();

        let phases = app
            .term_api
            .replace_phases(
                &term.term_id,
                &[
                    PhaseSpec {
                        kind: PhaseKind::PreApproval,
                        start_ts: dt(2025, 9, 1, 8, 0),
                        end_ts: dt(2025, 9, 10, 17, 0),
                        is_enabled: true,
                    },
                    PhaseSpec {
                        kind: PhaseKind::CourseRegistration,
                        start_ts: dt(2025, 9, 15, 8, 0),
                        end_ts: dt(2025, 9, 25, 17, 0),
                        is_enabled: true,
                    },
                ],
                "admin",
            )
            .unwrap();
        assert_eq!(phases.len(), 2);

        let stored = app.term_api.list_phases(&term.term_id).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].kind, PhaseKind::PreApproval);
        assert_eq!(stored[0].seq_no, 0);
        assert_eq!(stored[1].kind, PhaseKind::CourseRegistration);
        assert_eq!(stored[1].seq_no, 1);
    }

    #[test]
    fn test_replace_phases_overlap_fails_and_keeps_stored_set() {
        let (_tmp, app, term) = setup_with_term();

        app.term_api
            .replace_phases(
                &term.term_id,
                &[PhaseSpec {
                    kind: PhaseKind::PreApproval,
                    start_ts: dt(2025, 9, 1, 8, 0),
                    end_ts: dt(2025, 9, 10, 17, 0),
                    is_enabled: true,
                }],
                "admin",
            )
            .unwrap();

        // two enabled windows sharing one overlapping minute
        let err = app
            .term_api
            .replace_phases(
                &term.term_id,
                &[
                    PhaseSpec {
                        kind: PhaseKind::EnrollmentIntent,
                        start_ts: dt(2025, 10, 1, 8, 0),
                        end_ts: dt(2025, 10, 10, 12, 0),
                        is_enabled: true,
                    },
                    PhaseSpec {
                        kind: PhaseKind::CourseRegistration,
                        start_ts: dt(2025, 10, 10, 12, 0),
                        end_ts: dt(2025, 10, 20, 17, 0),
                        is_enabled: true,
                    },
                ],
                "admin",
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPhaseWindow { .. }));

        // all-or-nothing: the previously stored set is unchanged
        let stored = app.term_api.list_phases(&term.term_id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, PhaseKind::PreApproval);
    }

    #[test]
    fn test_replace_phases_outside_term_bounds_fails() {
        let (_tmp, app, term) = setup_with_term();
        app.term_api
            .set_term_dates(&term.term_id, date(2025, 9, 1), date(2026, 1, 31), "admin")
            .unwrap();

        let err = app
            .term_api
            .replace_phases(
                &term.term_id,
                &[PhaseSpec {
                    kind: PhaseKind::SteadyState,
                    start_ts: dt(2026, 2, 1, 0, 0),
                    end_ts: dt(2026, 3, 1, 0, 0),
                    is_enabled: true,
                }],
                "admin",
            )
            .unwrap_err();
        match err {
            ApiError::InvalidPhaseWindow { kind, .. } => {
                assert_eq!(kind, "STEADY_STATE");
            }
            other => panic!("expected InvalidPhaseWindow, got {other:?}"),
        }
    }

    #[test]
    fn test_replace_phases_leaves_other_terms_untouched() {
        let (_tmp, app, term_a) = setup_with_term();
        let term_b = app
            .term_api
            .create_term(&term_a.year_id, "Học kỳ 2", "HK2-2025")
            .unwrap();

        let spec = [PhaseSpec {
            kind: PhaseKind::PreApproval,
            start_ts: dt(2025, 9, 1, 8, 0),
            end_ts: dt(2025, 9, 10, 17, 0),
            is_enabled: true,
        }];
        app.term_api.replace_phases(&term_a.term_id, &spec, "admin").unwrap();
        app.term_api.replace_phases(&term_b.term_id, &spec, "admin").unwrap();

        app.term_api.replace_phases(&term_a.term_id, &[], "admin").unwrap();
        assert!(app.term_api.list_phases(&term_a.term_id).unwrap().is_empty());
        assert_eq!(app.term_api.list_phases(&term_b.term_id).unwrap().len(), 1);
    }

    // ==========================================
    // Active-phase resolution
    // ==========================================

    fn seed_two_windows(app: &AppState, term: &Term) {
        app.term_api
            .replace_phases(
                &term.term_id,
                &[
                    PhaseSpec {
                        kind: PhaseKind::PreApproval,
                        start_ts: dt(2025, 9, 1, 8, 0),
                        end_ts: dt(2025, 9, 10, 17, 0),
                        is_enabled: true,
                    },
                    PhaseSpec {
                        kind: PhaseKind::CourseRegistration,
                        start_ts: dt(2025, 9, 15, 8, 0),
                        end_ts: dt(2025, 9, 25, 17, 0),
                        is_enabled: true,
                    },
                ],
                "admin",
            )
            .unwrap();
    }

    #[test]
    fn test_current_phase_gap_between_windows_is_none() {
        let (_tmp, app, term) = setup_with_term();
        seed_two_windows(&app, &term);

        let current = app
            .term_api
            .current_phase(&term.term_id, dt(2025, 9, 12, 12, 0))
            .unwrap();
        assert!(current.is_none());
    }

    #[test]
    fn test_current_phase_boundary_instants_inclusive() {
        let (_tmp, app, term) = setup_with_term();
        seed_two_windows(&app, &term);

        let at_start = app
            .term_api
            .current_phase(&term.term_id, dt(2025, 9, 15, 8, 0))
            .unwrap();
        assert_eq!(at_start.unwrap().kind, PhaseKind::CourseRegistration);

        let at_end = app
            .term_api
            .current_phase(&term.term_id, dt(2025, 9, 25, 17, 0))
            .unwrap();
        assert_eq!(at_end.unwrap().kind, PhaseKind::CourseRegistration);
    }

    #[test]
    fn test_current_phase_disabled_never_active() {
        let (_tmp, app, term) = setup_with_term();
        app.term_api
            .replace_phases(
                &term.term_id,
                &[PhaseSpec {
                    kind: PhaseKind::PreApproval,
                    start_ts: dt(2025, 9, 1, 8, 0),
                    end_ts: dt(2025, 9, 10, 17, 0),
                    is_enabled: false,
                }],
                "admin",
            )
            .unwrap();

        assert!(app
            .term_api
            .current_phase(&term.term_id, dt(2025, 9, 5, 12, 0))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_current_phase_unknown_term_fails() {
        let (_tmp, app) = setup_app();
        let err = app
            .term_api
            .current_phase("missing-term", dt(2025, 9, 5, 12, 0))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_overlap_after_date_change_earliest_start_wins() {
        // a later term-date change cannot invalidate stored phases, so an
        // overlap can exist at read time; the earliest start must win
        let (_tmp, app, term) = setup_with_term();
        app.term_api
            .replace_phases(
                &term.term_id,
                &[
                    PhaseSpec {
                        kind: PhaseKind::PreApproval,
                        start_ts: dt(2025, 9, 1, 8, 0),
                        end_ts: dt(2025, 9, 10, 17, 0),
                        is_enabled: true,
                    },
                    PhaseSpec {
                        kind: PhaseKind::EnrollmentIntent,
                        start_ts: dt(2025, 9, 10, 18, 0),
                        end_ts: dt(2025, 9, 20, 17, 0),
                        is_enabled: true,
                    },
                ],
                "admin",
            )
            .unwrap();

        // widen the first window directly in storage to force an overlap,
        // the way a drifted schedule would look after partial admin edits
        {
            let conn = Connection::open(&app.db_path).unwrap();
            conn.execute(
                "UPDATE phase SET end_ts = '2025-09-15 17:00:00' WHERE kind = 'PRE_APPROVAL'",
                [],
            )
            .unwrap();
        }

        let current = app
            .term_api
            .current_phase(&term.term_id, dt(2025, 9, 12, 12, 0))
            .unwrap();
        assert_eq!(current.unwrap().kind, PhaseKind::PreApproval);
    }

    #[test]
    fn test_is_action_permitted_composes_current_phase() {
        let (_tmp, app, term) = setup_with_term();
        seed_two_windows(&app, &term);

        assert!(app
            .term_api
            .is_action_permitted(&term.term_id, PhaseKind::PreApproval, dt(2025, 9, 5, 12, 0))
            .unwrap());
        assert!(!app
            .term_api
            .is_action_permitted(
                &term.term_id,
                PhaseKind::CourseRegistration,
                dt(2025, 9, 5, 12, 0)
            )
            .unwrap());
        assert!(!app
            .term_api
            .is_action_permitted(&term.term_id, PhaseKind::PreApproval, dt(2025, 9, 12, 12, 0))
            .unwrap());
    }
}
