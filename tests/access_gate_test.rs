// ==========================================
// Access gate tests
// ==========================================
// Responsibility: composed permit/deny decisions (phase gate, role gate,
// per-proposal transition gate) with structured deny reasons
// ==========================================


#[cfg(test)]
mod access_gate_test {
    use regportal_core::api::{ApiError, DenyReason, GateAction, GateDecision};
    use regportal_core::app::AppState;
    use regportal_core::domain::{PhaseSpec, Term};
    use regportal_core::{ActorRole, PhaseKind, ProposalState};
    use tempfile::NamedTempFile;

    use crate::test_helpers::{dt, seed_catalog, setup_app};

    // ==========================================
    // Helpers
    // ==========================================

    fn setup_with_phases() -> (NamedTempFile, AppState, Term) {
        let (temp_file, app) = setup_app();
        let year = app.term_api.create_academic_year("2025-2026").unwrap();
        let term = app
            .term_api
            .create_term(&year.year_id, "Học kỳ 1", "HK1-2025")
            .unwrap();
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
        (temp_file, app, term)
    }

    const IN_PRE_APPROVAL: (i32, u32, u32, u32, u32) = (2025, 9, 5, 12, 0);
    const IN_GAP: (i32, u32, u32, u32, u32) = (2025, 9, 12, 12, 0);
    const IN_REGISTRATION: (i32, u32, u32, u32, u32) = (2025, 9, 20, 12, 0);

    fn at(t: (i32, u32, u32, u32, u32)) -> chrono::NaiveDateTime {
        dt(t.0, t.1, t.2, t.3, t.4)
    }

    // ==========================================
    // Phase gate
    // ==========================================

    #[test]
    fn test_submit_permitted_during_pre_approval() {
        let (_tmp, app, term) = setup_with_phases();
        let decision = app
            .access_gate
            .decide(
                ActorRole::FacultyAssistant,
                GateAction::SubmitProposal,
                &term.term_id,
                None,
                at(IN_PRE_APPROVAL),
            )
            .unwrap();
        assert_eq!(decision, GateDecision::Permit);
    }

    #[test]
    fn test_submit_denied_in_gap_names_required_phase() {
        let (_tmp, app, term) = setup_with_phases();
        let decision = app
            .access_gate
            .decide(
                ActorRole::FacultyAssistant,
                GateAction::SubmitProposal,
                &term.term_id,
                None,
                at(IN_GAP),
            )
            .unwrap();
        match decision {
            GateDecision::Deny(DenyReason::WrongPhase { required, active }) => {
                assert_eq!(required, vec![PhaseKind::PreApproval]);
                assert_eq!(active, None);
            }
            other => panic!("expected WrongPhase deny, got {other:?}"),
        }
    }

    #[test]
    fn test_submit_denied_during_registration_window() {
        let (_tmp, app, term) = setup_with_phases();
        let decision = app
            .access_gate
            .decide(
                ActorRole::FacultyAssistant,
                GateAction::SubmitProposal,
                &term.term_id,
                None,
                at(IN_REGISTRATION),
            )
            .unwrap();
        match decision {
            GateDecision::Deny(DenyReason::WrongPhase { active, .. }) => {
                assert_eq!(active, Some(PhaseKind::CourseRegistration));
            }
            other => panic!("expected WrongPhase deny, got {other:?}"),
        }
    }

    #[test]
    fn test_register_course_permitted_during_registration() {
        let (_tmp, app, term) = setup_with_phases();
        let decision = app
            .access_gate
            .decide(
                ActorRole::Student,
                GateAction::RegisterCourse,
                &term.term_id,
                None,
                at(IN_REGISTRATION),
            )
            .unwrap();
        assert_eq!(decision, GateDecision::Permit);
    }

    // ==========================================
    // Role gate
    // ==========================================

    #[test]
    fn test_submit_denied_for_wrong_role() {
        let (_tmp, app, term) = setup_with_phases();
        let decision = app
            .access_gate
            .decide(
                ActorRole::Student,
                GateAction::SubmitProposal,
                &term.term_id,
                None,
                at(IN_PRE_APPROVAL),
            )
            .unwrap();
        assert_eq!(
            decision,
            GateDecision::Deny(DenyReason::WrongRole {
                role: "STUDENT".to_string()
            })
        );
    }

    #[test]
    fn test_decide_raw_denies_unknown_role_string() {
        let (_tmp, app, term) = setup_with_phases();
        let decision = app
            .access_gate
            .decide_raw(
                "SUPER_ADMIN",
                GateAction::SubmitProposal,
                &term.term_id,
                None,
                at(IN_PRE_APPROVAL),
            )
            .unwrap();
        assert_eq!(
            decision,
            GateDecision::Deny(DenyReason::WrongRole {
                role: "SUPER_ADMIN".to_string()
            })
        );
    }

    // ==========================================
    // Per-proposal transition gate
    // ==========================================

    #[test]
    fn test_review_composes_pipeline_state() {
        let (_tmp, app, term) = setup_with_phases();
        let (course_id, teacher_id) = seed_catalog(&app);
        let proposal = app
            .proposal_api
            .submit(&course_id, &teacher_id, "assistant-01")
            .unwrap();

        // the department head holds the PENDING gate
        let decision = app
            .access_gate
            .decide(
                ActorRole::DepartmentHead,
                GateAction::ReviewProposal,
                &term.term_id,
                Some(&proposal.proposal_id),
                at(IN_PRE_APPROVAL),
            )
            .unwrap();
        assert_eq!(decision, GateDecision::Permit);

        // the training office does not, yet
        let decision = app
            .access_gate
            .decide(
                ActorRole::TrainingOffice,
                GateAction::ReviewProposal,
                &term.term_id,
                Some(&proposal.proposal_id),
                at(IN_PRE_APPROVAL),
            )
            .unwrap();
        assert_eq!(
            decision,
            GateDecision::Deny(DenyReason::WrongRole {
                role: "TRAINING_OFFICE".to_string()
            })
        );
    }

    #[test]
    fn test_review_denied_on_terminal_proposal() {
        let (_tmp, app, term) = setup_with_phases();
        let (course_id, teacher_id) = seed_catalog(&app);
        let proposal = app
            .proposal_api
            .submit(&course_id, &teacher_id, "assistant-01")
            .unwrap();
        app.proposal_api
            .reject(&proposal.proposal_id, ActorRole::DepartmentHead, "duplicate")
            .unwrap();

        let decision = app
            .access_gate
            .decide(
                ActorRole::TrainingOffice,
                GateAction::ReviewProposal,
                &term.term_id,
                Some(&proposal.proposal_id),
                at(IN_PRE_APPROVAL),
            )
            .unwrap();
        assert_eq!(
            decision,
            GateDecision::Deny(DenyReason::InvalidTransition {
                state: ProposalState::Rejected
            })
        );
    }

    #[test]
    fn test_review_without_target_is_invalid_input() {
        let (_tmp, app, term) = setup_with_phases();
        let err = app
            .access_gate
            .decide(
                ActorRole::DepartmentHead,
                GateAction::ReviewProposal,
                &term.term_id,
                None,
                at(IN_PRE_APPROVAL),
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    // ==========================================
    // Errors and purity
    // ==========================================

    #[test]
    fn test_unknown_term_is_an_error_not_a_deny() {
        let (_tmp, app) = setup_app();
        let err = app
            .access_gate
            .decide(
                ActorRole::Student,
                GateAction::RegisterCourse,
                "missing-term",
                None,
                at(IN_REGISTRATION),
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_decide_never_mutates() {
        let (_tmp, app, term) = setup_with_phases();
        let (course_id, teacher_id) = seed_catalog(&app);
        let proposal = app
            .proposal_api
            .submit(&course_id, &teacher_id, "assistant-01")
            .unwrap();

        for _ in 0..3 {
            let _ = app
                .access_gate
                .decide(
                    ActorRole::DepartmentHead,
                    GateAction::ReviewProposal,
                    &term.term_id,
                    Some(&proposal.proposal_id),
                    at(IN_PRE_APPROVAL),
                )
                .unwrap();
        }

        assert_eq!(
            app.proposal_api.state_of(&proposal.proposal_id).unwrap(),
            ProposalState::Pending
        );
        assert_eq!(app.term_api.list_phases(&term.term_id).unwrap().len(), 2);
        assert_eq!(app.proposal_api.history(&proposal.proposal_id).unwrap().len(), 1);
    }
}
