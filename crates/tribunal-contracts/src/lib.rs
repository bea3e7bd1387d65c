//! # tribunal-contracts
//!
//! Shared types, read models, and error contracts for the tribunal
//! claim-verification pipeline.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate beyond verdict derivation, which is a pure function of step
//! statuses.

pub mod claim;
pub mod error;
pub mod run;
pub mod step;
pub mod verdict;

#[cfg(test)]
mod tests {
    use super::*;
    use claim::Claim;
    use error::TribunalError;
    use run::{RunId, SessionSnapshot};
    use step::{Outcome, StepId, StepStatus, StepView};
    use verdict::Verdict;

    use StepStatus::{Completed, Failed, Pending, Running, Skipped};

    // ── Claim ────────────────────────────────────────────────────────────────

    #[test]
    fn claim_rejects_empty_and_blank_text() {
        assert!(matches!(Claim::new(""), Err(TribunalError::EmptyClaim)));
        assert!(matches!(Claim::new("   \n\t"), Err(TribunalError::EmptyClaim)));
    }

    #[test]
    fn claim_keeps_text_as_submitted() {
        let claim = Claim::new("  The sky is blue. ").unwrap();
        assert_eq!(claim.as_str(), "  The sky is blue. ");
        assert_eq!(claim.to_string(), "  The sky is blue. ");
    }

    #[test]
    fn claim_deserialization_enforces_validation() {
        let ok: Claim = serde_json::from_str("\"The sky is blue.\"").unwrap();
        assert_eq!(ok.as_str(), "The sky is blue.");

        let blank: Result<Claim, _> = serde_json::from_str("\"  \"");
        assert!(blank.is_err(), "a blank claim must not deserialize");
    }

    // ── Verdict derivation ───────────────────────────────────────────────────

    #[test]
    fn verdict_is_proceed_when_every_step_completed() {
        assert_eq!(
            Verdict::derive(&[Completed, Completed, Completed, Completed, Completed]),
            Some(Verdict::Proceed)
        );
    }

    #[test]
    fn verdict_is_halt_when_one_step_failed() {
        assert_eq!(
            Verdict::derive(&[Completed, Completed, Failed, Skipped, Skipped]),
            Some(Verdict::Halt)
        );
        assert_eq!(Verdict::derive(&[Failed]), Some(Verdict::Halt));
    }

    #[test]
    fn verdict_is_absent_while_any_step_is_unsettled() {
        assert_eq!(Verdict::derive(&[Completed, Running, Pending]), None);
        assert_eq!(Verdict::derive(&[Completed, Pending]), None);
        // A failure does not publish a verdict until the rest are settled.
        assert_eq!(Verdict::derive(&[Failed, Pending]), None);
    }

    #[test]
    fn verdict_is_halt_for_skips_without_a_failure() {
        // Inconsistent input resolves to the unsafe outcome.
        assert_eq!(Verdict::derive(&[Completed, Skipped]), Some(Verdict::Halt));
    }

    #[test]
    fn verdict_for_zero_steps_is_vacuously_proceed() {
        assert_eq!(Verdict::derive(&[]), Some(Verdict::Proceed));
    }

    #[test]
    fn verdict_serializes_in_upper_case() {
        assert_eq!(serde_json::to_string(&Verdict::Proceed).unwrap(), "\"PROCEED\"");
        assert_eq!(serde_json::to_string(&Verdict::Halt).unwrap(), "\"HALT\"");
        assert_eq!(Verdict::Halt.to_string(), "HALT");
    }

    // ── Step types ───────────────────────────────────────────────────────────

    #[test]
    fn only_settled_statuses_are_terminal() {
        assert!(!Pending.is_terminal());
        assert!(!Running.is_terminal());
        assert!(Completed.is_terminal());
        assert!(Failed.is_terminal());
        assert!(Skipped.is_terminal());
    }

    #[test]
    fn outcome_failed_helper_carries_reason() {
        assert_eq!(
            Outcome::failed("Unsubstantiated health claim"),
            Outcome::Failed {
                reason: Some("Unsubstantiated health claim".to_string())
            }
        );
        assert!(Outcome::Completed.is_completed());
        assert!(!Outcome::Failed { reason: None }.is_completed());
    }

    // ── SessionSnapshot ──────────────────────────────────────────────────────

    #[test]
    fn idle_snapshot_is_not_running() {
        let snapshot = SessionSnapshot::idle(vec![StepView::pending(
            StepId::new("claim-intake"),
            "Claim Intake",
        )]);
        assert!(!snapshot.is_running());
        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.statuses(), vec![Pending]);
        assert_eq!(snapshot.step("claim-intake").unwrap().label, "Claim Intake");
        assert!(snapshot.step("missing").is_none());
    }

    #[test]
    fn snapshot_with_run_and_no_verdict_is_running() {
        let mut snapshot = SessionSnapshot::idle(vec![]);
        snapshot.run_id = Some(RunId::new());
        assert!(snapshot.is_running());

        snapshot.verdict = Some(Verdict::Proceed);
        assert!(!snapshot.is_running());
    }

    #[test]
    fn run_id_new_produces_unique_values() {
        let ids: std::collections::HashSet<String> =
            (0..100).map(|_| RunId::new().to_string()).collect();
        assert_eq!(ids.len(), 100);
    }

    // ── TribunalError display messages ───────────────────────────────────────

    #[test]
    fn error_messages_carry_context() {
        let err = TribunalError::Timeout {
            step: "adversarial-witness".to_string(),
            after_ms: 30_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("adversarial-witness"));
        assert!(msg.contains("30000"));

        let err = TribunalError::EvaluatorFault {
            step: "consistency-scan".to_string(),
            reason: "panicked".to_string(),
        };
        assert!(err.to_string().contains("consistency-scan"));
        assert!(err.to_string().contains("panicked"));

        let err = TribunalError::RunInProgress {
            claim: "The sky is blue.".to_string(),
        };
        assert!(err.to_string().contains("already in progress"));

        assert_eq!(TribunalError::EmptyClaim.to_string(), "claim must not be empty");
    }
}
