//! # tribunal-audit
//!
//! Append-only, SHA-256 hash-chained transcripts of tribunal runs.
//!
//! ## Overview
//!
//! The sequencer records every settled step of a run. Each record is wrapped
//! in an `AuditEvent` that links to the previous event via its SHA-256 hash,
//! so editing any recorded step after the fact breaks the chain and is
//! detected by `verify_chain`. Transcripts live in memory only.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tribunal_audit::InMemoryAuditWriter;
//!
//! let audit = InMemoryAuditWriter::new(run_id);
//! let report = sequencer.run(run_id, &claim, &observer, &audit).await?;
//! assert!(audit.verify_integrity());
//! let log = audit.export_log();
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryAuditWriter;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use tribunal_contracts::{
        error::TribunalError,
        run::{RunId, StepRecord},
        step::{StepId, StepStatus},
        verdict::Verdict,
    };
    use tribunal_core::traits::AuditWriter;

    use super::{AuditEvent, InMemoryAuditWriter};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn make_record(run_id: RunId, index: usize, status: StepStatus) -> StepRecord {
        StepRecord {
            run_id,
            index,
            step_id: StepId::new(format!("step-{index}")),
            label: format!("Step {index}"),
            status,
            reason: (status == StepStatus::Failed).then(|| "Unsubstantiated health claim".to_string()),
            timestamp: Utc::now(),
        }
    }

    fn halted_run(writer: &InMemoryAuditWriter) {
        let run_id = writer.run_id();
        writer.write(&make_record(run_id, 0, StepStatus::Completed)).unwrap();
        writer.write(&make_record(run_id, 1, StepStatus::Failed)).unwrap();
        writer.write(&make_record(run_id, 2, StepStatus::Skipped)).unwrap();
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_hash_chain_integrity() {
        let writer = InMemoryAuditWriter::new(RunId::new());
        halted_run(&writer);
        assert!(writer.verify_integrity(), "chain must be valid after sequential writes");
    }

    /// Rewriting a Failed step as Completed after the fact breaks the chain.
    #[test]
    fn test_tamper_detection() {
        let writer = InMemoryAuditWriter::new(RunId::new());
        halted_run(&writer);

        {
            let mut state = writer.state.lock().unwrap();
            state.events[1].record.status = StepStatus::Completed;
            state.events[1].record.reason = None;
        }

        assert!(
            !writer.verify_integrity(),
            "chain must detect a rewritten step status"
        );
    }

    #[test]
    fn test_genesis_hash_and_sequence() {
        let writer = InMemoryAuditWriter::new(RunId::new());
        halted_run(&writer);

        let log = writer.export_log();
        assert_eq!(log.events[0].prev_hash, AuditEvent::GENESIS_HASH);
        for (idx, event) in log.events.iter().enumerate() {
            assert_eq!(event.sequence, idx as u64);
        }
    }

    #[test]
    fn test_export_log_after_seal() {
        let writer = InMemoryAuditWriter::new(RunId::new());
        halted_run(&writer);
        writer.finalize(&writer.run_id(), Verdict::Halt).unwrap();

        let log = writer.export_log();
        assert_eq!(log.run_id, writer.run_id());
        assert_eq!(log.events.len(), 3);
        assert_eq!(log.verdict, Some(Verdict::Halt));
        assert!(log.sealed_at.is_some());
        assert_eq!(log.terminal_hash, log.events.last().unwrap().this_hash);
        assert!(super::verify_chain(&log.events));
    }

    #[test]
    fn test_sealed_transcript_refuses_writes() {
        let writer = InMemoryAuditWriter::new(RunId::new());
        writer.finalize(&writer.run_id(), Verdict::Proceed).unwrap();

        let result = writer.write(&make_record(writer.run_id(), 0, StepStatus::Completed));
        assert!(matches!(result, Err(TribunalError::AuditWriteFailed { .. })));

        let again = writer.finalize(&writer.run_id(), Verdict::Halt);
        assert!(again.is_err(), "a transcript is sealed exactly once");
        assert_eq!(writer.export_log().verdict, Some(Verdict::Proceed));
    }

    #[test]
    fn test_foreign_run_records_are_refused() {
        let writer = InMemoryAuditWriter::new(RunId::new());
        let other = RunId::new();

        let result = writer.write(&make_record(other, 0, StepStatus::Completed));
        match result {
            Err(TribunalError::AuditWriteFailed { reason }) => {
                assert!(reason.contains(&other.to_string()));
            }
            other => panic!("expected AuditWriteFailed, got {:?}", other),
        }
        assert!(writer.finalize(&other, Verdict::Proceed).is_err());
        assert!(writer.export_log().events.is_empty());
    }

    #[test]
    fn test_verify_empty() {
        let writer = InMemoryAuditWriter::new(RunId::new());
        assert!(writer.verify_integrity());
        assert!(super::verify_chain(&[]));
        assert_eq!(writer.export_log().terminal_hash, "");
    }
}
