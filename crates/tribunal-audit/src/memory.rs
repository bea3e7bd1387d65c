//! In-memory implementation of `AuditWriter`.
//!
//! `InMemoryAuditWriter` keeps the transcript of exactly one run in a `Vec`
//! behind a `Mutex`. Nothing is persisted; use `export_log()` once the run
//! concludes and `verify_integrity()` at any time.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::info;

use tribunal_contracts::{
    error::{TribunalError, TribunalResult},
    run::{RunId, StepRecord},
    verdict::Verdict,
};
use tribunal_core::traits::AuditWriter;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AuditEvent, AuditLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct InMemoryState {
    pub(crate) events: Vec<AuditEvent>,
    /// The next sequence number to assign.
    pub(crate) sequence: u64,
    /// `this_hash` of the last event, or `GENESIS_HASH` before the first.
    pub(crate) last_hash: String,
    pub(crate) verdict: Option<Verdict>,
    pub(crate) sealed_at: Option<chrono::DateTime<Utc>>,
}

// ── Public writer ─────────────────────────────────────────────────────────────

/// An in-memory, append-only transcript writer backed by a SHA-256 hash chain.
///
/// One writer per run: records carrying another `run_id` are refused, and
/// nothing can be appended after `finalize`.
pub struct InMemoryAuditWriter {
    run_id: RunId,
    pub(crate) state: Mutex<InMemoryState>,
}

impl InMemoryAuditWriter {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            state: Mutex::new(InMemoryState {
                events: Vec::new(),
                sequence: 0,
                last_hash: AuditEvent::GENESIS_HASH.to_string(),
                verdict: None,
                sealed_at: None,
            }),
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Export the transcript written so far.
    pub fn export_log(&self) -> AuditLog {
        let state = self.lock_state();
        AuditLog {
            run_id: self.run_id,
            events: state.events.clone(),
            verdict: state.verdict,
            sealed_at: state.sealed_at,
            terminal_hash: state
                .events
                .last()
                .map(|e| e.this_hash.clone())
                .unwrap_or_default(),
        }
    }

    /// Verify that the in-memory chain has not been tampered with.
    pub fn verify_integrity(&self) -> bool {
        verify_chain(&self.lock_state().events)
    }

    /// The transcript is plain data, so a poisoned lock is still readable.
    fn lock_state(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── AuditWriter impl ──────────────────────────────────────────────────────────

impl AuditWriter for InMemoryAuditWriter {
    /// Append one step record to the hash chain.
    ///
    /// Returns `AuditWriteFailed` if the record belongs to another run or the
    /// transcript has already been sealed.
    fn write(&self, record: &StepRecord) -> TribunalResult<()> {
        if record.run_id != self.run_id {
            return Err(TribunalError::AuditWriteFailed {
                reason: format!(
                    "record for run {} offered to transcript of run {}",
                    record.run_id, self.run_id
                ),
            });
        }

        let mut state = self.lock_state();
        if state.verdict.is_some() {
            return Err(TribunalError::AuditWriteFailed {
                reason: format!("transcript of run {} is already sealed", self.run_id),
            });
        }

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_event(&self.run_id, sequence, record, &prev_hash)?;

        state.events.push(AuditEvent {
            sequence,
            run_id: self.run_id,
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        Ok(())
    }

    /// Seal the transcript with the run's verdict.
    fn finalize(&self, run_id: &RunId, verdict: Verdict) -> TribunalResult<()> {
        if *run_id != self.run_id {
            return Err(TribunalError::AuditWriteFailed {
                reason: format!("cannot seal run {} with transcript of run {}", run_id, self.run_id),
            });
        }

        let mut state = self.lock_state();
        if state.verdict.is_some() {
            return Err(TribunalError::AuditWriteFailed {
                reason: format!("transcript of run {} is already sealed", self.run_id),
            });
        }
        state.verdict = Some(verdict);
        state.sealed_at = Some(Utc::now());

        info!(
            run_id = %run_id,
            event_count = state.events.len(),
            terminal_hash = %state.last_hash,
            verdict = %verdict,
            "run transcript sealed"
        );

        Ok(())
    }
}
