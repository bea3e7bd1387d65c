//! Transcript event and log types.
//!
//! `AuditEvent` is a single entry in the hash chain. It wraps a `StepRecord`
//! with a sequence number and the SHA-256 hashes that make tampering
//! detectable. `AuditLog` is the exported transcript of one run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tribunal_contracts::{
    run::{RunId, StepRecord},
    verdict::Verdict,
};

/// A single entry in the SHA-256 hash chain of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    pub run_id: RunId,

    /// The settled step this event records.
    pub record: StepRecord,

    /// Hash of the previous event, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// Hash of this event's canonical content (see `chain::hash_event`).
    pub this_hash: String,
}

impl AuditEvent {
    /// The sentinel `prev_hash` used for the first event in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// The transcript of one run, as exported by the writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub run_id: RunId,

    /// All events in chain order (sequence 0 first).
    pub events: Vec<AuditEvent>,

    /// The verdict the run was sealed with; `None` if it never concluded.
    pub verdict: Option<Verdict>,

    /// When the run was sealed.
    pub sealed_at: Option<DateTime<Utc>>,

    /// The `this_hash` of the last event. Empty string if the log is empty.
    pub terminal_hash: String,
}
