//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. run_id as its hyphenated UUID string
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. canonical JSON of record (serde_json with no pretty-printing)

use sha2::{Digest, Sha256};

use tribunal_contracts::{
    error::{TribunalError, TribunalResult},
    run::{RunId, StepRecord},
};

use crate::event::AuditEvent;

/// Compute the SHA-256 hash for a single transcript event.
///
/// Commits to the event's position (`sequence`), its run (`run_id`), its
/// link to the previous event (`prev_hash`), and the full step record.
/// Returns a lowercase 64-character hex string.
pub fn hash_event(
    run_id: &RunId,
    sequence: u64,
    record: &StepRecord,
    prev_hash: &str,
) -> TribunalResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| TribunalError::AuditWriteFailed {
        reason: format!("step record is not serializable: {e}"),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(run_id.to_string().as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify the integrity of a hash chain.
///
/// Checks, for every event in order:
/// - `sequence` equals its position
/// - `prev_hash` equals the previous event's `this_hash` (genesis for the first)
/// - `this_hash` equals the recomputed hash of the event
///
/// An empty chain is trivially valid.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut expected_prev = AuditEvent::GENESIS_HASH;

    for (position, event) in events.iter().enumerate() {
        if event.sequence != position as u64 || event.prev_hash != expected_prev {
            return false;
        }
        match hash_event(&event.run_id, event.sequence, &event.record, &event.prev_hash) {
            Ok(hash) if hash == event.this_hash => {}
            _ => return false,
        }
        expected_prev = event.this_hash.as_str();
    }

    true
}
