//! Error types for the tribunal pipeline.
//!
//! Only `EmptyClaim`, `RunInProgress`, and `Config` ever reach a caller of
//! the session. Parse, transport, timeout, and evaluator errors are converted
//! into a Failed step by the sequencer; `Superseded` only travels between the
//! session and a run it has replaced.

use thiserror::Error;

/// The unified error type for the tribunal crates.
#[derive(Debug, Error)]
pub enum TribunalError {
    /// The submitted claim was empty or whitespace.
    #[error("claim must not be empty")]
    EmptyClaim,

    /// The same claim is already being reviewed.
    #[error("a run for claim '{claim}' is already in progress")]
    RunInProgress { claim: String },

    /// The oracle replied with a payload that could not be decoded.
    #[error("malformed oracle payload: {reason}")]
    Parse { reason: String },

    /// The oracle could not be reached or returned a non-success status.
    #[error("oracle transport failure: {reason}")]
    Transport { reason: String },

    /// An evaluator did not answer within its ceiling.
    #[error("step '{step}' timed out after {after_ms} ms")]
    Timeout { step: String, after_ms: u64 },

    /// An evaluator returned an error or panicked instead of an outcome.
    #[error("evaluator for step '{step}' faulted: {reason}")]
    EvaluatorFault { step: String, reason: String },

    /// The run was replaced by a newer one; its writes are discarded.
    #[error("run superseded by generation {generation}")]
    Superseded { generation: u64 },

    /// The transcript writer could not record a step.
    ///
    /// A step that cannot be recorded is treated as failed.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the tribunal crates.
pub type TribunalResult<T> = Result<T, TribunalError>;
