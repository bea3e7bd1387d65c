//! Core trait definitions for the tribunal pipeline.
//!
//! These three traits define the seams around the sequencer:
//!
//! - `Evaluator`: the check behind one step (may call a remote oracle)
//! - `RunObserver`: the owner of the shared read model; rejects stale runs
//! - `AuditWriter`: the transcript sink; records every settled step
//!
//! The sequencer treats every evaluator as untrusted: errors, panics, and
//! slow answers all become a Failed step.

use async_trait::async_trait;

use tribunal_contracts::{
    claim::Claim,
    error::TribunalResult,
    run::{RunId, StepRecord},
    step::{Outcome, StepStatus},
    verdict::Verdict,
};

/// The check that decides one step of the pipeline.
///
/// Every invocation is a suspension point for the sequencer, whether the
/// implementation is a fixed placeholder or a network round trip.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Judge `claim` and report an outcome for this step.
    ///
    /// Returning `Err` is allowed but discouraged: the sequencer converts it
    /// into `Outcome::Failed` with the error's message. Implementations that
    /// talk to external systems should map their own failures to
    /// `Outcome::Failed` with a precise reason instead.
    async fn evaluate(&self, claim: &Claim) -> TribunalResult<Outcome>;
}

/// A state change the sequencer publishes while a run progresses.
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// The evaluator for step `index` is about to be invoked.
    Started { index: usize },

    /// Step `index` reached a terminal status.
    Settled {
        index: usize,
        status: StepStatus,
        /// Present only when `status` is Failed.
        reason: Option<String>,
    },

    /// Every step is terminal; this is the run's single verdict.
    Concluded {
        verdict: Verdict,
        failure_reason: Option<String>,
    },
}

/// The owner of the shared step-state structure a run writes into.
///
/// `apply` must commit the event atomically. If the run that produced the
/// event has been replaced, it must discard the event and return
/// `TribunalError::Superseded`; the sequencer then stops without invoking
/// any further evaluator.
pub trait RunObserver: Send + Sync {
    fn apply(&self, event: &StepEvent) -> TribunalResult<()>;
}

/// The transcript sink for one run.
///
/// Every settled step produces exactly one `StepRecord`, in pipeline order.
/// A failed write of a Completed step fails that step.
pub trait AuditWriter: Send + Sync {
    /// Append one step record. Implementations must be append-only.
    fn write(&self, record: &StepRecord) -> TribunalResult<()>;

    /// Seal the transcript of `run_id` with its verdict.
    fn finalize(&self, run_id: &RunId, verdict: Verdict) -> TribunalResult<()>;
}
