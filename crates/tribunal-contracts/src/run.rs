//! Run identity, transcript records, and the session read model.
//!
//! `StepRecord` is what the sequencer hands to the audit writer, one per
//! settled step. `SessionSnapshot` is what the presentation layer reads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    claim::Claim,
    step::{StepId, StepStatus, StepView},
    verdict::Verdict,
};

/// Unique identifier for one run of the pipeline over one claim.
///
/// Appears in every transcript record and log line of that run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// An immutable record of one settled step, written to the run transcript.
///
/// Every step of a run that reaches Completed, Failed, or Skipped produces
/// exactly one record, in pipeline order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub run_id: RunId,
    /// Zero-based position of the step in the pipeline.
    pub index: usize,
    pub step_id: StepId,
    pub label: String,
    /// Always terminal.
    pub status: StepStatus,
    /// Present only for a Failed step.
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A consistent view of the session for presentation.
///
/// Produced atomically by the session: a reader never observes a verdict
/// while a step is still Pending or Running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Incremented every time a run starts. Zero before the first run.
    pub generation: u64,
    pub run_id: Option<RunId>,
    pub claim: Option<Claim>,
    pub steps: Vec<StepView>,
    /// `None` while the run is in flight or before any run.
    pub verdict: Option<Verdict>,
    /// The reason of the one step that failed, if any.
    pub failure_reason: Option<String>,
}

impl SessionSnapshot {
    /// The idle read model: every step Pending, no claim, no verdict.
    pub fn idle(steps: Vec<StepView>) -> Self {
        Self {
            generation: 0,
            run_id: None,
            claim: None,
            steps,
            verdict: None,
            failure_reason: None,
        }
    }

    /// True while a run has started and not yet published its verdict.
    pub fn is_running(&self) -> bool {
        self.run_id.is_some() && self.verdict.is_none()
    }

    /// Look up a step row by identifier.
    pub fn step(&self, id: &str) -> Option<&StepView> {
        self.steps.iter().find(|s| s.id.0 == id)
    }

    /// Statuses in pipeline order.
    pub fn statuses(&self) -> Vec<StepStatus> {
        self.steps.iter().map(|s| s.status).collect()
    }
}
