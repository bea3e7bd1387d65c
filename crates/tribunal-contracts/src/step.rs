//! Step identity, per-step status, and evaluator outcomes.
//!
//! A step moves monotonically through its statuses within one run:
//!
//! ```text
//! Pending ──► Running ──► Completed
//!    │            └─────► Failed
//!    └──────────────────► Skipped   (only after an earlier step Failed)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a step within a pipeline.
///
/// Unique within a session. Ordering comes from the step's position in the
/// pipeline, not from the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Observable status of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not yet started in the current run.
    Pending,
    /// The evaluator has been invoked and has not answered yet.
    ///
    /// Presentation-only substate of Pending: it never counts as terminal.
    Running,
    /// The evaluator answered `Outcome::Completed`.
    Completed,
    /// The evaluator answered `Outcome::Failed`, faulted, or timed out.
    Failed,
    /// An earlier step failed; this step's evaluator was never invoked.
    Skipped,
}

impl StepStatus {
    /// True once the step can no longer change within the current run.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    /// Upper-case label used by the CLI printout.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        }
    }
}

/// What an evaluator reports for the step it backs.
///
/// Only a step that actually runs produces an outcome. A Failed outcome may
/// omit its reason; the sequencer then substitutes
/// [`GENERIC_FAILURE_REASON`](crate::verdict::GENERIC_FAILURE_REASON).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    Failed { reason: Option<String> },
}

impl Outcome {
    /// A Failed outcome carrying `reason`.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: Some(reason.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Read-model row for one step: identity, display label, and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepView {
    pub id: StepId,
    pub label: String,
    pub status: StepStatus,
}

impl StepView {
    /// A fresh row in the Pending state.
    pub fn pending(id: StepId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            status: StepStatus::Pending,
        }
    }
}
