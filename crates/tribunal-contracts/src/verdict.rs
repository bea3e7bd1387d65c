//! The run verdict and how it is derived from step statuses.
//!
//! The derivation is fail-closed: a single Failed step yields `Halt`, and no
//! verdict exists at all while any step is still Pending or Running.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::step::StepStatus;

/// Failure reason recorded when a failing evaluator did not supply one.
pub const GENERIC_FAILURE_REASON: &str =
    "Verification step failed closed; the claim cannot proceed.";

/// The terminal output of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Every step reached Completed.
    Proceed,
    /// At least one step reached Failed.
    Halt,
}

impl Verdict {
    /// Derive the verdict from the per-step statuses of a run.
    ///
    /// Returns `None` while any step is Pending or Running. Otherwise returns
    /// `Proceed` only if every step Completed, and `Halt` for anything else,
    /// including a Skipped step with no recorded failure. An empty slice is
    /// vacuously `Proceed`.
    pub fn derive(statuses: &[StepStatus]) -> Option<Self> {
        if statuses.iter().any(|s| !s.is_terminal()) {
            return None;
        }
        if statuses.iter().all(|s| *s == StepStatus::Completed) {
            Some(Self::Proceed)
        } else {
            Some(Self::Halt)
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proceed => "PROCEED",
            Self::Halt => "HALT",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
