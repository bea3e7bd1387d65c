//! Fixed-outcome evaluators for steps without a real check.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use tribunal_contracts::{claim::Claim, error::TribunalResult, step::Outcome};

use crate::traits::Evaluator;

/// A no-op step that always completes after a nominal delay.
///
/// Stands in for checks whose pass/fail criteria are not defined yet. Any
/// placeholder can be swapped for a real `Evaluator` without touching the
/// sequencer.
#[derive(Debug, Clone)]
pub struct PlaceholderEvaluator {
    delay: Duration,
}

impl PlaceholderEvaluator {
    pub fn completing_after(delay: Duration) -> Self {
        Self { delay }
    }

    /// A placeholder that answers without delay. Mostly useful in tests.
    pub fn immediate() -> Self {
        Self::completing_after(Duration::ZERO)
    }
}

#[async_trait]
impl Evaluator for PlaceholderEvaluator {
    async fn evaluate(&self, claim: &Claim) -> TribunalResult<Outcome> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        debug!(
            claim_len = claim.as_str().len(),
            delay_ms = self.delay.as_millis() as u64,
            "placeholder step completed"
        );
        Ok(Outcome::Completed)
    }
}
