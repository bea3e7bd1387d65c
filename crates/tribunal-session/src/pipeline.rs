//! The standard five-step tribunal pipeline.
//!
//! | # | id                    | evaluator                          |
//! |---|-----------------------|------------------------------------|
//! | 1 | `claim-intake`        | placeholder, completes after delay |
//! | 2 | `evidence-alignment`  | placeholder, no check defined yet  |
//! | 3 | `adversarial-witness` | `AdversarialWitness`               |
//! | 4 | `consistency-scan`    | placeholder, no check defined yet  |
//! | 5 | `tribunal-seal`       | placeholder, completes after delay |
//!
//! Hosts that need a different pipeline compose one with
//! `StepSequencer::builder()` directly.

use std::sync::Arc;

use tribunal_config::TribunalConfig;
use tribunal_contracts::error::TribunalResult;
use tribunal_core::{traits::Evaluator, PlaceholderEvaluator, StepSequencer};
use tribunal_witness::AdversarialWitness;

pub const CLAIM_INTAKE: &str = "claim-intake";
pub const EVIDENCE_ALIGNMENT: &str = "evidence-alignment";
pub const ADVERSARIAL_WITNESS: &str = "adversarial-witness";
pub const CONSISTENCY_SCAN: &str = "consistency-scan";
pub const TRIBUNAL_SEAL: &str = "tribunal-seal";

/// Build the standard pipeline from resolved configuration.
///
/// Returns `TribunalError::Config` if the witness HTTP client cannot be built.
pub fn standard(config: &TribunalConfig) -> TribunalResult<StepSequencer> {
    let witness: Arc<dyn Evaluator> = Arc::new(AdversarialWitness::new(config.oracle.clone())?);
    with_witness(config, witness)
}

/// The standard pipeline with `witness` in the adversarial-witness slot.
pub fn with_witness(
    config: &TribunalConfig,
    witness: Arc<dyn Evaluator>,
) -> TribunalResult<StepSequencer> {
    let placeholder: Arc<dyn Evaluator> = Arc::new(PlaceholderEvaluator::completing_after(
        config.pipeline.placeholder_delay,
    ));

    StepSequencer::builder()
        .step_timeout(config.pipeline.step_timeout)
        .step(CLAIM_INTAKE, "Claim Intake", Arc::clone(&placeholder))
        // No-op: pass/fail criteria for evidence alignment are not defined.
        .step(EVIDENCE_ALIGNMENT, "Evidence Alignment", Arc::clone(&placeholder))
        .step(ADVERSARIAL_WITNESS, "Adversarial Witness", witness)
        // No-op: pass/fail criteria for the consistency scan are not defined.
        .step(CONSISTENCY_SCAN, "Consistency Scan", Arc::clone(&placeholder))
        .step(TRIBUNAL_SEAL, "Tribunal Seal", placeholder)
        .build()
}
