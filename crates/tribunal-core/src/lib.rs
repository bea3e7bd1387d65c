//! # tribunal-core
//!
//! The fail-closed step sequencer for the tribunal pipeline.
//!
//! This crate provides:
//! - The three core traits (`Evaluator`, `RunObserver`, `AuditWriter`)
//! - The `StepSequencer` that runs evaluators strictly in order and halts on
//!   the first failure
//! - `PlaceholderEvaluator`, a fixed-outcome step for checks that do not yet
//!   have a real implementation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tribunal_core::{StepSequencer, PlaceholderEvaluator};
//!
//! let sequencer = StepSequencer::builder()
//!     .step("claim-intake", "Claim Intake", Arc::new(PlaceholderEvaluator::completing_after(delay)))
//!     .step("adversarial-witness", "Adversarial Witness", witness)
//!     .build()?;
//! let report = sequencer.run(RunId::new(), &claim, &observer, &audit).await?;
//! ```

pub mod placeholder;
pub mod sequencer;
pub mod traits;

pub use placeholder::PlaceholderEvaluator;
pub use sequencer::{RunReport, StepSequencer, StepSequencerBuilder};
