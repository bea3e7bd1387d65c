//! # tribunal-witness
//!
//! The adversarial witness step and its fail-closed verdict parser.
//!
//! - [`VerdictParser`] decodes an oracle reply into PASS or FAIL. Anything
//!   that is not unambiguously PASS is FAIL.
//! - [`AdversarialWitness`] implements
//!   [`Evaluator`](tribunal_core::traits::Evaluator): one chat-completion
//!   request per claim, transport failures settled as Failed.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use tribunal_witness::AdversarialWitness;
//!
//! let witness = AdversarialWitness::new(config.oracle.clone())?;
//! let outcome = witness.judge(&claim).await;
//! ```

pub mod parser;
pub mod prompt;
pub mod wire;
pub mod witness;

pub use parser::{ParsedVerdict, VerdictParser, WitnessVerdict, DEFAULT_FAIL_REASON, INVALID_JSON_REASON};
pub use witness::{AdversarialWitness, ORACLE_TIMEOUT_REASON};
