//! # tribunal-session
//!
//! Runs the tribunal pipeline over one claim at a time and publishes the
//! progress as a consistent read model.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tribunal_session::TribunalSession;
//!
//! let session = TribunalSession::from_config(&config)?;
//! session.start("The sky is blue.")?;
//! let snapshot = session.wait_for_verdict().await;
//! println!("{:?}", snapshot.verdict);
//! ```

pub mod pipeline;
pub mod session;

pub use session::TribunalSession;
