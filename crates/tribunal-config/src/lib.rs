//! # tribunal-config
//!
//! TOML and environment configuration for the tribunal host process.
//!
//! ## Overview
//!
//! [`TribunalConfig`] names the judging oracle (endpoint, model, optional
//! bearer token, timeout) and paces the step sequencer (placeholder delay,
//! per-step timeout). The file is optional; every field can be set through a
//! `TRIBUNAL_*` environment variable, which wins over the file.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use tribunal_config::TribunalConfig;
//!
//! let config = TribunalConfig::load(Some(Path::new("tribunal.toml")))?;
//! ```

pub mod config;
pub mod section;

pub use config::{OracleConfig, PipelineConfig, TribunalConfig};
pub use section::{ConfigFile, OracleSection, PipelineSection};

// ── Tests ─────────────────────────────────────────────────────────────────────
