//! On-disk configuration schema.
//!
//! These are the raw TOML sections before validation. Every field is
//! optional so that environment variables can fill in or override anything
//! the file leaves out.
//!
//! Example:
//! ```toml
//! [oracle]
//! endpoint = "http://127.0.0.1:8080/v1/chat/completions"
//! model = "judge-model"
//! timeout_secs = 30
//!
//! [pipeline]
//! placeholder_delay_ms = 400
//! step_timeout_secs = 60
//! ```

use serde::{Deserialize, Serialize};

/// The `[oracle]` table: where and how to reach the judging oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleSection {
    /// Absolute `http`/`https` URL of the chat-completion endpoint.
    pub endpoint: Option<String>,

    /// Model identifier sent with every request.
    pub model: Option<String>,

    /// Optional bearer token. Prefer the environment over the file.
    pub api_key: Option<String>,

    /// Ceiling for one oracle exchange, in seconds.
    pub timeout_secs: Option<u64>,
}

/// The `[pipeline]` table: pacing of the step sequencer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineSection {
    /// Nominal delay of the placeholder steps, in milliseconds.
    pub placeholder_delay_ms: Option<u64>,

    /// Ceiling for any single evaluator, in seconds.
    pub step_timeout_secs: Option<u64>,
}

/// The top-level structure deserialized from a TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub oracle: OracleSection,
    #[serde(default)]
    pub pipeline: PipelineSection,
}
