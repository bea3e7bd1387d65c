//! Validated runtime configuration.
//!
//! `TribunalConfig` is resolved in three layers:
//!
//! 1. The TOML file, if one is given (`from_toml_str`, `from_file`).
//! 2. Environment overrides, applied field by field (`TRIBUNAL_*`).
//! 3. Defaults for anything still unset, then validation.
//!
//! Endpoint and model have no default: a host that cannot name its oracle
//! must not start.

use std::{fmt, path::Path, time::Duration};

use tracing::{debug, warn};
use url::Url;

use tribunal_contracts::error::{TribunalError, TribunalResult};

use crate::section::ConfigFile;

pub const ENV_ENDPOINT: &str = "TRIBUNAL_ORACLE_ENDPOINT";
pub const ENV_MODEL: &str = "TRIBUNAL_ORACLE_MODEL";
pub const ENV_API_KEY: &str = "TRIBUNAL_ORACLE_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "TRIBUNAL_ORACLE_TIMEOUT_SECS";
pub const ENV_PLACEHOLDER_DELAY_MS: &str = "TRIBUNAL_PLACEHOLDER_DELAY_MS";
pub const ENV_STEP_TIMEOUT_SECS: &str = "TRIBUNAL_STEP_TIMEOUT_SECS";

pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PLACEHOLDER_DELAY_MS: u64 = 400;
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the judging oracle.
///
/// Custom `Debug` implementation redacts the `api_key` field so the config
/// can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct OracleConfig {
    pub endpoint: Url,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OracleConfig {
    /// Settings for a local oracle, typically a mock server in tests.
    pub fn local(endpoint: Url, model: impl Into<String>) -> Self {
        Self {
            endpoint,
            model: model.into(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_ORACLE_TIMEOUT_SECS),
        }
    }
}

/// Pacing of the step sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub placeholder_delay: Duration,
    pub step_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            placeholder_delay: Duration::from_millis(DEFAULT_PLACEHOLDER_DELAY_MS),
            step_timeout: Duration::from_secs(DEFAULT_STEP_TIMEOUT_SECS),
        }
    }
}

/// Fully resolved and validated host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TribunalConfig {
    pub oracle: OracleConfig,
    pub pipeline: PipelineConfig,
}

impl TribunalConfig {
    /// Parse `s` as TOML and validate it without consulting the environment.
    ///
    /// Returns `TribunalError::Config` if the TOML is malformed, has unknown
    /// keys, or fails validation.
    pub fn from_toml_str(s: &str) -> TribunalResult<Self> {
        let file = parse_file(s)?;
        Self::resolve(file, |_| None)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> TribunalResult<Self> {
        let file = read_file(path)?;
        Self::resolve(file, |_| None)
    }

    /// Build the configuration from `TRIBUNAL_*` environment variables only.
    pub fn from_env() -> TribunalResult<Self> {
        Self::resolve(ConfigFile::default(), |key| std::env::var(key).ok())
    }

    /// Load the optional file at `path`, then apply environment overrides.
    ///
    /// This is what the host binary calls.
    pub fn load(path: Option<&Path>) -> TribunalResult<Self> {
        let file = match path {
            Some(path) => read_file(path)?,
            None => ConfigFile::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` on top of `file`, fill defaults, and
    /// validate.
    ///
    /// `lookup` maps an environment variable name to its value. Taking it as
    /// a parameter keeps resolution testable without touching process state.
    pub fn resolve<F>(mut file: ConfigFile, lookup: F) -> TribunalResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_ENDPOINT) {
            file.oracle.endpoint = Some(v);
        }
        if let Some(v) = lookup(ENV_MODEL) {
            file.oracle.model = Some(v);
        }
        if let Some(v) = lookup(ENV_API_KEY) {
            file.oracle.api_key = Some(v);
        }
        if let Some(v) = lookup(ENV_TIMEOUT_SECS) {
            file.oracle.timeout_secs = Some(parse_number(ENV_TIMEOUT_SECS, &v)?);
        }
        if let Some(v) = lookup(ENV_PLACEHOLDER_DELAY_MS) {
            file.pipeline.placeholder_delay_ms = Some(parse_number(ENV_PLACEHOLDER_DELAY_MS, &v)?);
        }
        if let Some(v) = lookup(ENV_STEP_TIMEOUT_SECS) {
            file.pipeline.step_timeout_secs = Some(parse_number(ENV_STEP_TIMEOUT_SECS, &v)?);
        }

        let config = Self::validate(file)?;
        debug!(oracle = ?config.oracle, pipeline = ?config.pipeline, "configuration resolved");
        Ok(config)
    }

    fn validate(file: ConfigFile) -> TribunalResult<Self> {
        let raw_endpoint = file
            .oracle
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| config_error(format!("oracle endpoint is required (set [oracle].endpoint or {ENV_ENDPOINT})")))?;

        let endpoint = Url::parse(raw_endpoint.trim())
            .map_err(|e| config_error(format!("invalid oracle endpoint '{raw_endpoint}': {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(config_error(format!(
                "oracle endpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        let model = file
            .oracle
            .model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| config_error(format!("oracle model is required (set [oracle].model or {ENV_MODEL})")))?;

        let api_key = file.oracle.api_key.filter(|k| !k.trim().is_empty());

        let timeout_secs = file.oracle.timeout_secs.unwrap_or(DEFAULT_ORACLE_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(config_error("oracle timeout_secs must be at least 1"));
        }

        let step_timeout_secs = file
            .pipeline
            .step_timeout_secs
            .unwrap_or(DEFAULT_STEP_TIMEOUT_SECS);
        if step_timeout_secs == 0 {
            return Err(config_error("pipeline step_timeout_secs must be at least 1"));
        }
        if step_timeout_secs < timeout_secs {
            warn!(
                step_timeout_secs,
                oracle_timeout_secs = timeout_secs,
                "step timeout is shorter than the oracle timeout; oracle failures will report as step timeouts"
            );
        }

        let placeholder_delay_ms = file
            .pipeline
            .placeholder_delay_ms
            .unwrap_or(DEFAULT_PLACEHOLDER_DELAY_MS);

        Ok(Self {
            oracle: OracleConfig {
                endpoint,
                model,
                api_key,
                timeout: Duration::from_secs(timeout_secs),
            },
            pipeline: PipelineConfig {
                placeholder_delay: Duration::from_millis(placeholder_delay_ms),
                step_timeout: Duration::from_secs(step_timeout_secs),
            },
        })
    }
}

fn parse_file(s: &str) -> TribunalResult<ConfigFile> {
    toml::from_str(s).map_err(|e| config_error(format!("failed to parse config TOML: {e}")))
}

fn read_file(path: &Path) -> TribunalResult<ConfigFile> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        config_error(format!("failed to read config file '{}': {}", path.display(), e))
    })?;
    parse_file(&contents)
}

fn parse_number(var: &str, value: &str) -> TribunalResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| config_error(format!("{var} must be a non-negative integer, got '{value}'")))
}

fn config_error(reason: impl Into<String>) -> TribunalError {
    TribunalError::Config {
        reason: reason.into(),
    }
}
