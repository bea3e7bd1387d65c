//! The adversarial witness: the one step backed by a real check.
//!
//! `AdversarialWitness` implements `Evaluator` by sending the claim to the
//! judging oracle in a single chat-completion request and decoding the reply
//! with `VerdictParser`.
//!
//! The transport boundary is fail-closed. A non-success status, a network
//! error, an unreadable body, or an exchange that exceeds the oracle timeout
//! all settle the step as Failed with a transport-specific reason. Nothing
//! here returns `Err` to the sequencer, and nothing retries.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{debug, info, warn};

use tribunal_config::OracleConfig;
use tribunal_contracts::{
    claim::Claim,
    error::{TribunalError, TribunalResult},
    step::Outcome,
};
use tribunal_core::traits::Evaluator;

use crate::{
    parser::VerdictParser,
    prompt::witness_message,
    wire::{ChatMessage, ChatRequest},
};

/// Failure reason when the oracle does not answer within its timeout.
pub const ORACLE_TIMEOUT_REASON: &str = "oracle timeout";

/// Evaluator that asks the external judging oracle about a claim.
#[derive(Debug, Clone)]
pub struct AdversarialWitness {
    http: reqwest::Client,
    config: OracleConfig,
}

impl AdversarialWitness {
    /// Build a witness with its own HTTP client.
    ///
    /// Returns `TribunalError::Config` if the API key is not a valid header
    /// value or the client cannot be constructed.
    pub fn new(config: OracleConfig) -> TribunalResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
                TribunalError::Config {
                    reason: "oracle api_key contains characters not allowed in a header".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| TribunalError::Config {
                reason: format!("failed to build oracle HTTP client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    /// The request body sent for `claim`.
    pub fn request_for(&self, claim: &Claim) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(witness_message(claim.as_str())),
            }],
            temperature: 0.0,
        }
    }

    /// Ask the oracle about `claim` and reduce every possible answer to an
    /// outcome.
    pub async fn judge(&self, claim: &Claim) -> Outcome {
        info!(
            endpoint = %self.config.endpoint,
            model = %self.config.model,
            "consulting adversarial witness"
        );

        let body = match tokio::time::timeout(self.config.timeout, self.exchange(claim)).await {
            Ok(Ok(body)) => body,
            Ok(Err(TribunalError::Timeout { .. })) | Err(_) => {
                warn!(
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "oracle did not answer in time"
                );
                return Outcome::failed(ORACLE_TIMEOUT_REASON);
            }
            Ok(Err(err)) => {
                warn!(error = %err, "oracle exchange failed");
                return Outcome::failed(err.to_string());
            }
        };

        let parsed = VerdictParser::parse_response(&body);
        if parsed.is_pass() {
            info!("adversarial witness passed the claim");
        } else {
            warn!(
                reason = parsed.reason.as_deref().unwrap_or_default(),
                "adversarial witness flagged the claim"
            );
        }
        parsed.into_outcome()
    }

    /// One request/response round trip. Returns the raw response body.
    async fn exchange(&self, claim: &Claim) -> TribunalResult<String> {
        let request = self.request_for(claim);

        let resp = self
            .http
            .post(self.config.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        debug!(status = status.as_u16(), "oracle responded");

        if !status.is_success() {
            return Err(TribunalError::Transport {
                reason: format!("oracle returned HTTP {status}"),
            });
        }

        resp.text().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, e: reqwest::Error) -> TribunalError {
        if e.is_timeout() {
            TribunalError::Timeout {
                step: "adversarial-witness".to_string(),
                after_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            TribunalError::Transport {
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Evaluator for AdversarialWitness {
    async fn evaluate(&self, claim: &Claim) -> TribunalResult<Outcome> {
        Ok(self.judge(claim).await)
    }
}
