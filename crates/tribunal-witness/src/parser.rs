//! Fail-closed decoding of the oracle's verdict.
//!
//! `VerdictParser` turns free text into a two-valued verdict. Only one shape
//! decodes to PASS: a JSON object whose `adversarial_verdict` is exactly
//! `"PASS"` and which carries nothing else (optionally wrapped in a code
//! fence, with any surrounding whitespace). Every other input is FAIL.
//!
//! | Input                                              | Result                        |
//! |----------------------------------------------------|-------------------------------|
//! | `{"adversarial_verdict":"PASS"}`                   | PASS                          |
//! | `{"adversarial_verdict":"FAIL","failure_reason":r}`| FAIL, `r` (or default reason) |
//! | valid JSON of any other shape or value             | FAIL, default reason          |
//! | not JSON                                           | FAIL, invalid-JSON reason     |
//!
//! The parser is pure: no I/O, no state, same input → same output.

use serde::Deserialize;

use tribunal_contracts::step::Outcome;

use crate::wire::ChatCompletion;

/// Reason used when the oracle flags a claim without explaining why, or
/// answers with a shape the parser does not recognize.
pub const DEFAULT_FAIL_REASON: &str = "Critical risk detected by adversarial witness.";

/// Reason used when the oracle's answer is not JSON at all.
pub const INVALID_JSON_REASON: &str = "Model returned invalid JSON format.";

/// The oracle's two-valued judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WitnessVerdict {
    Pass,
    Fail,
}

/// A decoded verdict. `reason` is always present on `Fail`, never on `Pass`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVerdict {
    pub verdict: WitnessVerdict,
    pub reason: Option<String>,
}

impl ParsedVerdict {
    fn pass() -> Self {
        Self {
            verdict: WitnessVerdict::Pass,
            reason: None,
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self {
            verdict: WitnessVerdict::Fail,
            reason: Some(reason.into()),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.verdict == WitnessVerdict::Pass
    }

    /// PASS → `Completed`, FAIL → `Failed(reason)`.
    pub fn into_outcome(self) -> Outcome {
        match self.verdict {
            WitnessVerdict::Pass => Outcome::Completed,
            WitnessVerdict::Fail => Outcome::Failed {
                reason: self.reason,
            },
        }
    }
}

/// The verdict payload, decoded strictly: unknown keys are an error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VerdictPayload {
    adversarial_verdict: Option<String>,
    failure_reason: Option<String>,
}

/// Stateless decoder for oracle replies.
pub struct VerdictParser;

impl VerdictParser {
    /// Decode the verdict text the oracle produced.
    pub fn parse(raw: &str) -> ParsedVerdict {
        let cleaned = strip_code_fence(raw);

        let payload: VerdictPayload = match serde_json::from_str(cleaned) {
            Ok(payload) => payload,
            // Well-formed JSON of the wrong shape: unrecognized, so FAIL.
            Err(e) if e.is_data() => return ParsedVerdict::fail(DEFAULT_FAIL_REASON),
            Err(_) => return ParsedVerdict::fail(INVALID_JSON_REASON),
        };

        match (payload.adversarial_verdict.as_deref(), payload.failure_reason) {
            (Some("PASS"), None) => ParsedVerdict::pass(),
            (Some("FAIL"), Some(reason)) if !reason.trim().is_empty() => {
                ParsedVerdict::fail(reason.trim())
            }
            // FAIL without a reason, PASS that also carries a failure reason,
            // a missing verdict, or any other value.
            _ => ParsedVerdict::fail(DEFAULT_FAIL_REASON),
        }
    }

    /// Extract the verdict text from a chat-completion response body, then
    /// decode it with [`parse`](Self::parse).
    ///
    /// A body that is not a chat-completion envelope, or whose first choice
    /// has no text content, is FAIL with the invalid-JSON reason.
    pub fn parse_response(body: &str) -> ParsedVerdict {
        match serde_json::from_str::<ChatCompletion>(body) {
            Ok(envelope) => match envelope.first_content() {
                Some(content) => Self::parse(content),
                None => ParsedVerdict::fail(INVALID_JSON_REASON),
            },
            Err(_) => ParsedVerdict::fail(INVALID_JSON_REASON),
        }
    }
}

/// Remove a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
///
/// Text without an opening fence is only trimmed.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string, e.g. `json`, that follows the opening fence.
    rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        .trim()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
