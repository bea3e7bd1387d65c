//! The claim under review.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TribunalError, TribunalResult};

/// An opaque natural-language claim submitted for review.
///
/// A `Claim` can only be built from non-blank text, so every run the
/// sequencer starts has something to judge. The text is never mutated once
/// a run begins; the session hands out clones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Claim(String);

impl Claim {
    /// Validate and wrap `text`.
    ///
    /// Returns `TribunalError::EmptyClaim` when the text is empty or only
    /// whitespace. Surrounding whitespace is kept as submitted.
    pub fn new(text: impl Into<String>) -> TribunalResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(TribunalError::EmptyClaim);
        }
        Ok(Self(text))
    }

    /// The claim text exactly as submitted.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Claim {
    type Error = TribunalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Claim> for String {
    fn from(claim: Claim) -> Self {
        claim.0
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
