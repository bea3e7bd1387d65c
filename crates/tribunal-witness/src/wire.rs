//! Wire types for the chat-completion exchange with the oracle.
//!
//! Only the fields the tribunal reads or writes are modeled. Unknown fields
//! in the response envelope are ignored; the verdict payload inside it is
//! decoded strictly by the parser.

use serde::{Deserialize, Serialize};

/// The single request sent per oracle invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    /// Exactly one message: the oracle integration accepts a single role.
    pub messages: Vec<ChatMessage>,
    /// Always 0 so the same claim gets the same judgment.
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Option<String>,
}

/// The response envelope. The verdict lives in the first choice's content.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatCompletion {
    /// Text content of the first choice, if the envelope carries one.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}
