use crate::domain::DomainError;

/// Detail returned to the client when a chat message is blank.
pub const EMPTY_MESSAGE_DETAIL: &str = "Message cannot be empty";

/// A single user turn submitted through the chat form.
///
/// Construction goes through [`ChatRequest::new`], which rejects messages that
/// are empty once surrounding whitespace is removed. The original text is kept
/// as submitted; trimming is only used for the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Result<Self, DomainError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(DomainError::invalid_input(EMPTY_MESSAGE_DETAIL));
        }
        Ok(Self { message })
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}
