use serde_json::json;

/// Wire-level unit pushed to the browser over the event stream.
///
/// `Message` carries one response fragment; `Error` is terminal and carries a
/// fixed, user-facing description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Message(String),
    Error(String),
}

impl StreamEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Message(_) => "message",
            StreamEvent::Error(_) => "error",
        }
    }

    /// JSON-encoded payload: `{"data": ...}` or `{"error": ...}`.
    pub fn data(&self) -> String {
        match self {
            StreamEvent::Message(fragment) => json!({ "data": fragment }).to_string(),
            StreamEvent::Error(description) => json!({ "error": description }).to_string(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_payload_is_json_object() {
        let event = StreamEvent::Message("He said \"hi\"\n".to_string());
        assert_eq!(event.name(), "message");

        let value: serde_json::Value = serde_json::from_str(&event.data()).unwrap();
        assert_eq!(value, json!({ "data": "He said \"hi\"\n" }));
        assert!(!event.is_terminal());
    }

    #[test]
    fn error_payload_uses_error_key() {
        let event = StreamEvent::Error("boom".to_string());
        assert_eq!(event.name(), "error");
        assert_eq!(event.data(), r#"{"error":"boom"}"#);
        assert!(event.is_terminal());
    }
}
