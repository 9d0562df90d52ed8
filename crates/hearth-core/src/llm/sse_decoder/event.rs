//! SSE event types

use serde_json::Value;

/// A parsed SSE event from the stream
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    /// Event type, absent for plain `data:` events
    pub event_type: Option<String>,
    /// Event data, multi-line payloads joined with `\n`
    pub data: String,
    pub id: Option<String>,
}

impl SseEvent {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            event_type: None,
            data: data.into(),
            id: None,
        }
    }

    /// Check if this is the `[DONE]` terminator
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }

    /// Text carried by an OpenAI-compatible chunk (`choices[0].delta.content`)
    pub fn delta_content(&self) -> Option<String> {
        let value: Value = serde_json::from_str(&self.data).ok()?;
        value
            .get("choices")?
            .get(0)?
            .get("delta")?
            .get("content")?
            .as_str()
            .map(str::to_string)
    }
}
