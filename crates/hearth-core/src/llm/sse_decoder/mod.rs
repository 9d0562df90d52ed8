//! Server-Sent Events decoder for streamed chat completions
//!
//! Bytes arrive in arbitrary network chunks: an event, a line, or a single
//! UTF-8 character may be split across two of them. The decoder buffers until
//! a blank line completes an event.

mod event;

pub use event::SseEvent;

/// Buffered SSE decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Decoded text not yet terminated by a newline
    buffer: String,
    /// Trailing bytes of an unfinished UTF-8 sequence
    pending_bytes: Vec<u8>,
    event_type: Option<String>,
    id: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return every event completed by them
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.decode(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let raw: String = self.buffer.drain(..=pos).collect();
            let line = raw.trim_end_matches(|c: char| c == '\n' || c == '\r');
            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    events.push(event);
                }
            } else {
                self.process_line(line);
            }
        }
        events
    }

    /// Flush whatever is buffered once the body has ended
    ///
    /// Servers are not required to close the final event with a blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        if !self.pending_bytes.is_empty() {
            let tail = String::from_utf8_lossy(&self.pending_bytes).into_owned();
            self.buffer.push_str(&tail);
            self.pending_bytes.clear();
        }
        let rest = std::mem::take(&mut self.buffer);
        for line in rest.lines() {
            let line = line.trim_end_matches('\r');
            if !line.is_empty() {
                self.process_line(line);
            }
        }
        self.dispatch()
    }

    /// Whether any undispatched input is held
    pub fn has_remaining(&self) -> bool {
        !self.buffer.is_empty() || !self.pending_bytes.is_empty() || !self.data.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.pending_bytes.extend_from_slice(chunk);
        loop {
            match std::str::from_utf8(&self.pending_bytes) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending_bytes.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&self.pending_bytes[..valid]) {
                        self.buffer.push_str(text);
                    }
                    match e.error_len() {
                        // Incomplete sequence at the end: wait for the next chunk
                        None => {
                            self.pending_bytes.drain(..valid);
                            return;
                        }
                        Some(bad) => {
                            tracing::warn!(position = valid, "Invalid UTF-8 in event stream");
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.pending_bytes.drain(..valid + bad);
                        }
                    }
                }
            }
        }
    }

    fn process_line(&mut self, line: &str) {
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event_type = Some(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            // retry: and unknown fields are ignored
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event_type = self.event_type.take();
        let id = self.id.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event_type,
            data,
            id,
        })
    }
}

#[cfg(test)]
mod tests;
