//! Incremental server-sent-event decoder.
//!
//! Chat completions arrive as a chunked byte stream of discrete events
//! separated by blank lines, each carrying a `data: <json>` payload.
//! Chunk boundaries fall anywhere — mid-event, mid-JSON — so the decoder
//! buffers the residue and only decodes complete events. A payload
//! containing the `[DONE]` sentinel ends the stream; a payload that fails
//! to parse as JSON is dropped with a diagnostic, never treated as fatal.

use serde::Deserialize;
use tracing::warn;

const DONE_SENTINEL: &str = "[DONE]";

/// Stateful chunk-to-token transform. One decoder per stream.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the done sentinel has been seen. No tokens follow it.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one raw chunk, returning the tokens of every event it
    /// completed. The trailing partial event is retained for the next
    /// chunk. Emitted tokens may be empty; consumers filter those.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        if self.done {
            return tokens;
        }
        self.buffer.push_str(chunk);

        while let Some(boundary) = self.buffer.find("\n\n") {
            let event: String = self.buffer.drain(..boundary + 2).collect();
            if let Some(token) = self.decode_event(event.trim_end()) {
                tokens.push(token);
            }
            if self.done {
                break;
            }
        }
        tokens
    }

    /// Decode one complete event into its text delta.
    fn decode_event(&mut self, event: &str) -> Option<String> {
        if event.contains(DONE_SENTINEL) {
            self.done = true;
            return None;
        }

        // Join the data lines; an event may split its payload across
        // several `data:` lines. Comment and field lines are ignored.
        let data: String = event
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(str::trim_start)
            .collect();
        if data.is_empty() {
            return None;
        }

        match serde_json::from_str::<StreamPayload>(&data) {
            Ok(payload) => Some(
                payload
                    .choices
                    .first()
                    .and_then(|choice| choice.delta.content.clone())
                    .unwrap_or_default(),
            ),
            Err(e) => {
                warn!(payload = %data, error = %e, "Dropping undecodable stream event");
                None
            }
        }
    }
}

// --- SSE payload types ---

#[derive(Debug, Deserialize)]
struct StreamPayload {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}
