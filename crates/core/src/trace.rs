//! ReAct trace parsing — marker-delimited fields in the model's output.
//!
//! The model emits freeform text punctuated by five fixed marker strings
//! (`Thought:`, `Action:`, `Action Input:`, `Observation:`, `Final Answer:`).
//! [`parse_trace`] is a pure function over the *full* scratchpad: it is
//! re-run from the start on every loop iteration, so a repeated marker
//! naturally overwrites its earlier occurrence and there is no parser
//! state to leak between tasks.

use std::collections::HashMap;

/// The kind of a ReAct trace field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceKind {
    Thought,
    Action,
    ActionInput,
    Observation,
    FinalAnswer,
}

impl TraceKind {
    /// All kinds, in the order they conventionally appear in a chain.
    /// Ordering carries no semantic meaning for parsing.
    pub const ALL: [TraceKind; 5] = [
        TraceKind::Thought,
        TraceKind::Action,
        TraceKind::ActionInput,
        TraceKind::Observation,
        TraceKind::FinalAnswer,
    ];

    /// The literal marker string the model emits for this kind.
    pub fn marker(self) -> &'static str {
        match self {
            TraceKind::Thought => "Thought:",
            TraceKind::Action => "Action:",
            TraceKind::ActionInput => "Action Input:",
            TraceKind::Observation => "Observation:",
            TraceKind::FinalAnswer => "Final Answer:",
        }
    }

    /// Action and Action Input hold exactly one line of content; the
    /// model is instructed to put the tool name and its input on single
    /// lines, so anything after the first line break is discarded.
    fn single_line(self) -> bool {
        matches!(self, TraceKind::Action | TraceKind::ActionInput)
    }
}

/// The fields extracted from one parse pass over a scratchpad.
///
/// At most one value per kind; a marker that never appeared is simply
/// absent (not an error).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTrace {
    fields: HashMap<TraceKind, String>,
}

impl ParsedTrace {
    pub fn get(&self, kind: TraceKind) -> Option<&str> {
        self.fields.get(&kind).map(String::as_str)
    }

    pub fn thought(&self) -> Option<&str> {
        self.get(TraceKind::Thought)
    }

    pub fn action(&self) -> Option<&str> {
        self.get(TraceKind::Action)
    }

    pub fn action_input(&self) -> Option<&str> {
        self.get(TraceKind::ActionInput)
    }

    pub fn observation(&self) -> Option<&str> {
        self.get(TraceKind::Observation)
    }

    pub fn final_answer(&self) -> Option<&str> {
        self.get(TraceKind::FinalAnswer)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse the full scratchpad text into its trace fields.
///
/// Scans left to right for marker occurrences; the text between two
/// consecutive markers (or between the last marker and end of text) is
/// that marker's content, trimmed of surrounding whitespace. When a
/// marker repeats, the last occurrence wins.
pub fn parse_trace(text: &str) -> ParsedTrace {
    let mut occurrences: Vec<(usize, TraceKind)> = Vec::new();
    for kind in TraceKind::ALL {
        for (idx, _) in text.match_indices(kind.marker()) {
            occurrences.push((idx, kind));
        }
    }
    occurrences.sort_by_key(|&(idx, _)| idx);

    let mut fields = HashMap::new();
    for (i, &(idx, kind)) in occurrences.iter().enumerate() {
        let start = idx + kind.marker().len();
        let end = occurrences
            .get(i + 1)
            .map(|&(next, _)| next)
            .unwrap_or(text.len());
        let raw = text[start..end].trim();
        let content = if kind.single_line() {
            raw.lines().next().unwrap_or("").trim_end().to_string()
        } else {
            raw.to_string()
        };
        fields.insert(kind, content);
    }

    ParsedTrace { fields }
}
