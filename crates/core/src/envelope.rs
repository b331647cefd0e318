//! Wire protocol envelopes for the gateway's message channel.
//!
//! Every message that crosses the WebSocket is one of these variants,
//! discriminated by a `type` field. Envelopes that correlate to a unit of
//! work carry a unique `id`; `token` and `answer` carry the owning task's
//! id so a multi-task frontend can route them to the right view.

use serde::{Deserialize, Serialize};

/// A discriminated JSON envelope on the bidirectional message channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Envelope {
    /// A question submitted by the client; starts a new task.
    Question { id: String, question: String },

    /// A single streamed token of the task's reasoning chain.
    Token { id: String, token: String },

    /// The task's final answer (empty when the chain was unproductive).
    Answer { id: String, answer: String },

    /// A remote-evaluation request: run `code` on the other end of the
    /// channel and reply with `evalSuccess` or `evalError` under the
    /// same correlation id.
    Eval { id: String, code: String },

    /// Successful remote evaluation result.
    EvalSuccess { id: String, result: String },

    /// Remote evaluation failed on the executor side.
    EvalError { id: String, error: String },

    /// A task-independent error report.
    Error { error: String },
}

impl Envelope {
    /// The wire name of this envelope's `type` discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Question { .. } => "question",
            Self::Token { .. } => "token",
            Self::Answer { .. } => "answer",
            Self::Eval { .. } => "eval",
            Self::EvalSuccess { .. } => "evalSuccess",
            Self::EvalError { .. } => "evalError",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_wire_format() {
        let json = r#"{"type":"question","id":"t1","question":"What day is it?"}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(
            envelope,
            Envelope::Question {
                id: "t1".into(),
                question: "What day is it?".into()
            }
        );
    }

    #[test]
    fn token_carries_task_id() {
        let envelope = Envelope::Token {
            id: "t1".into(),
            token: "Thought".into(),
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains(r#""type":"token""#));
        assert!(json.contains(r#""id":"t1""#));
    }

    #[test]
    fn eval_success_wire_format() {
        let json = r#"{"type":"evalSuccess","id":"abc","result":"4"}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(
            envelope,
            Envelope::EvalSuccess {
                id: "abc".into(),
                result: "4".into()
            }
        );
    }

    #[test]
    fn eval_error_wire_format() {
        let json = r#"{"type":"evalError","id":"abc","error":"boom"}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.kind(), "evalError");
    }

    #[test]
    fn round_trips_every_kind() {
        let envelopes = vec![
            Envelope::Question {
                id: "1".into(),
                question: "q".into(),
            },
            Envelope::Token {
                id: "1".into(),
                token: "t".into(),
            },
            Envelope::Answer {
                id: "1".into(),
                answer: "a".into(),
            },
            Envelope::Eval {
                id: "2".into(),
                code: "1+1".into(),
            },
            Envelope::EvalSuccess {
                id: "2".into(),
                result: "2".into(),
            },
            Envelope::EvalError {
                id: "2".into(),
                error: "e".into(),
            },
            Envelope::Error { error: "e".into() },
        ];
        for envelope in envelopes {
            let json = serde_json::to_string(&envelope).unwrap();
            let back: Envelope = serde_json::from_str(&json).unwrap();
            assert_eq!(back, envelope);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let json = r#"{"type":"telemetry","id":"1"}"#;
        assert!(serde_json::from_str::<Envelope>(json).is_err());
    }
}
