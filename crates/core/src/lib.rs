//! # Reagent Core
//!
//! Domain types and error definitions for the Reagent agent runtime.
//! This crate has **zero framework dependencies** — it defines the trace
//! model, the wire protocol, and the error taxonomy that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! The trace parser is a pure function over the full scratchpad text: no
//! cursor, no global regex state, no cross-task interference. Everything
//! that crosses the WebSocket is a typed [`Envelope`]. Every failure mode
//! has a home in [`error`].

pub mod envelope;
pub mod error;
pub mod task;
pub mod trace;

// Re-export key types at crate root for ergonomics
pub use envelope::Envelope;
pub use error::{BridgeError, Error, ProviderError, Result, ToolError};
pub use task::{Task, TaskId, TaskState};
pub use trace::{parse_trace, ParsedTrace, TraceKind};
