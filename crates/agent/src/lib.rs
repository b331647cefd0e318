//! The Reagent agent loop.
//!
//! A ReAct cycle (Reason + Act, <https://arxiv.org/abs/2210.03629>):
//! the model thinks in free text, names a tool and its input, receives
//! the tool's observation, and repeats until it emits a final answer.
//! The loop streams every token to its caller as it arrives.

pub mod prompt;
pub mod runner;

#[cfg(test)]
mod test_helpers;

pub use prompt::render_prompt;
pub use runner::{AgentLoop, MAX_DEPTH};
