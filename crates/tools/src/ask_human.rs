//! Human-in-the-loop placeholder tool.
//!
//! Logs the request so an operator can see it, then answers with the
//! fallback so the chain keeps moving. A real implementation would
//! block on an operator response channel.

use async_trait::async_trait;
use reagent_core::error::ToolError;
use tracing::info;

use crate::{Tool, FALLBACK_ANSWER};

pub struct AskHumanTool;

#[async_trait]
impl Tool for AskHumanTool {
    fn name(&self) -> &str {
        "AskHuman"
    }

    fn description(&self) -> &str {
        "Ask a human for help with something the other tools cannot do"
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        info!(request = %input, "Human help requested");
        Ok(FALLBACK_ANSWER.to_string())
    }
}
