//! Clock tool — pure local computation, no collaborators.

use async_trait::async_trait;
use chrono::Utc;
use reagent_core::error::ToolError;

use crate::Tool;

pub struct ClockTool;

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &str {
        "Clock"
    }

    fn description(&self) -> &str {
        "Get todays date"
    }

    async fn execute(&self, _input: &str) -> Result<String, ToolError> {
        Ok(Utc::now().to_rfc2822())
    }
}
