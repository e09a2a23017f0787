//! Current local date and time

use crate::error::Result;
use crate::registry::{Tool, ToolDefinition, ToolResult};
use chrono::{DateTime, Local, TimeZone};
use std::time::Instant;

/// Tool returning the current local date and time
pub struct CurrentDateTimeTool {
    definition: ToolDefinition,
}

impl CurrentDateTimeTool {
    /// Tool name exposed to the model
    pub const NAME: &'static str = "get_current_datetime";

    /// Create the tool
    #[must_use]
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new(Self::NAME, "Returns current local date and time."),
        }
    }
}

impl Default for CurrentDateTimeTool {
    fn default() -> Self {
        Self::new()
    }
}

fn describe<Tz: TimeZone>(now: &DateTime<Tz>) -> serde_json::Value
where
    Tz::Offset: std::fmt::Display,
{
    serde_json::json!({
        "datetime": now.to_rfc3339(),
        "date": now.format("%Y-%m-%d").to_string(),
        "time": now.format("%H:%M:%S").to_string(),
        "weekday": now.format("%A").to_string(),
    })
}

#[async_trait::async_trait]
impl Tool for CurrentDateTimeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let output = describe(&Local::now());
        Ok(ToolResult::success(
            output,
            start.elapsed().as_millis() as u64,
        ))
    }
}
