use serde::{Deserialize, Serialize};

use crate::result::ToolResult;

/// Window metadata for a tool. Docking and window placement belong to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub template_url: String,
    pub icon: String,
    pub default_window_width: u32,
    pub default_window_height: u32,
}

pub trait Tool {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn config(&self) -> &ToolConfig;
    fn handle_result(&self, result: &ToolResult);
}
