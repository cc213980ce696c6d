use std::rc::Rc;

use tracing::debug;
use viewport::{AppInstance, TOOLBAR_TEMPLATE_URL};

use crate::error::ToolError;
use crate::result::ToolResult;
use crate::tool::Tool;

/// Tools available to one app instance, in registration order.
pub struct Toolbar {
    app: Rc<AppInstance>,
    tools: Vec<Rc<dyn Tool>>,
}

impl Toolbar {
    pub fn new(app: Rc<AppInstance>) -> Self {
        Self {
            app,
            tools: Vec::new(),
        }
    }

    pub fn template_url(&self) -> &'static str {
        TOOLBAR_TEMPLATE_URL
    }

    pub fn app_instance(&self) -> &Rc<AppInstance> {
        &self.app
    }

    pub fn register(&mut self, tool: Rc<dyn Tool>) -> Result<(), ToolError> {
        if self.get(tool.id()).is_some() {
            return Err(ToolError::DuplicateTool(tool.id().to_string()));
        }
        debug!(tool = tool.id(), "tool registered");
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Rc<dyn Tool>> {
        self.tools.iter().find(|t| t.id() == id)
    }

    pub fn tools(&self) -> &[Rc<dyn Tool>] {
        &self.tools
    }

    /// Hands `result` to the tool named by `result.tool_name`.
    pub fn dispatch_result(&self, result: &ToolResult) -> Result<(), ToolError> {
        let tool = self
            .get(&result.tool_name)
            .ok_or_else(|| ToolError::UnknownTool(result.tool_name.clone()))?;
        tool.handle_result(result);
        Ok(())
    }
}
