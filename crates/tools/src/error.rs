#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    InvalidUrl(String),
    InvalidArgument(String),
    Network(String),
    Http { url: String, status: u16 },
    /// The response arrived but did not have the expected shape.
    Malformed(String),
    UnknownTool(String),
    DuplicateTool(String),
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::InvalidUrl(msg) => write!(f, "invalid api url: {msg}"),
            ToolError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            ToolError::Network(msg) => write!(f, "request failed: {msg}"),
            ToolError::Http { url, status } => write!(f, "GET {url} returned {status}"),
            ToolError::Malformed(msg) => write!(f, "malformed response: {msg}"),
            ToolError::UnknownTool(id) => write!(f, "no tool registered as {id:?}"),
            ToolError::DuplicateTool(id) => write!(f, "tool {id:?} already registered"),
        }
    }
}

impl std::error::Error for ToolError {}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ToolError::Malformed(err.to_string())
        } else {
            ToolError::Network(err.to_string())
        }
    }
}
