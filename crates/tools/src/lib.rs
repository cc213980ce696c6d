pub mod api;
pub mod error;
pub mod result;
pub mod scatter_plot;
pub mod summary;
pub mod tool;
pub mod toolbar;

#[cfg(test)]
pub(crate) mod fixture;

pub use api::{ExperimentClient, FeatureData};
pub use error::ToolError;
pub use result::ToolResult;
pub use scatter_plot::{ScatterPlotTool, ScatterPoint, mark_selected, scatter_points};
pub use summary::{ObjectTypeSummary, ZoomifySummary, object_summaries, zoomify_summary};
pub use tool::{Tool, ToolConfig};
pub use toolbar::Toolbar;
