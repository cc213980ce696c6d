use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;
use viewport::SelectionState;

use crate::api::{ExperimentClient, FeatureData};
use crate::error::ToolError;
use crate::result::ToolResult;
use crate::tool::{Tool, ToolConfig};

/// Plots one feature against another for all objects of a type.
pub struct ScatterPlotTool {
    config: ToolConfig,
    client: ExperimentClient,
}

impl ScatterPlotTool {
    pub const ID: &'static str = "ScatterPlot";
    pub const NAME: &'static str = "Scatter Plot";
    pub const DESCRIPTION: &'static str = "Plot one feature against another feature";
    pub const TEMPLATE_URL: &'static str = "/templates/tools/modules/scatterplot/scatterplot.html";

    pub fn new(client: ExperimentClient) -> Self {
        Self {
            config: ToolConfig {
                template_url: Self::TEMPLATE_URL.to_string(),
                icon: "SCA".to_string(),
                default_window_width: 900,
                default_window_height: 1040,
            },
            client,
        }
    }

    pub fn client(&self) -> &ExperimentClient {
        &self.client
    }

    pub async fn fetch_feature_data(
        &self,
        object_type: &str,
        feature_name: &str,
    ) -> Result<FeatureData, ToolError> {
        self.client.feature_data(object_type, feature_name).await
    }
}

impl Tool for ScatterPlotTool {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    fn config(&self) -> &ToolConfig {
        &self.config
    }

    fn handle_result(&self, result: &ToolResult) {
        debug!(tool = Self::ID, ?result, "scatter plot result");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub selected: bool,
}

/// Joins two features on object id. Objects missing from either side are
/// dropped; points come out in ascending id order.
pub fn scatter_points(x: &FeatureData, y: &FeatureData) -> Vec<ScatterPoint> {
    let ys: BTreeMap<u32, f64> = y.iter().collect();
    let mut points: Vec<ScatterPoint> = x
        .iter()
        .filter_map(|(id, xv)| {
            ys.get(&id).map(|&yv| ScatterPoint {
                id,
                x: xv,
                y: yv,
                selected: false,
            })
        })
        .collect();
    points.sort_by_key(|p| p.id);
    points.dedup_by_key(|p| p.id);
    points
}

pub fn mark_selected(points: &mut [ScatterPoint], selection: &SelectionState, object_type: &str) {
    for p in points {
        p.selected = selection.is_selected(object_type, p.id);
    }
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::Router;
    use axum::extract::Path;
    use axum::routing::get;
    use serde_json::json;
    use viewport::{MapObjectSelectionHandler, SelectionEvent, SelectionHandler};

    use super::*;
    use crate::fixture;

    fn feature(name: &str, ids: &[u32], values: &[f64]) -> FeatureData {
        FeatureData {
            name: name.to_string(),
            values: values.to_vec(),
            ids: ids.to_vec(),
        }
    }

    #[test]
    fn tool_metadata() {
        let client = ExperimentClient::new("http://localhost:5002", "1").unwrap();
        let tool = ScatterPlotTool::new(client);
        assert_eq!(tool.id(), "ScatterPlot");
        assert_eq!(tool.name(), "Scatter Plot");
        assert_eq!(tool.description(), "Plot one feature against another feature");
        let config = tool.config();
        assert_eq!(config.icon, "SCA");
        assert_eq!(
            (config.default_window_width, config.default_window_height),
            (900, 1040)
        );
        assert_eq!(
            config.template_url,
            "/templates/tools/modules/scatterplot/scatterplot.html"
        );
        tool.handle_result(&ToolResult::new("ScatterPlot", json!({"ok": true})));
    }

    #[test]
    fn points_join_on_id() {
        let x = feature("area", &[3, 1, 2], &[30.0, 10.0, 20.0]);
        let y = feature("intensity", &[2, 3, 4], &[0.2, 0.3, 0.4]);
        let points = scatter_points(&x, &y);
        assert_eq!(
            points.iter().map(|p| (p.id, p.x, p.y)).collect::<Vec<_>>(),
            vec![(2, 20.0, 0.2), (3, 30.0, 0.3)]
        );
    }

    #[test]
    fn selected_points_follow_the_handler() {
        let x = feature("a", &[1, 2, 3], &[1.0, 2.0, 3.0]);
        let mut points = scatter_points(&x, &x);
        let mut handler = MapObjectSelectionHandler::new();
        handler.handle(&SelectionEvent::Select {
            object_type: "cells".into(),
            id: 2,
            additive: false,
        });
        mark_selected(&mut points, &handler.state(), "cells");
        assert_eq!(
            points.iter().filter(|p| p.selected).map(|p| p.id).collect::<Vec<_>>(),
            vec![2]
        );
        mark_selected(&mut points, &handler.state(), "nuclei");
        assert!(points.iter().all(|p| !p.selected));
    }

    #[tokio::test]
    async fn fetch_feature_data_hits_the_experiment_route() {
        let router = Router::new().route(
            "/api/experiments/:exp/features/:ty/:name",
            get(|Path((exp, ty, name)): Path<(String, String, String)>| async move {
                Json(json!({
                    "name": name,
                    "values": [exp.len() as f64, ty.len() as f64],
                    "ids": [7, 8],
                }))
            }),
        );
        let base = fixture::serve(router).await;
        let tool = ScatterPlotTool::new(ExperimentClient::new(&base, "abc").unwrap());
        let data = tool.fetch_feature_data("cells", "Area").await.unwrap();
        assert_eq!(data, feature("Area", &[7, 8], &[3.0, 5.0]));
    }
}
