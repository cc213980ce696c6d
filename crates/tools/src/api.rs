use std::collections::BTreeMap;

use layers::MapObject;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use viewport::AppInstance;

use crate::error::ToolError;

/// Values of one feature for every (non-border) object of a type.
/// `values[i]` belongs to object `ids[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureData {
    pub name: String,
    pub values: Vec<f64>,
    pub ids: Vec<u32>,
}

impl FeatureData {
    pub fn validate(self) -> Result<Self, ToolError> {
        if self.values.len() != self.ids.len() {
            return Err(ToolError::Malformed(format!(
                "feature {:?}: {} values for {} ids",
                self.name,
                self.values.len(),
                self.ids.len()
            )));
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.ids.iter().copied().zip(self.values.iter().copied())
    }
}

#[derive(Debug, Deserialize)]
struct FeatureName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FeaturesResponse {
    features: BTreeMap<String, Vec<FeatureName>>,
}

#[derive(Debug, Deserialize)]
struct ObjectsResponse {
    objects: BTreeMap<String, ObjectTypeData>,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectTypeData {
    #[serde(default)]
    visual_type: Option<String>,
    #[serde(default)]
    map_data: MapData,
}

#[derive(Debug, Default, Deserialize)]
struct MapData {
    #[serde(default)]
    coordinates: BTreeMap<String, Vec<[f64; 2]>>,
}

/// HTTP client for one experiment's endpoints under `/api/experiments/{id}`.
#[derive(Debug, Clone)]
pub struct ExperimentClient {
    http: Client,
    base: Url,
    experiment_id: String,
}

impl ExperimentClient {
    pub fn new(base_url: &str, experiment_id: impl Into<String>) -> Result<Self, ToolError> {
        Self::with_client(Client::new(), base_url, experiment_id)
    }

    pub fn for_app(base_url: &str, app: &AppInstance) -> Result<Self, ToolError> {
        Self::new(base_url, app.experiment.id.clone())
    }

    pub fn with_client(
        http: Client,
        base_url: &str,
        experiment_id: impl Into<String>,
    ) -> Result<Self, ToolError> {
        let base = Url::parse(base_url).map_err(|e| ToolError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ToolError::InvalidUrl(format!("{base_url} cannot be a base")));
        }
        Ok(Self {
            http,
            base,
            experiment_id: experiment_id.into(),
        })
    }

    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// `GET /api/experiments/{id}/features/{object_type}/{feature_name}`.
    pub async fn feature_data(
        &self,
        object_type: &str,
        feature_name: &str,
    ) -> Result<FeatureData, ToolError> {
        let url = self.endpoint(&["features", object_type, feature_name]);
        let data: FeatureData = self.get_json(url).await?;
        data.validate()
    }

    /// Feature names per object type, sorted by type.
    pub async fn features(&self) -> Result<BTreeMap<String, Vec<String>>, ToolError> {
        let resp: FeaturesResponse = self.get_json(self.endpoint(&["features"])).await?;
        Ok(resp
            .features
            .into_iter()
            .map(|(ty, names)| (ty, names.into_iter().map(|f| f.name).collect()))
            .collect())
    }

    /// Outlines per object type. Only polygon objects are supported.
    pub async fn map_objects(&self) -> Result<BTreeMap<String, Vec<MapObject>>, ToolError> {
        let resp: ObjectsResponse = self.get_json(self.endpoint(&["objects"])).await?;
        let mut out = BTreeMap::new();
        for (ty, data) in resp.objects {
            if let Some(visual) = data.visual_type.as_deref() {
                if visual != "polygon" {
                    return Err(ToolError::Malformed(format!(
                        "{ty}: unsupported visual type {visual:?}"
                    )));
                }
            }
            let mut objects = Vec::with_capacity(data.map_data.coordinates.len());
            for (id, outline) in data.map_data.coordinates {
                let id = id
                    .parse::<u32>()
                    .map_err(|_| ToolError::Malformed(format!("{ty}: object id {id:?}")))?;
                objects.push(MapObject { id, outline });
            }
            objects.sort_by_key(|o| o.id);
            out.insert(ty, objects);
        }
        Ok(out)
    }

    /// URL of a pyramid file, e.g. `tile_url("DAPI", "TileGroup0/0-0-0.jpg")`.
    pub fn tile_url(&self, layer_name: &str, file: &str) -> String {
        let mut segments = vec!["layers", layer_name];
        segments.extend(file.split('/').filter(|s| !s.is_empty()));
        self.endpoint(&segments).to_string()
    }

    fn endpoint(&self, tail: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `with_client` rejects cannot-be-a-base urls.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["api", "experiments", self.experiment_id.as_str()])
                .extend(tail);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ToolError> {
        debug!(%url, "GET");
        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ToolError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::get;
    use serde_json::json;

    use super::*;
    use crate::fixture;

    fn backend() -> Router {
        Router::new()
            .route(
                "/api/experiments/:exp/features/:ty/:name",
                get(|Path((exp, ty, name)): Path<(String, String, String)>| async move {
                    if ty != "cells" {
                        return Err(StatusCode::NOT_FOUND);
                    }
                    let ids = if name == "broken" { vec![1] } else { vec![1, 2, 3] };
                    Ok(Json(json!({
                        "name": format!("{exp}:{name}"),
                        "values": [0.5, 1.5, 2.5],
                        "ids": ids,
                    })))
                }),
            )
            .route(
                "/api/experiments/:exp/features",
                get(|| async {
                    Json(json!({
                        "features": {
                            "nuclei": [],
                            "cells": [{"name": "Area"}, {"name": "Intensity"}],
                        }
                    }))
                }),
            )
            .route(
                "/api/experiments/:exp/objects",
                get(|| async {
                    Json(json!({
                        "objects": {
                            "cells": {
                                "ids": [],
                                "visual_type": "polygon",
                                "map_data": {"coordinates": {
                                    "10": [[0.0, 0.0], [2.0, 0.0], [2.0, -2.0]],
                                    "2": [[5.0, -5.0], [6.0, -5.0], [6.0, -6.0]],
                                }}
                            }
                        }
                    }))
                }),
            )
    }

    #[tokio::test]
    async fn fetches_feature_data_with_escaped_segments() {
        let base = fixture::serve(backend()).await;
        let client = ExperimentClient::new(&base, "exp 1").unwrap();
        let data = client.feature_data("cells", "Area Shape").await.unwrap();
        assert_eq!(data.name, "exp 1:Area Shape");
        assert_eq!(data.ids, vec![1, 2, 3]);
        assert_eq!(data.iter().nth(1), Some((2, 1.5)));
    }

    #[tokio::test]
    async fn mismatched_feature_arrays_are_malformed() {
        let base = fixture::serve(backend()).await;
        let client = ExperimentClient::new(&base, "e").unwrap();
        let err = client.feature_data("cells", "broken").await.unwrap_err();
        assert!(matches!(err, ToolError::Malformed(_)));
    }

    #[tokio::test]
    async fn http_errors_carry_the_status() {
        let base = fixture::serve(backend()).await;
        let client = ExperimentClient::new(&base, "e").unwrap();
        let err = client.feature_data("wells", "Area").await.unwrap_err();
        assert!(matches!(err, ToolError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn lists_features_per_type() {
        let base = fixture::serve(backend()).await;
        let client = ExperimentClient::new(&base, "e").unwrap();
        let features = client.features().await.unwrap();
        assert_eq!(features["cells"], vec!["Area", "Intensity"]);
        assert!(features["nuclei"].is_empty());
    }

    #[tokio::test]
    async fn map_objects_parse_outlines_sorted_by_id() {
        let base = fixture::serve(backend()).await;
        let client = ExperimentClient::new(&base, "e").unwrap();
        let objects = client.map_objects().await.unwrap();
        let cells = &objects["cells"];
        assert_eq!(cells.iter().map(|o| o.id).collect::<Vec<_>>(), vec![2, 10]);
        assert_eq!(cells[1].outline.len(), 3);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let client = ExperimentClient::new("http://127.0.0.1:9", "e").unwrap();
        let err = client.features().await.unwrap_err();
        assert!(matches!(err, ToolError::Network(_)));
    }

    #[test]
    fn tile_urls_keep_the_pyramid_path() {
        let client = ExperimentClient::new("http://localhost:5002/", "42").unwrap();
        assert_eq!(
            client.tile_url("DAPI", "TileGroup0/0-0-0.jpg"),
            "http://localhost:5002/api/experiments/42/layers/DAPI/TileGroup0/0-0-0.jpg"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            ExperimentClient::new("not a url", "e"),
            Err(ToolError::InvalidUrl(_))
        ));
        assert!(matches!(
            ExperimentClient::new("mailto:someone@example.com", "e"),
            Err(ToolError::InvalidUrl(_))
        ));
    }
}
