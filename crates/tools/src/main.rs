use std::env;

use clap::{Parser, Subcommand};
use layers::zoomify::DEFAULT_TILE_SIZE;
use serde_json::json;
use tools::{ExperimentClient, ScatterPlotTool, object_summaries, scatter_points, zoomify_summary};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_API_URL: &str = "http://127.0.0.1:5002";

#[derive(Parser, Debug)]
#[command(author, version, about = "Query experiment features and image pyramids")]
struct Args {
    /// API base URL (default: $TMAPS_API_URL or http://127.0.0.1:5002)
    #[arg(long)]
    api_url: Option<String>,

    /// Experiment id (default: $TMAPS_EXPERIMENT)
    #[arg(long)]
    experiment: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List feature names per object type
    Features,

    /// Count map objects per type and report the area they cover
    Objects,

    /// Print the values of one feature
    FeatureData { object_type: String, feature: String },

    /// Join two features into scatter-plot points
    Scatter {
        object_type: String,
        x: String,
        y: String,
    },

    /// Describe the Zoomify pyramid of an image (no network access)
    Zoomify {
        width: u32,
        height: u32,
        pyramid_path: String,

        #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
        tile_size: u32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main(args: Args) -> Result<(), String> {
    match &args.command {
        Command::Zoomify {
            width,
            height,
            pyramid_path,
            tile_size,
        } => {
            let summary = zoomify_summary([*width, *height], pyramid_path, *tile_size)
                .map_err(|e| e.to_string())?;
            print_json(&summary)
        }
        Command::Features => {
            let features = client(&args)?
                .features()
                .await
                .map_err(|e| e.to_string())?;
            print_json(&features)
        }
        Command::Objects => {
            let objects = client(&args)?
                .map_objects()
                .await
                .map_err(|e| e.to_string())?;
            let summaries = object_summaries(objects);
            info!(types = summaries.len(), "map objects loaded");
            print_json(&summaries)
        }
        Command::FeatureData {
            object_type,
            feature,
        } => {
            let data = client(&args)?
                .feature_data(object_type, feature)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&data)
        }
        Command::Scatter { object_type, x, y } => {
            let tool = ScatterPlotTool::new(client(&args)?);
            let xs = tool
                .fetch_feature_data(object_type, x)
                .await
                .map_err(|e| e.to_string())?;
            let ys = tool
                .fetch_feature_data(object_type, y)
                .await
                .map_err(|e| e.to_string())?;
            let points = scatter_points(&xs, &ys);
            info!(%object_type, points = points.len(), "scatter joined");
            print_json(&json!({ "x": x, "y": y, "points": points }))
        }
    }
}

fn client(args: &Args) -> Result<ExperimentClient, String> {
    let api_url = args.api_url.clone().unwrap_or_else(|| {
        env::var("TMAPS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
    });
    let experiment = match &args.experiment {
        Some(id) => id.clone(),
        None => env::var("TMAPS_EXPERIMENT")
            .map_err(|_| "no experiment: pass --experiment or set TMAPS_EXPERIMENT".to_string())?,
    };
    ExperimentClient::new(&api_url, experiment).map_err(|e| e.to_string())
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let out = serde_json::to_string_pretty(value).map_err(|e| format!("json: {e}"))?;
    println!("{out}");
    Ok(())
}
