use std::collections::BTreeMap;
use std::io;

use clap::{Parser, Subcommand};
use foundation::PointId;
use layers::markers::MarkerLayer;
use layers::session::MapSession;
use layers::symbology::Tone;
use reqwest::Client;
use runtime::SessionClock;
use scene::{
    FeatureIndex, SelectionController, SelectionOptions, ViewportController, ViewportOptions,
};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod assets;
mod config;
mod driver;
mod geocode;
mod renderer;

use config::{ConfigArgs, ViewerConfig};
use driver::Collaborators;
use renderer::{bounds_json, detail_json, JsonLinesRenderer};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless reliability map viewer")]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print marker descriptors and the initial fit as JSON lines
    Markers,

    /// Select one point, resolve its location and images, print the detail view
    Inspect {
        /// Point id (feature index in the collection)
        #[arg(long)]
        point: u32,
    },

    /// Print counts per marker tone, dropped features and the data extent
    Summary,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = ViewerConfig::from_env(args.config);

    let payload = tokio::fs::read_to_string(&config.data)
        .await
        .map_err(|e| format!("failed to read {}: {e}", config.data.display()))?;
    let index = FeatureIndex::ingest_str(&payload);
    info!(
        "loaded {} points from {:?} ({} dropped)",
        index.len(),
        config.data,
        index.dropped_count()
    );

    let mut session = build_session(index, &config);
    let mut renderer = JsonLinesRenderer::new(io::stdout().lock());

    match args.command {
        Command::Markers => {
            session.publish(&mut renderer);
        }
        Command::Inspect { point } => {
            let clock = SessionClock::start();
            let collaborators = Collaborators::from_config(&config, Client::new());
            let detail =
                driver::inspect(&mut session, PointId(point), &clock, &collaborators, &mut renderer)
                    .await
                    .ok_or_else(|| format!("unknown point {}", PointId(point)))?;
            renderer.emit(&detail_json(&detail));
        }
        Command::Summary => {
            let classifier = session.markers().classifier();
            let mut tones: BTreeMap<&str, usize> =
                Tone::ALL.iter().map(|t| (t.name(), 0)).collect();
            for p in session.index().points() {
                let props = &p.properties;
                let tone = classifier.marker_tone(props.variance_score, props.similarity_score);
                *tones.entry(tone.name()).or_default() += 1;
            }
            let shown = session.markers().extract(session.index()).len();
            let bands: Vec<_> = [&classifier.variance, &classifier.similarity]
                .into_iter()
                .map(|axis| {
                    let [good_below, bad_above] = axis.band_cut_points();
                    json!({
                        "title": axis.title,
                        "metric": axis.metric,
                        "goodBelow": good_below,
                        "badAbove": bad_above,
                    })
                })
                .collect();
            renderer.emit(&json!({
                "type": "summary",
                "points": session.index().len(),
                "dropped": session.index().dropped_count(),
                "markers": shown,
                "tones": tones,
                "bands": bands,
                "extent": session.index().extent().map(bounds_json),
            }));
        }
    }

    Ok(())
}

fn build_session(index: FeatureIndex, config: &ViewerConfig) -> MapSession {
    let viewport = ViewportController::new(ViewportOptions {
        fit: config.fit,
        ..ViewportOptions::default()
    });
    let selection = SelectionController::new(SelectionOptions {
        image_prefix: config.image_prefix.clone(),
        ..SelectionOptions::default()
    });
    let markers = MarkerLayer::new(1).with_stride(config.marker_stride);
    MapSession::new(index, markers, viewport, selection)
}
