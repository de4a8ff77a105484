//! CLI entry point: one-shot replay of resource manifests through the
//! transformation pipeline.
//!
//! Reads newline-delimited JSON manifests, routes registry kinds to the
//! typed intake and everything else to the dynamic intake, and writes
//! one graph node per line to stdout. In a deployed collector the
//! intakes are fed by the cluster watch layer instead.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use topograph_core::MemoryNodeStore;
use topograph_transform::config::TransformConfig;
use topograph_transform::resources::{Resource, Unstructured};
use topograph_transform::transform::Transform;
use topograph_transform::transformer::{Intake, Transformer};

#[derive(Parser)]
#[command(name = "topograph-transform")]
#[command(about = "Transform cluster resource manifests into graph nodes")]
struct Cli {
    /// Newline-delimited JSON manifest file (defaults to stdin).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Override the configured worker count.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Also resolve relationships once all nodes are built, and print
    /// the edges after the nodes.
    #[arg(long)]
    edges: bool,

    /// Config file prefix (default: topograph).
    #[arg(short, long, default_value = "topograph")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let config = load_transform_config(&cli.config)?;
    let worker_count = cli.workers.unwrap_or(config.worker_count);

    let manifests = read_manifests(cli.input.as_deref())?;
    tracing::info!(count = manifests.len(), "Manifests loaded");

    let (transformer, intake, mut output) = Transformer::new(&config);
    let pool = transformer.start(worker_count)?;

    // Feed from a separate task so output draining below keeps the
    // bounded channels moving.
    let keep_typed = cli.edges;
    let feeder = tokio::spawn(feed(intake, manifests, keep_typed));

    let mut store = MemoryNodeStore::new();
    let mut stdout = std::io::stdout().lock();
    let mut emitted = 0usize;
    while let Some(node) = output.recv().await {
        writeln!(stdout, "{}", serde_json::to_string(&node)?)?;
        emitted += 1;
        if cli.edges {
            store.insert(node);
        }
    }

    let typed = feeder.await??;
    pool.join().await;
    tracing::info!(nodes = emitted, "Transformation complete");

    if cli.edges {
        let mut edge_count = 0usize;
        for resource in &typed {
            for edge in resource.build_edges(&store) {
                writeln!(stdout, "{}", serde_json::to_string(&edge)?)?;
                edge_count += 1;
            }
        }
        tracing::info!(edges = edge_count, "Edge resolution complete");
    }

    Ok(())
}

/// Push every manifest into the matching intake queue, returning the
/// typed resources when the edge pass needs them afterwards.
async fn feed(
    intake: Intake,
    manifests: Vec<serde_json::Value>,
    keep_typed: bool,
) -> anyhow::Result<Vec<Resource>> {
    let mut typed = Vec::new();
    for value in manifests {
        let kind = value
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("");
        if Resource::KINDS.contains(&kind) {
            let resource = Resource::parse(value)?;
            if keep_typed {
                typed.push(resource.clone());
            }
            intake
                .resources
                .send(resource)
                .await
                .map_err(|_| anyhow::anyhow!("typed intake closed"))?;
        } else {
            intake
                .dynamic
                .send(Unstructured::new(value))
                .await
                .map_err(|_| anyhow::anyhow!("dynamic intake closed"))?;
        }
    }
    Ok(typed)
}

fn read_manifests(path: Option<&Path>) -> anyhow::Result<Vec<serde_json::Value>> {
    let reader: Box<dyn BufRead> = match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let mut manifests = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        manifests.push(serde_json::from_str(&line)?);
    }
    Ok(manifests)
}

fn load_transform_config(file_prefix: &str) -> anyhow::Result<TransformConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("TOPOGRAPH_TRANSFORM")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    match cfg.get::<TransformConfig>("transform") {
        Ok(c) => Ok(c),
        Err(_) => Ok(TransformConfig::default()),
    }
}
