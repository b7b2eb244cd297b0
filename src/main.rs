//! voxelpipe runner: execute a pipeline document from the command line.
//!
//! Loads a JSON pipeline document, instantiates its filters through the
//! built-in registry, preflights the whole pipeline, and (unless asked to
//! stop there) executes it, streaming status messages as they arrive.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use voxelpipe::filter::{FilterRegistry, PipelineDocument, PipelineMessage};
use voxelpipe::store::DataContainerArray;

#[derive(Parser)]
#[command(name = "voxelpipe", about = "Run a voxelpipe pipeline document")]
struct Args {
    /// Pipeline document (JSON) to run
    pipeline: PathBuf,

    /// Validate the pipeline (preflight pass) and exit without executing
    #[arg(long)]
    preflight_only: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,voxelpipe=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let document = PipelineDocument::load(&args.pipeline)
        .with_context(|| format!("failed to load pipeline {:?}", args.pipeline))?;
    tracing::info!("loaded pipeline with {} filters", document.filters.len());

    let registry = FilterRegistry::with_builtins();
    let mut pipeline = document
        .build(&registry)
        .context("failed to build pipeline")?;

    // Stream status messages on a separate thread while the pipeline runs.
    let (tx, rx) = crossbeam_channel::unbounded();
    pipeline.set_listener(tx);
    let printer = std::thread::spawn(move || {
        for message in rx {
            match message {
                PipelineMessage::FilterStarted { index, name, phase } => {
                    tracing::info!("[{}] {} ({})", index, name, phase);
                }
                PipelineMessage::FilterStatus { name, message, .. } => {
                    tracing::info!("{}: {}", name, message);
                }
                PipelineMessage::FilterProgress { name, percent, .. } => {
                    tracing::debug!("{}: {:.0}%", name, percent);
                }
                PipelineMessage::FilterFailed {
                    name,
                    code,
                    message,
                    ..
                } => {
                    tracing::error!("{} failed ({}): {}", name, code, message);
                }
                PipelineMessage::PreflightPassed { filter_count } => {
                    tracing::info!("preflight passed for all {} filters", filter_count);
                }
                PipelineMessage::PipelineCompleted { .. } => {
                    tracing::info!("pipeline completed");
                }
                PipelineMessage::PipelineCanceled { index } => {
                    tracing::warn!("pipeline canceled before filter {}", index);
                }
                PipelineMessage::FilterCompleted { .. } => {}
            }
        }
    });

    let mut store = DataContainerArray::new();
    let outcome = if args.preflight_only {
        pipeline.preflight(&mut store)
    } else {
        pipeline.run(&mut store)
    };

    let report: Vec<String> = pipeline
        .slots()
        .iter()
        .map(|slot| {
            format!(
                "{} [{}{}]",
                slot.filter.name(),
                slot.state,
                slot.error_message
                    .as_deref()
                    .map(|m| format!(": {m}"))
                    .unwrap_or_default()
            )
        })
        .collect();

    drop(pipeline);
    let _ = printer.join();

    for line in &report {
        tracing::info!("  {}", line);
    }
    for entry in store.schema() {
        tracing::info!(
            "  {}: {} x{} tuples ({} component{})",
            entry.path,
            entry.scalar_type,
            entry.tuples,
            entry.components,
            if entry.components == 1 { "" } else { "s" }
        );
    }

    outcome.map_err(|e| anyhow::anyhow!("pipeline failed with code {}: {}", e.code(), e))
}
