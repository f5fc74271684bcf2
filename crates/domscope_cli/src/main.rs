//! domscope CLI
//!
//! Locates a DOM node in an rrweb session recording by numeric id or content
//! token and prints its ancestry path and sibling context.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Parser, Subcommand};
use color_eyre::Result;
use console::style;
use domscope_event::{EventKind, Recording};
use domscope_replay::{BuildConfig, InspectReport, Query, RegistryBuilder, ResolveOutcome};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "domscope")]
#[command(about = "Find DOM nodes in rrweb session recordings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a node by id or content token and print its context
    Find {
        /// Path to the recording (.json or .json.gz)
        recording: PathBuf,
        /// Node id or text token to look for
        query: String,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
        /// Replay at most this many events (0 = all)
        #[arg(long, default_value_t = 0)]
        max_events: usize,
    },
    /// Print recording and registry statistics
    Stats {
        /// Path to the recording (.json or .json.gz)
        recording: PathBuf,
        /// Emit the stats as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Find {
            recording,
            query,
            json,
            max_events,
        } => {
            let report = build_report(&recording, &query, max_events)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Stats { recording, json } => {
            let stats = build_stats(&recording)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }
    }
    Ok(())
}

fn build_report(path: &Path, raw_query: &str, max_events: usize) -> Result<InspectReport> {
    let recording = Recording::load(path)?;
    let registry = RegistryBuilder::new()
        .with_config(BuildConfig { max_events })
        .build(recording.events());
    let query = Query::parse(raw_query);
    Ok(InspectReport::build(recording.events(), query, &registry))
}

fn print_report(report: &InspectReport) {
    println!("Mapped nodes: {}", report.registry_size);
    if report.build_stats.nodes_skipped > 0 {
        println!(
            "Skipped items during replay: {}",
            report.build_stats.nodes_skipped
        );
    }

    match &report.outcome {
        ResolveOutcome::NoMatch => {
            println!("No event matched that token or id.");
            return;
        }
        ResolveOutcome::SnapshotOnly(id) => {
            println!("No event matched, but node {} exists in the snapshot map.", id);
        }
        ResolveOutcome::Unextracted | ResolveOutcome::Resolved(_) => {
            println!(
                "Matching events: {}",
                format_indices(&report.matched_indices)
            );
        }
    }

    if let (Some(first), Some(event)) = (report.matched_indices.first(), &report.matched_event) {
        println!();
        println!("{}", style(format!("== Matched event (index {})", first)).bold());
        println!("{}", event);
    }

    if report.outcome == ResolveOutcome::Unextracted {
        println!();
        println!("Could not extract a node id from the matched event.");
        return;
    }

    let Some(target) = &report.target else { return };
    println!();
    println!("Target node id: {}", style(target.id).bold());

    if !target.known {
        println!(
            "Id {} is not in the snapshot map. It may have been created after the last full snapshot.",
            target.id
        );
        return;
    }

    println!();
    println!("{}", style("=== Target node ===").bold());
    if let Some(summary) = &target.summary {
        println!("{}", summary);
    }

    println!();
    println!("Suggested DOM path:");
    match &target.dom_path {
        Some(path) => println!("{}", path),
        None => println!("(could not build a path)"),
    }

    println!();
    println!("{}", style("=== Ancestor chain (root to node) ===").bold());
    for line in &target.ancestors {
        println!(" - {}", line);
    }

    if !target.children.is_empty() {
        println!();
        println!("{}", style("=== Direct children ===").bold());
        for line in &target.children {
            println!(" - {}", line);
        }
    }
}

fn format_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, serde::Serialize)]
struct RecordingStats {
    events: usize,
    undecodable_items: usize,
    full_snapshots: usize,
    incremental: usize,
    other: usize,
    registry_size: usize,
    build: domscope_replay::BuildStats,
}

fn build_stats(path: &Path) -> Result<RecordingStats> {
    let recording = Recording::load(path)?;
    let registry = RegistryBuilder::new().build(recording.events());

    let mut full_snapshots = 0;
    let mut incremental = 0;
    let mut other = 0;
    for event in recording.events() {
        match event.kind() {
            EventKind::FullSnapshot => full_snapshots += 1,
            EventKind::Incremental => incremental += 1,
            EventKind::Other => other += 1,
        }
    }

    Ok(RecordingStats {
        events: recording.len(),
        undecodable_items: recording.skipped(),
        full_snapshots,
        incremental,
        other,
        registry_size: registry.len(),
        build: registry.stats().clone(),
    })
}

fn print_stats(stats: &RecordingStats) {
    println!("Events:          {}", stats.events);
    if stats.undecodable_items > 0 {
        println!("Undecodable:     {}", stats.undecodable_items);
    }
    println!("Full snapshots:  {}", stats.full_snapshots);
    println!("Incremental:     {}", stats.incremental);
    println!("Other:           {}", stats.other);
    println!("Mapped nodes:    {}", stats.registry_size);
    println!(
        "Replay skips:    {} items, {} events",
        stats.build.nodes_skipped, stats.build.events_skipped
    );
}
