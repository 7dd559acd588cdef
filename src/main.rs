//! Community detection CLI.
//!
//! Loads a tab-separated edge list, runs parallel label propagation to
//! convergence, and writes the membership file plus its densely renumbered
//! counterpart. Exits non-zero on any parse or I/O failure.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};

use parlabel::{io, Graph, PassStats, Propagation};

/// Parallel label propagation community detection.
#[derive(Parser)]
#[command(name = "parlabel", about = "Parallel label propagation community detection")]
struct Cli {
    /// Edge list file: one "a<TAB>b" edge per line, 1-based node ids.
    #[arg(long)]
    edges: PathBuf,

    /// Number of nodes in the network (ids run 1..=num-nodes).
    #[arg(long)]
    num_nodes: u32,

    /// Worker pool size; also the batch width.
    #[arg(long, default_value_t = 8)]
    threads: usize,

    /// Seed for the per-pass shuffle (random when omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Cap on passes (default: run until a pass changes nothing).
    #[arg(long)]
    max_passes: Option<usize>,

    /// Membership file to load as the starting assignment instead of
    /// singleton labels.
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Output membership file.
    #[arg(long, default_value = "membership.txt")]
    membership: PathBuf,

    /// Output renumbered membership file.
    #[arg(long, default_value = "membership_renumbered.txt")]
    renumbered: PathBuf,
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        error!("{err}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> parlabel::Result<()> {
    let start = Instant::now();

    let edges = io::read_edge_list(&cli.edges)?;
    info!(edges = edges.len(), "edge list read");

    let graph = Graph::build(cli.num_nodes, &edges)?;
    info!(nodes = cli.num_nodes, "graph built");

    if let Some(path) = &cli.resume {
        io::read_membership(path, &graph)?;
        info!(file = %path.display(), "memberships loaded");
    }

    let mut propagation = Propagation::new().with_threads(cli.threads);
    if let Some(seed) = cli.seed {
        propagation = propagation.with_seed(seed);
    }
    if let Some(cap) = cli.max_passes {
        propagation = propagation.with_max_passes(cap);
    }

    let summary = propagation.run_with_observer(&graph, |stats: &PassStats| {
        info!(
            pass = stats.pass,
            changed_nodes = stats.changed_nodes,
            changed_batches = stats.changed_batches,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "pass complete"
        );
    })?;
    if summary.converged {
        info!(passes = summary.passes, "detection complete");
    } else {
        info!(passes = summary.passes, "stopped at pass cap before convergence");
    }

    io::write_membership(&cli.membership, &graph)?;
    info!(file = %cli.membership.display(), "membership written");

    let communities = io::write_renumbered(&cli.renumbered, &graph)?;
    info!(
        communities,
        file = %cli.renumbered.display(),
        "renumbered membership written"
    );

    info!(elapsed_ms = start.elapsed().as_millis() as u64, "done");
    Ok(())
}
