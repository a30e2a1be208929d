//! Compares the online engine with the offline optimum on one instance.
//!
//! ```text
//! competitive_ratio example
//! competitive_ratio nested --pages 3 --base 2 --branching 3 --capacity 2 --set 5=1
//! competitive_ratio --reduction interval file instance.json
//! ```
//!
//! `RUST_LOG` controls diagnostics (default `warn`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use varpage::config::{Reduction, SolverConfig};
use varpage::engine::OnlineEngine;
use varpage::flow::dot::render_dot;
use varpage::generator::nested_sequence;
use varpage::model::{CacheState, CapacitySchedule, Page, Request};
use varpage::offline::OfflineSolver;

#[derive(Parser, Debug)]
#[command(author, version, about = "Online vs. offline cost for variable-capacity weighted paging")]
struct Args {
    /// Flow reduction used by the offline solver
    #[arg(long, global = true)]
    reduction: Option<Reduction>,

    /// Floor for the reward constant on mandatory edges
    #[arg(long, global = true)]
    min_reward: Option<f64>,

    /// Write the solved offline network as Graphviz DOT
    #[arg(long, global = true)]
    dot: Option<PathBuf>,

    /// Print the cache state after every step
    #[arg(long, global = true)]
    history: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Four weighted pages, six requests, capacity dropping to 1 at step 3
    Example,
    /// Nested adversarial sequence
    Nested {
        #[arg(long, default_value_t = 3)]
        pages: usize,
        #[arg(long, default_value_t = 2.0)]
        base: f64,
        #[arg(long, default_value_t = 2)]
        branching: usize,
        /// Capacity for every step without an override
        #[arg(long, default_value_t = 1)]
        capacity: usize,
        /// Per-step override, `STEP=CAPACITY`
        #[arg(long = "set", value_parser = parse_override)]
        overrides: Vec<(usize, usize)>,
    },
    /// JSON instance file
    File { path: PathBuf },
}

#[derive(Debug, Deserialize)]
struct PageSpec {
    id: String,
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct Instance {
    pages: Vec<PageSpec>,
    sequence: Vec<String>,
    #[serde(default)]
    capacities: CapacitySchedule,
    #[serde(default)]
    solver: Option<SolverConfig>,
}

fn parse_override(s: &str) -> Result<(usize, usize), String> {
    let (step, capacity) = s
        .split_once('=')
        .ok_or_else(|| format!("expected STEP=CAPACITY, got {s:?}"))?;
    let step = step.trim().parse::<usize>().map_err(|e| format!("step {step:?}: {e}"))?;
    let capacity = capacity
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("capacity {capacity:?}: {e}"))?;
    Ok((step, capacity))
}

fn worked_example() -> (Vec<Request>, CapacitySchedule) {
    let a = Page::new("A", 1.0);
    let b = Page::new("B", 2.0);
    let c = Page::new("C", 10.0);
    let d = Page::new("D", 3.0);
    let requests = Request::sequence([a.clone(), b.clone(), c, a, d, b]);
    let capacities = [(1, 2), (2, 2), (3, 1), (4, 2), (5, 2), (6, 2)]
        .into_iter()
        .collect();
    (requests, capacities)
}

fn load_instance(path: &Path) -> Result<(Vec<Request>, CapacitySchedule, Option<SolverConfig>)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading instance {}", path.display()))?;
    let instance: Instance = serde_json::from_str(&text)
        .with_context(|| format!("parsing instance {}", path.display()))?;

    let mut pages = Vec::with_capacity(instance.pages.len());
    for entry in instance.pages {
        pages.push(Page::try_new(entry.id, entry.weight)?);
    }
    let mut sequence = Vec::with_capacity(instance.sequence.len());
    for id in &instance.sequence {
        match pages.iter().find(|p| p.id() == id) {
            Some(page) => sequence.push(page.clone()),
            None => bail!("sequence requests unknown page {id:?}"),
        }
    }
    Ok((Request::sequence(sequence), instance.capacities, instance.solver))
}

fn print_history(label: &str, states: &[CacheState]) {
    println!("{label}:");
    for state in states {
        println!("  {state}");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()?;

    let (requests, capacities, file_config) = match &args.command {
        Command::Example => {
            let (requests, capacities) = worked_example();
            (requests, capacities, None)
        },
        Command::Nested {
            pages,
            base,
            branching,
            capacity,
            overrides,
        } => {
            let (_, requests) = nested_sequence(*pages, *base, *branching)?;
            let mut capacities = CapacitySchedule::with_default(*capacity);
            for &(step, k) in overrides {
                capacities.set(step, k);
            }
            (requests, capacities, None)
        },
        Command::File { path } => load_instance(path)?,
    };

    let mut config = file_config.unwrap_or_default();
    if let Some(reduction) = args.reduction {
        config.reduction = reduction;
    }
    if let Some(min_reward) = args.min_reward {
        config.min_reward = min_reward;
    }
    info!(requests = requests.len(), reduction = %config.reduction, "running instance");

    let online = OnlineEngine::new(capacities.clone()).run(&requests);
    let offline = OfflineSolver::new(config).try_solve(&requests, &capacities)?;

    println!("requests: {}", requests.len());
    println!("online cost:  {}", online.total_cost);
    println!("offline cost: {}", offline.cost);
    if offline.cost > 0.0 {
        println!("ratio:        {:.4}", online.total_cost / offline.cost);
    } else {
        println!("ratio:        n/a");
    }

    if args.history {
        print_history("online", &online.history);
        print_history("offline", &offline.schedule);
    }

    if let Some(path) = &args.dot {
        if let (Some(network), Some(flow)) = (&offline.network, &offline.flow) {
            std::fs::write(path, render_dot(network, Some(flow)))
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote offline network");
        }
    }

    Ok(())
}
