//! Trace-driven cache replacement simulator CLI.
//!
//! Replays an address trace through one configured cache and prints the resulting
//! statistics as JSON. Configuration comes from an optional JSON file; individual fields
//! can be overridden on the command line.

mod trace;

use std::{fs, process};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use ipvsim_core::config::{CacheConfig, ReplacementPolicy as PolicyType};
use ipvsim_core::CacheSim;

use crate::trace::TraceOp;

#[derive(Parser, Debug)]
#[command(
    name = "ipvsim",
    author,
    version,
    about = "Trace-driven cache replacement simulator",
    long_about = "Replay an address trace through a set-associative cache.\n\nExamples:\n  ipvsim run --trace mcf.trace\n  ipvsim run --trace mcf.trace --ways 4 --ipv 0,0,1,2,3\n  ipvsim run --trace mcf.trace --config l2.json --policy lru"
)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace and print statistics as JSON.
    Run {
        /// Trace file (`R|W|I <addr>` per line).
        #[arg(short, long)]
        trace: String,

        /// JSON cache configuration.
        #[arg(short, long)]
        config: Option<String>,

        /// Override associativity.
        #[arg(long)]
        ways: Option<usize>,

        /// Override replacement policy (lru-ipv, lru, fifo, random).
        #[arg(long)]
        policy: Option<String>,

        /// Override promotion vector, comma separated (`ways + 1` entries).
        #[arg(long, value_delimiter = ',')]
        ipv: Option<Vec<usize>>,

        /// Write-back penalty charged per dirty eviction, in cycles.
        #[arg(long, default_value_t = 100)]
        next_level_latency: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            trace,
            config,
            ways,
            policy,
            ipv,
            next_level_latency,
        } => {
            if let Err(e) = cmd_run(
                &trace,
                config.as_deref(),
                ways,
                policy.as_deref(),
                ipv,
                next_level_latency,
            ) {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}

fn parse_policy(name: &str) -> Result<PolicyType, String> {
    match name.to_ascii_lowercase().as_str() {
        "lru-ipv" | "lru_ipv" | "lruipv" => Ok(PolicyType::LruIpv),
        "lru" => Ok(PolicyType::Lru),
        "fifo" => Ok(PolicyType::Fifo),
        "random" => Ok(PolicyType::Random),
        other => Err(format!("unknown policy '{other}'")),
    }
}

/// Layers command-line overrides on top of a loaded configuration.
///
/// A promotion vector given on the command line is only meaningful for the LRU-IPV
/// policy, so pairing it with any other policy is rejected.
fn apply_overrides(
    mut config: CacheConfig,
    ways: Option<usize>,
    policy: Option<&str>,
    ipv: Option<Vec<usize>>,
) -> Result<CacheConfig, String> {
    if let Some(ways) = ways {
        config.ways = ways;
    }
    if let Some(name) = policy {
        config.policy = parse_policy(name)?;
    }
    if ipv.is_some() {
        if config.policy != PolicyType::LruIpv {
            return Err(format!(
                "--ipv only applies to the lru-ipv policy, not {:?}",
                config.policy
            ));
        }
        config.ipv = ipv;
    }
    Ok(config)
}

/// Builds the cache, replays the trace, and prints statistics.
fn cmd_run(
    trace_path: &str,
    config_path: Option<&str>,
    ways: Option<usize>,
    policy: Option<&str>,
    ipv: Option<Vec<usize>>,
    next_level_latency: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = match config_path {
        Some(path) => CacheConfig::from_json(&fs::read_to_string(path)?)?,
        None => CacheConfig::default(),
    };
    let config = apply_overrides(base, ways, policy, ipv)?;

    let ops = trace::parse(&fs::read_to_string(trace_path)?)?;
    let mut cache = CacheSim::new(&config)?;
    info!(
        trace = trace_path,
        ops = ops.len(),
        sets = cache.num_sets(),
        ways = cache.ways(),
        "replaying trace"
    );

    for op in ops {
        match op {
            TraceOp::Read(addr) => {
                let _ = cache.access(addr, false, next_level_latency)?;
            }
            TraceOp::Write(addr) => {
                let _ = cache.access(addr, true, next_level_latency)?;
            }
            TraceOp::Invalidate(addr) => {
                let _ = cache.invalidate(addr)?;
            }
        }
    }

    let stats = cache.stats();
    info!(hit_rate = stats.hit_rate(), "replay finished");
    println!("{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}
