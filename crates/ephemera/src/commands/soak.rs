//! Soak command - concurrent create/update/read against one store.

use std::time::Instant;

use anyhow::{Context as _, Result, bail};
use clap::Args;
use console::{Style, style};
use ephemera_session::{SessionData, SessionStore, StoreStats};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use super::Context;

/// Arguments for the soak command.
#[derive(Args, Debug)]
pub struct SoakArgs {
    /// Number of concurrent workers, each owning one session
    #[arg(short, long, default_value_t = 32)]
    pub workers: usize,

    /// Updates performed by each worker
    #[arg(short, long, default_value_t = 100)]
    pub rounds: usize,

    /// Idle timeout in milliseconds (overrides config)
    #[arg(long)]
    pub idle_ms: Option<u64>,

    /// Reclamation interval in milliseconds (overrides config)
    #[arg(long)]
    pub reclaim_ms: Option<u64>,
}

/// Store statistics for JSON output.
#[derive(Debug, Serialize)]
struct StatsOutput {
    live: usize,
    created: u64,
    updated: u64,
    removed: u64,
    reclaimed: u64,
}

impl From<StoreStats> for StatsOutput {
    fn from(stats: StoreStats) -> Self {
        Self {
            live: stats.live,
            created: stats.created,
            updated: stats.updated,
            removed: stats.removed,
            reclaimed: stats.reclaimed,
        }
    }
}

/// Soak result for JSON output.
#[derive(Debug, Serialize)]
struct SoakOutput {
    workers: usize,
    rounds: usize,
    elapsed_ms: u64,
    mismatches: usize,
    stats: StatsOutput,
}

/// Run the soak command.
pub async fn run(args: SoakArgs, ctx: &Context) -> Result<()> {
    if args.workers == 0 {
        bail!("--workers must be at least 1");
    }

    let config = ctx.store_config(args.idle_ms, args.reclaim_ms)?;
    let store = SessionStore::with_cancellation(config, &ctx.shutdown)?;

    info!(workers = args.workers, rounds = args.rounds, "Starting soak run");
    let started = Instant::now();

    let mut tasks = Vec::with_capacity(args.workers);
    for worker in 0..args.workers {
        let store = store.clone();
        let rounds = args.rounds;
        tasks.push(tokio::spawn(async move {
            let id = store.create_session()?;
            let mut last = SessionData::new();
            for round in 0..rounds {
                let mut data = SessionData::new();
                data.insert("worker".to_string(), json!(worker));
                data.insert("round".to_string(), json!(round));
                store.update(&id, data.clone())?;
                last = data;
                tokio::task::yield_now().await;
            }
            Ok::<_, ephemera_session::Error>((id, last))
        }));
    }

    let mut mismatches = 0;
    for (worker, task) in tasks.into_iter().enumerate() {
        let (id, expected) = task
            .await
            .with_context(|| format!("worker {worker} panicked"))??;
        let actual = store.get(&id)?;
        if actual != expected {
            debug!(worker, "Final session state does not match last write");
            mismatches += 1;
        }
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    let stats = store.stats();
    store.shutdown().await;

    if ctx.json_output {
        let output = SoakOutput {
            workers: args.workers,
            rounds: args.rounds,
            elapsed_ms,
            mismatches,
            stats: stats.into(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let dim = Style::new().dim();
        let green = Style::new().green();
        let red = Style::new().red();

        println!();
        println!("{}", style("Soak Run").bold());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!();
        println!("  {} {}", dim.apply_to("Workers:"), args.workers);
        println!("  {} {}", dim.apply_to("Rounds:"), args.rounds);
        println!("  {} {}ms", dim.apply_to("Elapsed:"), elapsed_ms);
        println!("  {} {}", dim.apply_to("Live:"), stats.live);
        println!("  {} {}", dim.apply_to("Created:"), stats.created);
        println!("  {} {}", dim.apply_to("Updated:"), stats.updated);
        println!("  {} {}", dim.apply_to("Reclaimed:"), stats.reclaimed);
        if mismatches == 0 {
            println!("  {} {}", dim.apply_to("Result:"), green.apply_to("● consistent"));
        } else {
            println!(
                "  {} {}",
                dim.apply_to("Result:"),
                red.apply_to(format!("● {mismatches} mismatched sessions"))
            );
        }
        println!();
    }

    if mismatches > 0 {
        bail!("{mismatches} sessions lost their last write");
    }

    Ok(())
}
