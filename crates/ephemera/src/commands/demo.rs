//! Demo command - walks one session through its whole lifecycle.

use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use clap::Args;
use console::{Style, style};
use ephemera_session::{SessionData, SessionStore};
use serde::Serialize;
use tracing::info;

use super::Context;

/// Arguments for the demo command.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Idle timeout in milliseconds (overrides config)
    #[arg(long)]
    pub idle_ms: Option<u64>,

    /// Reclamation interval in milliseconds (overrides config)
    #[arg(long)]
    pub reclaim_ms: Option<u64>,

    /// Key stored in the session
    #[arg(long, default_value = "website")]
    pub key: String,

    /// Value stored under the key
    #[arg(long, default_value = "longhoang.de")]
    pub value: String,
}

/// Demo result for JSON output.
#[derive(Debug, Serialize)]
struct DemoOutput {
    session_id: String,
    data: SessionData,
    waited_ms: u64,
    reclaimed: bool,
}

/// Run the demo command.
pub async fn run(args: DemoArgs, ctx: &Context) -> Result<()> {
    let config = ctx.store_config(args.idle_ms, args.reclaim_ms)?;
    let store = SessionStore::with_cancellation(config.clone(), &ctx.shutdown)?;

    let session_id = store.create_session()?;
    info!("Created new session");

    let mut data = SessionData::new();
    data.insert(args.key.clone(), serde_json::Value::String(args.value.clone()));
    store.update(&session_id, data)?;
    info!(key = %args.key, "Updated session data");

    let data = store.get(&session_id)?;

    // Past the idle timeout plus one full sweep, the session must be gone.
    let wait = config.idle_timeout + config.reclaim_interval + Duration::from_millis(10);
    let started = Instant::now();
    tokio::select! {
        _ = tokio::time::sleep(wait) => {}
        _ = ctx.shutdown.cancelled() => bail!("interrupted"),
    }
    let waited_ms = started.elapsed().as_millis() as u64;

    let reclaimed = match store.get(&session_id) {
        Ok(_) => false,
        Err(e) if e.is_not_found() => true,
        Err(e) => return Err(e.into()),
    };

    store.shutdown().await;

    if ctx.json_output {
        let output = DemoOutput {
            session_id,
            data,
            waited_ms,
            reclaimed,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let dim = Style::new().dim();
        let green = Style::new().green();
        let red = Style::new().red();

        println!();
        println!("{}", style("Session Lifecycle").bold());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!();
        println!("  {} {}", dim.apply_to("Session:"), session_id);
        println!(
            "  {} {}",
            dim.apply_to("Data:"),
            serde_json::to_string(&data)?
        );
        println!("  {} {}ms idle", dim.apply_to("Waited:"), waited_ms);
        if reclaimed {
            println!("  {} {}", dim.apply_to("Status:"), green.apply_to("● reclaimed"));
        } else {
            println!("  {} {}", dim.apply_to("Status:"), red.apply_to("● still live"));
        }
        println!();
    }

    if !reclaimed {
        bail!("session outlived its idle timeout");
    }

    Ok(())
}
