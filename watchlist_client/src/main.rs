//! Watchlist: a terminal stock dashboard over a simulated market.
//!
//! Tracks a watchlist of symbols, keeps their quotes current from a push feed
//! ticking every few seconds, and shows details, a price chart and market
//! news for the selected symbol. Commands are typed on stdin (`help` lists
//! them).
//!
//! Usage example (CLI):
//! ```bash
//! watchlist --symbols AAPL,TSLA --select TSLA --range 3M
//! watchlist --watchlist-file ./watchlist.txt --once --json
//! ```
//!
//! Environment: `WATCHLIST_SYMBOLS`, `WATCHLIST_SELECTED`,
//! `WATCHLIST_TICK_MS`, `WATCHLIST_SIMULATE_LATENCY` and `RUST_LOG`; flags
//! take precedence.
#![warn(missing_docs)]
mod args;

use std::env;
use std::sync::Arc;

use clap::Parser;
use log::info;
use tokio::sync::Notify;
use watchlist_client::view::DEFAULT_WIDTH;
use watchlist_client::{Dashboard, DashboardOptions, Session};
use watchlist_common::{Config, Result, WatchError};

use crate::args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env()?;
    init_logger(&config.log_level);
    args.apply(&mut config)?;
    config.validate()?;
    config.log_config();

    let options = DashboardOptions {
        range: args.range,
        json: args.json,
        width: terminal_width(),
    };
    let session = Session::start(&config)?;
    let dashboard = Dashboard::new(session, options)?;

    if args.once {
        println!("{}", dashboard.render_once().await?);
        return Ok(());
    }

    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down dashboard...");
            shutdown.notify_one();
        })
        .map_err(|e| WatchError::Runtime(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    dashboard.run(shutdown).await?;
    info!("Bye");
    Ok(())
}

fn init_logger(filters: &str) {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_filters(filters)
        .init();
}

fn terminal_width() -> usize {
    env::var("COLUMNS")
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .filter(|width| *width > 0)
        .unwrap_or(DEFAULT_WIDTH)
}
