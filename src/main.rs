use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod api;
mod config;
mod error;
mod http;
mod logger;
mod models;
mod server;
mod services;
mod store;

use config::{AppState, Config};
use store::Records;

#[derive(Parser, Debug)]
#[command(name = "gig-market")]
#[command(about = "HTTP API for a freelance gig marketplace")]
struct Args {
    /// Path to config file, without the .toml extension
    #[arg(short, long, env = "GIGS_CONFIG", default_value = "config")]
    config: String,

    /// Listen port, overriding server.port
    #[arg(long)]
    port: Option<u16>,

    /// Persist records with sled at this path
    #[arg(long)]
    store_path: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let cfg = Config::load_from(&args.config)?.with_overrides(args.port, args.store_path);
    logger::init(&cfg)?;

    // Size the runtime from `server.workers` when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let records = Records::new(store::open(&cfg.store)?);
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg);
    let state = Arc::new(AppState::new(cfg, records));
    server::start_signal_handler(Arc::clone(&state.shutdown_signal))?;

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local.run_until(server::start_server_loop(listener, state)).await;
    // Let in-flight connections finish before the store is dropped
    local.await;
    Ok(())
}
