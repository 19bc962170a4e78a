// Main entry point for Stolypote
// Uses clap for argument parsing; everything but the listen address is fixed

use clap::{crate_version, Arg, Command};
use stolypote::config::{bind_target, HoneypotPaths, DEFAULT_LISTEN};
use stolypote::engine::{serve, HoneypotEngine};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = Command::new("stolypote")
        .version(crate_version!())
        .about("HTTP honeypot that records requests and builds wordlists from them")
        .after_help("EXAMPLES:\n  stolypote\n  stolypote --listen 127.0.0.1:8080\n  stolypote --listen :8080\n\nPATHS (fixed):\n  /app/wordlists            wordlists (*-honeypot.txt)\n  /app/wordlists/dump/http  per-request JSON captures\n  /app/responses            decoy payloads\n  /app/config/responses.txt decoy mapping (key = file)")
        .arg(Arg::new("listen")
            .short('l')
            .long("listen")
            .num_args(1)
            .default_value(DEFAULT_LISTEN)
            .help("Listening address"))
        .get_matches();

    let listen = matches
        .get_one::<String>("listen")
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_LISTEN);

    let paths = HoneypotPaths::default();
    paths.ensure_directories()?;

    let engine = Arc::new(HoneypotEngine::from_paths(&paths));
    let listener = TcpListener::bind(bind_target(listen).as_str()).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "starting honeypot");

    tokio::select! {
        res = serve(listener, engine) => {
            if let Err(e) = res {
                error!(%e, "honeypot server failed");
                return Err(e.into());
            }
        }
        _ = signal::ctrl_c() => {
            info!("shutting down");
        }
    }

    Ok(())
}
