//! vsm: the vehicle signal manager.
//!
//! Seeds state from `--conf`, loads rules from `--rules`, opens the selected
//! transport and runs the dispatch loop until `quit`, end of input or Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use vsm_core::config::load_dotenv;
use vsm_core::InitialState;
use vsm_dispatcher::Dispatcher;
use vsm_rules::RuleIndex;
use vsm_transport::{Backend, TransportConfig};

// ── CLI ─────────────────────────────────────────────────────────────

/// Vehicle signal manager: evaluates rules against live signal state.
#[derive(Parser, Debug)]
#[command(name = "vsm", version, about)]
struct Cli {
    /// Initial state file with one name=value pair per line.
    #[arg(long, env = "VSM_CONF")]
    conf: PathBuf,

    /// Directory of rule definitions (*.yaml), one per trigger signal.
    #[arg(long, env = "VSM_RULES")]
    rules: PathBuf,

    /// Transport backend: line (stdio) or zeromq (zmq). Overrides the
    /// transport config.
    #[arg(long, env = "VSM_IPC_MODULE")]
    ipc_module: Option<String>,

    /// Transport configuration file (TOML).
    #[arg(long, env = "VSM_TRANSPORT_CONFIG")]
    transport_config: Option<PathBuf>,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    load_dotenv();

    // stdout carries the line protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            error!("vsm failed: {e:#}");
            1
        }
    };
    // A blocked stdin read would otherwise hold up runtime shutdown.
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = InitialState::from_file(&cli.conf)
        .with_context(|| format!("loading initial state from {}", cli.conf.display()))?
        .into_store();

    let rules = RuleIndex::load(&cli.rules)
        .with_context(|| format!("loading rules from {}", cli.rules.display()))?;
    info!(rules = rules.len(), dir = %cli.rules.display(), "rules loaded");

    let transport_config = match &cli.transport_config {
        Some(path) => TransportConfig::from_file(path)
            .with_context(|| format!("loading transport config from {}", path.display()))?,
        None => TransportConfig::from_env().context("reading transport config")?,
    };
    let backend: Backend = match &cli.ipc_module {
        Some(name) => name.parse()?,
        None => transport_config.backend()?,
    };

    let transport = vsm_transport::open(backend, &transport_config)
        .await
        .with_context(|| format!("opening {backend} transport"))?;

    let dispatcher = Dispatcher::new(transport, Arc::new(rules), state);
    let stats = dispatcher
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!(stats = %stats, "vsm exited cleanly");
    Ok(())
}
