//! vsm-send: deliver one signal to a running `vsm` over the socket backend.
//!
//! ```text
//! vsm-send car.damage true
//! vsm-send car.moving
//! vsm-send quit
//! ```

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use vsm_core::config::load_dotenv;
use vsm_core::Value;
use vsm_transport::{Endpoint, SignalSender, TransportConfig};

/// Send one signal to the dispatcher's listen endpoint and wait for the
/// acknowledgement.
#[derive(Parser, Debug)]
#[command(name = "vsm-send", version, about)]
struct Cli {
    /// Signal name.
    name: String,

    /// Value to assign. Omit to send a bare trigger.
    value: Option<String>,

    /// Endpoint to send to (ipc://<path> or tcp://<host>:<port>). Defaults to
    /// the transport config's listen endpoint.
    #[arg(long, env = "VSM_SEND_ENDPOINT")]
    endpoint: Option<String>,

    /// Transport configuration file (TOML).
    #[arg(long, env = "VSM_TRANSPORT_CONFIG")]
    transport_config: Option<std::path::PathBuf>,

    /// Acknowledgement timeout in milliseconds. 0 waits forever.
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let endpoint: Endpoint = match &cli.endpoint {
        Some(e) => e.parse()?,
        None => {
            let config = match &cli.transport_config {
                Some(path) => TransportConfig::from_file(path)?,
                None => TransportConfig::from_env()?,
            };
            config.zeromq.listen_endpoint()?
        }
    };
    let value = cli
        .value
        .as_deref()
        .map(|raw| Value::coerce(raw.trim()))
        .unwrap_or_default();
    let timeout = (cli.timeout_ms > 0).then(|| Duration::from_millis(cli.timeout_ms));

    let mut sender = SignalSender::connect(&endpoint, timeout)
        .await
        .with_context(|| format!("connecting to {endpoint}"))?;
    sender
        .send_signal(&cli.name, &value)
        .await
        .with_context(|| format!("sending {} to {endpoint}", cli.name))?;

    info!(signal = %cli.name, value = %value, endpoint = %endpoint, "signal acknowledged");
    Ok(())
}
