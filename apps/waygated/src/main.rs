use std::{path::PathBuf, sync::Arc, time::Duration};

use {
    clap::Parser,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    waygate_outbound::Dispatcher,
    waygate_session::{RetryPolicy, SessionRegistry},
    waygate_transport::{FsCredentialStore, dev::DevTransportFactory},
};

#[derive(Parser)]
#[command(name = "waygated", about = "Waygate — multi-session messaging gateway")]
struct Cli {
    /// Path to a config file (waygate.toml / waygate.json). Discovered in
    /// standard locations when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the configured port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the credential directory.
    #[arg(long)]
    auth_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let mut config = match &cli.config {
        Some(path) => waygate_config::load_config(path)?,
        None => waygate_config::discover_and_load(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(auth_dir) = cli.auth_dir {
        config.sessions.auth_dir = Some(auth_dir);
    }

    let auth_dir = config
        .sessions
        .auth_dir
        .clone()
        .unwrap_or_else(|| waygate_config::data_dir().join("auth_sessions"));
    info!(auth_dir = %auth_dir.display(), "credential store ready");

    let factory = Arc::new(DevTransportFactory::new(Duration::from_millis(
        config.transport.pairing_scan_delay_ms,
    )));
    let credentials = Arc::new(FsCredentialStore::new(auth_dir));
    let policy = RetryPolicy {
        max_retries: config.sessions.max_retries,
        delay: Duration::from_millis(config.sessions.retry_delay_ms),
    };

    let registry = SessionRegistry::new(factory, credentials, policy);
    let dispatcher = Arc::new(Dispatcher::new(registry.clone()));

    waygate_gateway::start(
        &config.server.bind,
        config.server.port,
        registry,
        dispatcher,
    )
    .await
}
