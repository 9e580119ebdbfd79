//! Binary entry point: resolve configuration, start logging and the request
//! runtime, then drive the Ratatui event loop until the user exits.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Builder;
use tracing::{error, info};

use regatta_admin::{logging, run_app, ApiClient, App, Config, Overrides, Route};

/// Terminal admin client for regatta athletes and events.
#[derive(Debug, Parser)]
#[command(name = "regatta-admin", version, about)]
struct Cli {
    /// Base URL of the regatta API
    #[arg(long, env = "REGATTA_API_URL")]
    api_url: Option<String>,

    /// Config file to read instead of ~/.regatta-admin/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// View to open on start: /, /athletes or /events
    #[arg(long, default_value = "/")]
    route: Route,

    /// Log filter, e.g. info or regatta_admin=debug
    #[arg(long, env = "REGATTA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "REGATTA_REQUEST_TIMEOUT", value_name = "SECS")]
    request_timeout: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(
        cli.config.as_deref(),
        Overrides {
            api_url: cli.api_url,
            request_timeout_secs: cli.request_timeout,
            log_level: cli.log_level,
        },
    )?;

    let log_file = logging::init(&config.log_level)?;
    info!(route = %cli.route, log_file = %log_file.display(), "starting regatta admin");

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the request runtime")?;
    let client = ApiClient::new(config.api_url()?, config.request_timeout())?;
    info!(base_url = %client.base_url(), "api client ready");

    let mut app = App::new(client, runtime.handle().clone(), cli.route);
    let result = run_app(&mut app);
    if let Err(err) = &result {
        error!(error = %err, "terminal session ended with an error");
    }
    info!("exiting");
    result
}
