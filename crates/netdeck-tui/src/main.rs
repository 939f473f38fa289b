//! `netdeck` — terminal dashboard for GNS3 network labs.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive data from
//! `netdeck-core`'s [`EntityStream`](netdeck_core::EntityStream). Screens
//! are navigable via number keys (1-5): Dashboard, Topology, Policies,
//! SLA, and Security.
//!
//! Logs are written to a file (default `/tmp/netdeck.log`) to avoid
//! corrupting the terminal UI. A background data bridge task continuously
//! streams entity updates from the controller into the TUI action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use secrecy::SecretString;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use netdeck_core::{AuthCredentials, Controller, ControllerConfig, TlsVerification};

use crate::app::App;

/// Terminal dashboard for monitoring and editing GNS3 network labs.
#[derive(Parser, Debug)]
#[command(name = "netdeck", version, about)]
struct Cli {
    /// Named profile from the config file (defaults to the active profile)
    #[arg(short, long, env = "NETDECK_PROFILE")]
    profile: Option<String>,

    /// Lab server URL (e.g., http://127.0.0.1:3080); overrides the profile
    #[arg(short = 'u', long, env = "NETDECK_SERVER")]
    server: Option<String>,

    /// Dashboard service URL (e.g., http://127.0.0.1:4000)
    #[arg(short = 'd', long, env = "NETDECK_DASHBOARD")]
    dashboard: Option<String>,

    /// API key (prefer the OS keyring; see `netdeck-config`)
    #[arg(short = 'k', long, env = "NETDECK_API_KEY")]
    api_key: Option<String>,

    /// Accept invalid TLS certificates (self-signed lab servers)
    #[arg(long)]
    insecure: bool,

    /// Refresh interval in seconds, clamped to 1-30
    #[arg(short = 'r', long)]
    refresh_interval: Option<u64>,

    /// Log file path
    #[arg(long, default_value = "/tmp/netdeck.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "netdeck={log_level},netdeck_core={log_level},netdeck_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("netdeck.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Build a [`Controller`] from CLI flags, if both URLs were provided.
fn build_controller_from_cli(cli: &Cli) -> Result<Option<Controller>> {
    let (Some(server), Some(dashboard)) = (cli.server.as_deref(), cli.dashboard.as_deref())
    else {
        return Ok(None);
    };
    let lab_url: Url = server.parse()?;
    let dashboard_url: Url = dashboard.parse()?;

    let mut config = ControllerConfig::new(lab_url, dashboard_url);
    if let Some(ref key) = cli.api_key {
        config.auth = AuthCredentials::ApiKey(SecretString::from(key.clone()));
    }
    if cli.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = cli.refresh_interval {
        config.refresh_interval_secs = secs;
    }
    Ok(Some(Controller::new(config)))
}

/// Build a [`Controller`] from the config file profile.
fn build_controller_from_profile(
    cli: &Cli,
    config: &netdeck_config::Config,
) -> Option<Controller> {
    let (name, profile) = match cli.profile.as_deref() {
        Some(name) => config.profiles.get(name).map(|p| (name, p))?,
        None => config.active_profile()?,
    };

    let lab_url: Url = match profile.server.parse() {
        Ok(url) => url,
        Err(e) => {
            warn!(profile = name, error = %e, "invalid server URL in profile");
            return None;
        }
    };
    let dashboard_url: Url = match profile.dashboard.parse() {
        Ok(url) => url,
        Err(e) => {
            warn!(profile = name, error = %e, "invalid dashboard URL in profile");
            return None;
        }
    };

    let mut controller_config = ControllerConfig::new(lab_url, dashboard_url);
    match netdeck_config::resolve_api_key(profile, name) {
        Ok(key) => controller_config.auth = AuthCredentials::ApiKey(key),
        Err(netdeck_config::ConfigError::MissingApiKey { .. }) => {
            // Local lab servers commonly run without auth.
        }
        Err(e) => {
            warn!(profile = name, error = %e, "failed to resolve API key");
        }
    }
    if profile.insecure.unwrap_or(false) || cli.insecure {
        controller_config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = cli.refresh_interval.or(profile.refresh_interval_secs) {
        controller_config.refresh_interval_secs = secs;
    }

    Some(Controller::new(controller_config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let config = match netdeck_config::load_config_or_default() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "failed to load config; using defaults");
            netdeck_config::Config::default()
        }
    };

    info!(
        server = cli.server.as_deref().unwrap_or("(from profile)"),
        profile = cli.profile.as_deref().unwrap_or("(active)"),
        "starting netdeck"
    );

    // Priority: CLI flags > config file profile
    let controller = match build_controller_from_cli(&cli)? {
        Some(controller) => Some(controller),
        None => build_controller_from_profile(&cli, &config),
    };

    let mut app = App::new(controller, config);
    app.run().await?;

    Ok(())
}
