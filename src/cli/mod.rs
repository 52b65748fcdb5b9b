//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Resolve configuration into an explicit [`Context`]
//! - Initialize logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers in [`commands`] open and lock the
//! repository through [`crate::core::repo`] and use the metadata records
//! in [`crate::core::metadata`]; they never touch files directly.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::{Context as _, Result};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::core::config::{CliOverrides, Config, EnvVars, Settings};
use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Everything a handler needs from flags, config and environment.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved settings (repository path, owner fallback, network, debug).
    pub settings: Settings,
    /// Output mode.
    pub verbosity: Verbosity,
}

impl Context {
    /// Build a context from parsed flags, the loaded config and the environment.
    pub fn from_cli(cli: &Cli, config: &Config, env: &EnvVars) -> Result<Self> {
        let overrides = CliOverrides {
            repo: cli.repo.clone(),
            testnet: cli.testnet,
            debug: cli.debug,
        };
        let settings = config
            .resolve(&overrides, env)
            .context("Failed to resolve configuration")?;

        Ok(Self {
            settings,
            verbosity: Verbosity::from_flags(cli.quiet, cli.json),
        })
    }
}

/// Handle for raising the log level once the config file has been read.
pub type LogHandle = reload::Handle<EnvFilter, Registry>;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let log = init_tracing(cli.debug)?;
    let env = EnvVars::from_process();

    let config = Config::load(&env).context("Failed to load configuration")?;
    let ctx = Context::from_cli(&cli, &config, &env)?;
    if ctx.settings.debug && !cli.debug {
        log.reload(log_filter(true))
            .context("Failed to raise log level")?;
    }

    tracing::debug!(
        repo = %ctx.settings.repo_path.display(),
        network = %ctx.settings.network,
        config = ?config.loaded_from(),
        "resolved settings"
    );

    commands::dispatch(cli.command, &ctx)
}

/// Initialize the tracing subscriber.
///
/// Logs go to stderr so they never mix with command results. `RUST_LOG`
/// is honoured; without it the level is `warn`, or `debug` with `--debug`.
/// Runs before the config file is read so loading is logged too.
pub fn init_tracing(debug: bool) -> Result<LogHandle> {
    let (filter, handle) = reload::Layer::new(log_filter(debug));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))?;

    Ok(handle)
}

fn log_filter(debug: bool) -> EnvFilter {
    let default_level = if debug { Level::DEBUG } else { Level::WARN };
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}
