//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, Context};
use hecate::output::OutputConfig;

/// Hecate - select the backend apps behind the reverse proxy and keep its
/// configuration backed up
#[derive(Parser, Debug)]
#[command(name = "hecate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Project directory holding the compose file, conf.d and certs
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Path to the configuration file (default: hecate.yaml in the project directory)
    #[arg(short, long, global = true, value_name = "FILE", env = "HECATE_CONFIG")]
    config: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the applications that can be enabled
    Apps(commands::apps::AppsArgs),

    /// Uncomment the selected applications in the compose file
    Compose(commands::compose::ComposeArgs),

    /// Remove server configs of applications that are not selected
    Prune(commands::prune::PruneArgs),

    /// Fill ${PLACEHOLDER} values into the tracked config files
    Substitute(commands::substitute::SubstituteArgs),

    /// Snapshot the compose file, conf.d and certs
    Backup(commands::backup::BackupArgs),

    /// Restore the compose file, conf.d or certs from a snapshot
    Restore(commands::restore::RestoreArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logger(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);
        let ctx = Context::load(&self.dir, self.config.as_deref(), output)?;

        match self.command {
            Commands::Apps(args) => commands::apps::execute(args, &ctx),
            Commands::Compose(args) => commands::compose::execute(args, &ctx),
            Commands::Prune(args) => commands::prune::execute(args, &ctx),
            Commands::Substitute(args) => commands::substitute::execute(args, &ctx),
            Commands::Backup(args) => commands::backup::execute(args, &ctx),
            Commands::Restore(args) => commands::restore::execute(args, &ctx),
        }
    }
}

/// Log to stderr at `level`; `RUST_LOG` overrides it.
fn init_logger(level: &str) {
    let level = level.parse().unwrap_or(log::LevelFilter::Warn);
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .try_init();
}
