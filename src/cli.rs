//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, Globals};
use mu::config;
use mu::output::OutputConfig;
use mu::provider::LocalStackManager;

/// mu - Manage environments and services as provider stacks
#[derive(Parser, Debug)]
#[command(name = "mu")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the mu.yml configuration file
    #[arg(short, long, global = true, value_name = "FILE", env = "MU_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding local stack state (defaults to ~/.mu/stacks)
    #[arg(long, global = true, value_name = "DIR", env = "MU_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage environments: a network plus a container cluster
    #[command(alias = "env")]
    Environment(commands::environment::EnvironmentArgs),

    /// Deploy, undeploy and inspect the repository's service
    #[command(alias = "svc")]
    Service(commands::service::ServiceArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        let globals = Globals {
            config_path: config::resolve_path(self.config),
            state_dir: self
                .state_dir
                .unwrap_or_else(LocalStackManager::default_state_dir),
            output,
        };

        match self.command {
            Commands::Environment(args) => commands::environment::execute(args, &globals),
            Commands::Service(args) => commands::service::execute(args, &globals),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// `RUST_LOG` overrides `--log-level` when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
