//! # CLI Command Implementations
//!
//! One module per subcommand. Each holds a `clap` `Args` struct and an
//! `execute` function that loads the [`Context`] and runs a workflow from the
//! `mu` library.

pub mod completions;
pub mod environment;
pub mod service;

use std::path::{Path, PathBuf};

use anyhow::Result;

use mu::context::Context;
use mu::output::OutputConfig;
use mu::workflow::WorkflowContext;

/// Options shared by every subcommand
#[derive(Debug)]
pub struct Globals {
    pub config_path: PathBuf,
    pub state_dir: PathBuf,
    pub output: OutputConfig,
}

impl Globals {
    /// Load the configuration and build the context for a command.
    pub fn context(&self) -> Result<Context> {
        if !self.config_path.exists() {
            return Err(config_not_found(&self.config_path));
        }
        Ok(Context::initialize(&self.config_path, self.state_dir.clone())?)
    }
}

fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a mu.yml file in your project root\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set the MU_CONFIG environment variable",
        path = path.display()
    )
}

/// Print the outcome of a workflow run and turn its error into the exit status.
pub fn finish(
    output: &OutputConfig,
    result: mu::Result<WorkflowContext>,
    message: &str,
) -> Result<()> {
    match result {
        Ok(_) => {
            println!("{} {}", output.ok(), message);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", output.failed(), e);
            Err(e.into())
        }
    }
}
