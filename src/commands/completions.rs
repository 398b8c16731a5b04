//! `mu completions <shell>`: print a completion script, e.g.
//! `mu completions zsh > ~/.zfunc/_mu`.

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

const BIN_NAME: &str = "mu";

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell the script is written for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn execute(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout().lock());
    Ok(())
}

fn write_completions(shell: Shell, out: &mut impl Write) {
    generate(shell, &mut Cli::command(), BIN_NAME, out);
}
