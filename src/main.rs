//! # mu CLI
//!
//! Binary entry point for the `mu` command-line tool. Parses arguments with
//! `clap` and hands off to the command modules; all stack and workflow logic
//! lives in the `mu` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
