//! # Hecate CLI
//!
//! Binary entry point for the `hecate` command-line tool.
//!
//! Its responsibilities are parsing arguments with `clap`, running the
//! selected command, and turning errors into user-friendly output. The logic
//! lives in the `hecate` library crate; the binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
