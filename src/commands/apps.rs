//! # Apps Command Implementation
//!
//! Lists the application catalog (builtin, or the `apps` list of
//! `hecate.yaml`) with each app's key, name and server config.

use anyhow::Result;
use clap::Args;

use super::Context;

/// List the applications that can be enabled
#[derive(Args, Debug)]
pub struct AppsArgs {
    /// Output in JSON format, including markers and block delimiters
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: AppsArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(catalog.list_all())?);
        return Ok(());
    }

    super::print_catalog(&catalog);
    let preferences = ctx.preferences()?;
    if let Some(saved) = preferences.get(hecate::preferences::APPS_SELECTION) {
        println!("{}", ctx.output.info(format!("Saved selection: {}", saved)));
    }
    Ok(())
}
