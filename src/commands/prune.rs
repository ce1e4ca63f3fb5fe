//! # Prune Command Implementation
//!
//! Removes the server configs under `conf.d` that belong to applications that
//! are not selected. Essential configs are always kept.

use anyhow::Result;
use clap::Args;

use hecate::backup::BackupStore;
use hecate::options::RunOptions;
use hecate::prune::{self, PruneOutcome};
use hecate::suggestions;

use super::Context;

/// Remove server configs of applications that are not selected
#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Comma-separated app keys, or 'all' (prompted for when omitted)
    #[arg(long, value_name = "LIST")]
    pub apps: Option<String>,

    /// Show what would be removed without removing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute(args: PruneArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let mut preferences = ctx.preferences()?;
    let selection = super::select_apps(args.apps.as_deref(), &catalog, &preferences)?;
    let tracked = ctx.config.tracked_files()?;
    let options = RunOptions {
        dry_run: args.dry_run,
        ..RunOptions::default()
    };

    let report = prune::prune(
        &ctx.paths.conf_dir,
        &selection,
        &ctx.config.essential_conf_files,
        |path| tracked.matches(path),
        &BackupStore::new(),
        &options,
    )
    .map_err(|e| suggestions::explain(e, Some(&catalog)))?;

    if let Some(snapshot) = &report.snapshot {
        println!("Backup written to {}", snapshot.path.display());
    }
    for file in &report.files {
        let line = match &file.outcome {
            PruneOutcome::Removed => ctx.output.success(format!("Removed {}", file.path.display())),
            PruneOutcome::WouldRemove => {
                ctx.output.info(format!("Would remove {}", file.path.display()))
            }
            PruneOutcome::Failed { message } => ctx
                .output
                .failure(format!("{}: {}", file.path.display(), message)),
        };
        println!("{}", line);
    }
    if report.files.is_empty() {
        println!("{}", ctx.output.success("No configuration files to remove"));
    }

    let report = report.into_result()?;
    if !options.dry_run {
        super::save_selection(&mut preferences, &selection)?;
    }
    log::debug!("Kept {} tracked file(s)", report.kept.len());
    Ok(())
}
