//! # Compose Command Implementation
//!
//! Uncomments the selected applications' lines and blocks in the compose
//! file. The file is snapshotted before it is replaced, and the selection is
//! saved as the default for the next run.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use hecate::backup::BackupStore;
use hecate::compose;
use hecate::options::RunOptions;
use hecate::suggestions;

use super::Context;

/// Uncomment the selected applications in the compose file
#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Comma-separated app keys, or 'all' (prompted for when omitted)
    #[arg(long, value_name = "LIST")]
    pub apps: Option<String>,

    /// Compose file to reconcile (default: compose_file from the configuration)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Uncomment through the end of the file when a block is never finished
    #[arg(long)]
    pub allow_unterminated: bool,
}

pub fn execute(args: ComposeArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let mut preferences = ctx.preferences()?;
    let selection = super::select_apps(args.apps.as_deref(), &catalog, &preferences)?;

    let path = args
        .file
        .as_deref()
        .map(|f| ctx.resolve(f))
        .unwrap_or_else(|| ctx.paths.compose_file.clone());
    let options = RunOptions {
        dry_run: args.dry_run,
        allow_unterminated_blocks: args.allow_unterminated,
    };

    println!("Selected: {}", selection.names().join(", "));
    let outcome = compose::reconcile_file(&path, &selection, &BackupStore::new(), &options)
        .map_err(|e| suggestions::explain(e, Some(&catalog)))?;

    for open in &outcome.unterminated_blocks {
        println!(
            "{}",
            ctx.output.warning(format!(
                "Block for '{}' starting at line {} is never finished",
                open.app, open.line
            ))
        );
    }

    if outcome.changed_lines.is_empty() {
        println!("{}", ctx.output.success(format!("{} is already up to date", path.display())));
    } else if options.dry_run {
        println!(
            "{}",
            ctx.output.info(format!(
                "Dry run: would uncomment {} line(s) in {}: {}",
                outcome.changed_lines.len(),
                path.display(),
                join_numbers(&outcome.changed_lines)
            ))
        );
        return Ok(());
    } else {
        if let Some(snapshot) = &outcome.snapshot {
            println!("Backup written to {}", snapshot.path.display());
        }
        println!(
            "{}",
            ctx.output.success(format!(
                "Uncommented {} line(s) in {}",
                outcome.changed_lines.len(),
                path.display()
            ))
        );
    }

    if !options.dry_run {
        super::save_selection(&mut preferences, &selection)?;
    }
    Ok(())
}

fn join_numbers(numbers: &[usize]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
