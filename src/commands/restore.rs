//! # Restore Command Implementation
//!
//! Replaces the compose file, `conf.d` or `certs` with a snapshot: the one
//! taken at `--timestamp`, or the newest one of each target.
//!
//! Restoring does not snapshot the current state unless `--snapshot-current`
//! is given. That snapshot is newer than the one being restored, so it becomes
//! the "latest" for later restores.

use anyhow::Result;
use clap::{Args, ValueEnum};
use dialoguer::{theme::ColorfulTheme, Select};
use std::path::PathBuf;

use hecate::backup::{self, BackupStore};
use hecate::error::{Error, ErrorKind};
use hecate::filesystem;
use hecate::suggestions;

use super::Context;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Compose,
    Conf,
    Certs,
    All,
}

const TARGETS: [Target; 4] = [Target::All, Target::Compose, Target::Conf, Target::Certs];

/// Restore the compose file, conf.d or certs from a snapshot
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Snapshot timestamp (YYYYMMDD-HHMMSS); the newest snapshot when omitted
    #[arg(short, long, value_name = "TS")]
    pub timestamp: Option<String>,

    /// What to restore (prompted for when omitted on a terminal, else all)
    #[arg(long, value_enum)]
    pub target: Option<Target>,

    /// List existing snapshots instead of restoring
    #[arg(long)]
    pub list: bool,

    /// Snapshot the current state before overwriting it
    #[arg(long)]
    pub snapshot_current: bool,
}

pub fn execute(args: RestoreArgs, ctx: &Context) -> Result<()> {
    let store = BackupStore::new();

    if args.list {
        let target = args.target.unwrap_or(Target::All);
        for path in target_paths(target, ctx) {
            println!("{}:", path.display());
            let snapshots = store.list_for(&path)?;
            if snapshots.is_empty() {
                println!("  (none)");
            }
            for snapshot in snapshots {
                println!("  {}", snapshot.display());
            }
        }
        return Ok(());
    }

    let target = match args.target {
        Some(target) => target,
        None if super::interactive() => prompt_target()?,
        None => Target::All,
    };

    // Resolve every snapshot before touching anything.
    let mut plan = Vec::new();
    for path in target_paths(target, ctx) {
        let snapshot = match &args.timestamp {
            Some(ts) => {
                let candidate = backup::snapshot_path(&path, ts)?;
                if filesystem::path_kind(&candidate).is_some() {
                    Ok(candidate)
                } else {
                    Err(Error::not_found("Snapshot", candidate))
                }
            }
            None => store.latest_for(&path),
        };
        match snapshot {
            Ok(snapshot) => plan.push((snapshot, path)),
            Err(e) if target == Target::All && e.kind() == ErrorKind::NotFound => {
                println!(
                    "{}",
                    ctx.output
                        .warning(format!("No snapshot for {}, skipped", path.display()))
                );
            }
            Err(e) => return Err(suggestions::explain(e, None)),
        }
    }
    if plan.is_empty() {
        anyhow::bail!(
            "No snapshots found to restore in {}\n\n\
             hint: Run 'hecate restore --list' to see existing snapshots",
            ctx.dir.display()
        );
    }

    if args.snapshot_current {
        let timestamp = store.timestamp();
        for (snapshot, path) in &plan {
            if backup::snapshot_path(path, &timestamp)? == *snapshot {
                anyhow::bail!(
                    "Cannot save the current state of {}: it would replace {}\n\n\
                     hint: Wait a second and run the restore again",
                    path.display(),
                    snapshot.display()
                );
            }
        }
        let current: Vec<PathBuf> = plan.iter().map(|(_, path)| path.clone()).collect();
        for snapshot in store.snapshot_all_at(&current, &timestamp)? {
            println!("Current state saved to {}", snapshot.path.display());
        }
    }

    for (snapshot, path) in &plan {
        store.restore(snapshot, path)?;
        println!(
            "{}",
            ctx.output.success(format!(
                "Restored {} from {}",
                path.display(),
                snapshot.display()
            ))
        );
    }
    Ok(())
}

fn target_paths(target: Target, ctx: &Context) -> Vec<PathBuf> {
    match target {
        Target::Compose => vec![ctx.paths.compose_file.clone()],
        Target::Conf => vec![ctx.paths.conf_dir.clone()],
        Target::Certs => vec![ctx.paths.certs_dir.clone()],
        Target::All => ctx.paths.tracked(),
    }
}

fn prompt_target() -> Result<Target> {
    let labels = ["everything", "compose file", "conf.d", "certs"];
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("What should be restored?")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(TARGETS[index])
}
