//! # Backup Command Implementation
//!
//! Snapshots the compose file, `conf.d` and `certs` with one shared
//! timestamp, so `restore --timestamp` can bring all three back together.

use anyhow::Result;
use clap::Args;

use hecate::backup::BackupStore;

use super::Context;

/// Snapshot the compose file, conf.d and certs
#[derive(Args, Debug)]
pub struct BackupArgs {}

pub fn execute(_args: BackupArgs, ctx: &Context) -> Result<()> {
    let store = BackupStore::new();
    let tracked = ctx.paths.tracked();
    let snapshots = store.snapshot_all(&tracked)?;

    for path in &tracked {
        match snapshots.iter().find(|s| &s.source == path) {
            Some(snapshot) => println!(
                "{}",
                ctx.output.success(format!(
                    "{} -> {}",
                    path.display(),
                    snapshot.path.display()
                ))
            ),
            None => println!(
                "{}",
                ctx.output
                    .warning(format!("{} does not exist, skipped", path.display()))
            ),
        }
    }

    match snapshots.first() {
        Some(snapshot) => println!(
            "{}",
            ctx.output
                .info(format!("Restore with: hecate restore --timestamp {}", snapshot.timestamp))
        ),
        None => anyhow::bail!(
            "Nothing to back up in {}\n\n\
             hint: Use --dir to point at the project directory",
            ctx.dir.display()
        ),
    }
    Ok(())
}
