//! # Server Config Pruning
//!
//! Removes the nginx server configs of apps that are not selected.
//!
//! Every tracked file under the config directory is kept when its file name is
//! the `conf_file` of a selected app or one of the essential files
//! (`http.conf`, `stream.conf`, ...). Everything else tracked is removed.
//!
//! Snapshots inside the config directory are never considered.
//!
//! The whole config directory is snapshotted once, before the first removal,
//! and only when something will actually be removed.

use crate::backup::{self, BackupStore, Clock, Snapshot};
use crate::error::{Error, Result};
use crate::filesystem::{self, PathKind};
use crate::options::RunOptions;
use crate::selection::SelectionSet;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneOutcome {
    Removed,
    /// Dry run: the file would have been removed.
    WouldRemove,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunedFile {
    pub path: PathBuf,
    pub outcome: PruneOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    /// Snapshot of the config directory taken before removing anything.
    pub snapshot: Option<Snapshot>,
    pub files: Vec<PrunedFile>,
    /// Tracked files that were kept.
    pub kept: Vec<PathBuf>,
}

impl PruneReport {
    pub fn removed(&self) -> impl Iterator<Item = &PrunedFile> {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, PruneOutcome::Removed | PruneOutcome::WouldRemove))
    }

    pub fn failed(&self) -> impl Iterator<Item = &PrunedFile> {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, PruneOutcome::Failed { .. }))
    }

    /// Fail with `PartialBulkFailure` if any removal failed.
    pub fn into_result(self) -> Result<Self> {
        let failed = self.failed().count();
        if failed > 0 {
            return Err(Error::PartialBulkFailure {
                operation: "Prune".to_string(),
                failed,
                total: self.files.len(),
            });
        }
        Ok(self)
    }
}

/// Remove tracked files under `conf_dir` that no selected app owns.
pub fn prune<C, F>(
    conf_dir: &Path,
    selection: &SelectionSet<'_>,
    essential: &[String],
    tracked: F,
    store: &BackupStore<C>,
    options: &RunOptions,
) -> Result<PruneReport>
where
    C: Clock,
    F: Fn(&Path) -> bool,
{
    if filesystem::path_kind(conf_dir) != Some(PathKind::Directory) {
        return Err(Error::not_found("Config directory", conf_dir));
    }

    let allowed: HashSet<&str> = selection
        .apps()
        .iter()
        .map(|app| app.conf_file.as_str())
        .chain(essential.iter().map(String::as_str))
        .collect();

    let mut report = PruneReport::default();
    let mut doomed = Vec::new();
    let walker = WalkDir::new(conf_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(backup::outside_snapshots);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !tracked(entry.path()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if allowed.contains(name.as_ref()) {
            report.kept.push(entry.path().to_path_buf());
        } else {
            doomed.push(entry.path().to_path_buf());
        }
    }

    if doomed.is_empty() {
        log::info!("Nothing to prune in {}", conf_dir.display());
        return Ok(report);
    }

    if options.dry_run {
        report.files = doomed
            .into_iter()
            .map(|path| PrunedFile {
                path,
                outcome: PruneOutcome::WouldRemove,
            })
            .collect();
        return Ok(report);
    }

    report.snapshot = store.snapshot(conf_dir)?;

    for path in doomed {
        let outcome = match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Removed {}", path.display());
                PruneOutcome::Removed
            }
            Err(e) => {
                log::warn!("Failed to remove {}: {}", path.display(), e);
                PruneOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };
        report.files.push(PrunedFile { path, outcome });
    }

    log::info!(
        "Pruned {} file(s) from {}",
        report.removed().count(),
        conf_dir.display()
    );
    Ok(report)
}
