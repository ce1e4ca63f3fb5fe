//! # Backup Store
//!
//! Timestamped snapshots of tracked files and directories, and restoring them.
//!
//! ## Naming
//!
//! A snapshot of `conf.d` taken on 2025-03-25 at 10:10:10 is the sibling
//! `conf.d.20250325-101010.bak`. The timestamp is fixed-width and
//! most-significant-first, so among the names sharing the `conf.d.` prefix the
//! lexicographically greatest one is the newest. `find_latest` relies on this
//! and nothing else.
//!
//! ## Guarantees
//!
//! - `snapshot` never touches its source. Callers take the snapshot strictly
//!   before their destructive write; if the snapshot fails, they must not write.
//! - `restore` removes the destination and copies the snapshot into place. It
//!   does **not** snapshot the destination first; callers that want that safety
//!   net ask for it explicitly (see `hecate restore --snapshot-current`).
//! - Snapshots are never pruned.
//!
//! ## Clock
//!
//! Timestamps come from a `Clock` so tests can pin them. `SystemClock` reads
//! local time.

use crate::error::{Error, Result};
use crate::filesystem::{self, PathKind};
use crate::options::RunOptions;
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

/// File name suffix shared by every snapshot.
pub const SNAPSHOT_SUFFIX: &str = ".bak";

/// `chrono` format of the timestamp embedded in snapshot names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Source of snapshot timestamps.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    /// The current time rendered for a snapshot name.
    fn timestamp(&self) -> String {
        self.now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Build from a `YYYYMMDD-HHMMSS` string.
    pub fn parse(timestamp: &str) -> Result<Self> {
        Ok(Self(parse_timestamp(timestamp)?))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// A snapshot written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The path that was snapshotted.
    pub source: PathBuf,
    /// Where the copy lives.
    pub path: PathBuf,
    /// `YYYYMMDD-HHMMSS`
    pub timestamp: String,
    pub kind: PathKind,
}

/// Validate a `YYYYMMDD-HHMMSS` timestamp.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    // chrono accepts non-padded fields; the name ordering needs the fixed width.
    if value.len() != 15 {
        return Err(Error::InvalidTimestamp {
            value: value.to_string(),
        });
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| Error::InvalidTimestamp {
        value: value.to_string(),
    })
}

/// Name prefix shared by all snapshots of `source` (`"conf.d."`).
pub fn snapshot_prefix(source: &Path) -> Result<String> {
    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Filesystem {
            message: format!("Cannot snapshot '{}': no file name", source.display()),
        })?;
    Ok(format!("{}.", name))
}

/// Path of the snapshot of `source` taken at `timestamp`.
pub fn snapshot_path(source: &Path, timestamp: &str) -> Result<PathBuf> {
    parse_timestamp(timestamp)?;
    let name = format!("{}{}{}", snapshot_prefix(source)?, timestamp, SNAPSHOT_SUFFIX);
    Ok(parent_dir(source).join(name))
}

/// Whether `name` is a snapshot name, `{base}.{YYYYMMDD-HHMMSS}.bak`.
pub fn is_snapshot_name(name: &str) -> bool {
    name.strip_suffix(SNAPSHOT_SUFFIX)
        .and_then(|stem| stem.rsplit_once('.'))
        .is_some_and(|(base, timestamp)| !base.is_empty() && parse_timestamp(timestamp).is_ok())
}

/// `walkdir` filter keeping snapshots, and everything inside snapshot
/// directories, out of tree-wide passes. The walk root itself is kept.
pub fn outside_snapshots(entry: &walkdir::DirEntry) -> bool {
    entry.depth() == 0 || !entry.file_name().to_str().is_some_and(is_snapshot_name)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Creates, finds and restores snapshots.
#[derive(Debug, Clone, Default)]
pub struct BackupStore<C: Clock = SystemClock> {
    clock: C,
}

impl BackupStore<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> BackupStore<C> {
    /// Use a specific clock.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Current timestamp from this store's clock.
    pub fn timestamp(&self) -> String {
        self.clock.timestamp()
    }

    /// Snapshot `path` into a timestamped sibling.
    ///
    /// Returns `Ok(None)` without writing anything if `path` does not exist.
    pub fn snapshot(&self, path: &Path) -> Result<Option<Snapshot>> {
        let timestamp = self.clock.timestamp();
        self.snapshot_at(path, &timestamp)
    }

    /// Snapshot every path with one shared timestamp.
    ///
    /// Missing paths are skipped; the first failure aborts.
    pub fn snapshot_all(&self, paths: &[PathBuf]) -> Result<Vec<Snapshot>> {
        self.snapshot_all_at(paths, &self.clock.timestamp())
    }

    /// `snapshot_all` with an explicit timestamp.
    pub fn snapshot_all_at(&self, paths: &[PathBuf], timestamp: &str) -> Result<Vec<Snapshot>> {
        parse_timestamp(timestamp)?;
        let mut snapshots = Vec::new();
        for path in paths {
            if let Some(snapshot) = self.snapshot_at(path, timestamp)? {
                snapshots.push(snapshot);
            }
        }
        Ok(snapshots)
    }

    fn snapshot_at(&self, path: &Path, timestamp: &str) -> Result<Option<Snapshot>> {
        let Some(kind) = filesystem::path_kind(path) else {
            log::debug!("Nothing to snapshot at {}", path.display());
            return Ok(None);
        };

        let target = snapshot_path(path, timestamp)?;
        if filesystem::path_kind(&target).is_some() {
            log::warn!(
                "Snapshot {} already exists and will be replaced",
                target.display()
            );
            filesystem::remove_path(&target)?;
        }

        filesystem::copy_path(path, &target)?;
        log::info!("Snapshot of {} written to {}", path.display(), target.display());

        Ok(Some(Snapshot {
            source: path.to_path_buf(),
            path: target,
            timestamp: timestamp.to_string(),
            kind,
        }))
    }

    /// Snapshot `path` unless `options` is a dry run.
    pub fn guard(&self, path: &Path, options: &RunOptions) -> Result<Option<Snapshot>> {
        if options.dry_run {
            log::debug!("Dry run: not snapshotting {}", path.display());
            return Ok(None);
        }
        self.snapshot(path)
    }

    /// Snapshots in `dir` named `{prefix}{YYYYMMDD-HHMMSS}.bak`, oldest first.
    pub fn list(&self, dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| Error::Filesystem {
            message: format!("Failed to read directory '{}': {}", dir.display(), e),
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let timestamped = name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(SNAPSHOT_SUFFIX))
                .is_some_and(|timestamp| parse_timestamp(timestamp).is_ok());
            if timestamped {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names.into_iter().map(|name| dir.join(name)).collect())
    }

    /// All snapshots of `source`, oldest first.
    pub fn list_for(&self, source: &Path) -> Result<Vec<PathBuf>> {
        self.list(&parent_dir(source), &snapshot_prefix(source)?)
    }

    /// The newest snapshot in `dir` whose name starts with `prefix`.
    pub fn find_latest(&self, dir: &Path, prefix: &str) -> Result<PathBuf> {
        self.list(dir, prefix)?
            .pop()
            .ok_or_else(|| Error::SnapshotNotFound {
                prefix: prefix.to_string(),
                dir: dir.to_path_buf(),
            })
    }

    /// The newest snapshot of `source`.
    pub fn latest_for(&self, source: &Path) -> Result<PathBuf> {
        self.find_latest(&parent_dir(source), &snapshot_prefix(source)?)
    }

    /// Replace `destination` with the content of `snapshot`.
    ///
    /// The snapshot is checked before anything is removed, so a missing
    /// snapshot leaves the destination untouched.
    pub fn restore(&self, snapshot: &Path, destination: &Path) -> Result<PathKind> {
        if filesystem::path_kind(snapshot).is_none() {
            return Err(Error::not_found("Snapshot", snapshot));
        }

        filesystem::remove_path(destination)?;
        let kind = filesystem::copy_path(snapshot, destination)?;
        log::info!(
            "Restored {} from {}",
            destination.display(),
            snapshot.display()
        );
        Ok(kind)
    }

    /// Restore `destination` from its newest snapshot.
    pub fn restore_latest(&self, destination: &Path) -> Result<PathBuf> {
        let latest = self.latest_for(destination)?;
        self.restore(&latest, destination)?;
        Ok(latest)
    }
}
