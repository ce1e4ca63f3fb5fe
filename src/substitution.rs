//! # Template Substitution
//!
//! Stamps per-deployment values (`${BACKEND_IP}`, `${BASE_DOMAIN}`, ...) into
//! the tracked config files of a directory tree.
//!
//! This is a best-effort bulk pass. Each tracked file is handled on its own:
//!
//! 1. Read it and substitute every known `${NAME}` in one pass. Substituted
//!    values are never expanded again and unknown names stay as written.
//! 2. If the result is byte-identical to the original, leave the file alone:
//!    no snapshot, no write, no new modification time.
//! 3. Otherwise snapshot the file, then replace it atomically.
//!
//! Snapshots met during the walk (`*.{timestamp}.bak` files and directories)
//! are skipped together with their contents.
//!
//! A file that fails at any step is recorded in the report and the walk
//! continues with its siblings. `SubstitutionReport::into_result` turns any
//! failure into `Error::PartialBulkFailure`.

use crate::backup::{self, BackupStore, Clock};
use crate::error::{Error, Result};
use crate::filesystem::{self, PathKind};
use crate::options::RunOptions;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Matches `${NAME}`.
const PLACEHOLDER_PATTERN: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}";

/// Placeholder names and the values they expand to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    values: BTreeMap<String, String>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Placeholders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut placeholders = Self::new();
        for (name, value) in iter {
            placeholders.insert(name, value);
        }
        placeholders
    }
}

/// Decides which files of the tree are tracked.
#[derive(Debug, Clone)]
pub struct TrackedFiles {
    patterns: Vec<glob::Pattern>,
}

impl TrackedFiles {
    /// Glob patterns matched against file names (`*.conf`).
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| glob::Pattern::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.patterns.iter().any(|p| p.matches(name))
    }
}

/// Predicate accepting files whose extension is `extension`.
pub fn by_extension(extension: &str) -> impl Fn(&Path) -> bool + '_ {
    move |path: &Path| path.extension().and_then(|e| e.to_str()) == Some(extension)
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Content changed. `snapshot` is `None` on a dry run.
    Updated { snapshot: Option<PathBuf> },
    /// No placeholder applied; the file was not touched.
    Unchanged,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Per-file outcomes of a substitution pass, in walk order.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionReport {
    pub files: Vec<FileOutcome>,
}

impl SubstitutionReport {
    pub fn updated(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, Outcome::Updated { .. }))
    }

    pub fn unchanged(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files
            .iter()
            .filter(|f| f.outcome == Outcome::Unchanged)
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, Outcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    /// Fail with `PartialBulkFailure` if any file failed.
    pub fn into_result(self) -> Result<Self> {
        let failed = self.failed().count();
        if failed > 0 {
            return Err(Error::PartialBulkFailure {
                operation: "Substitution".to_string(),
                failed,
                total: self.files.len(),
            });
        }
        Ok(self)
    }
}

/// Substitutes placeholders in text and across a tree.
#[derive(Debug, Clone)]
pub struct TemplateSubstitution {
    placeholders: Placeholders,
    pattern: Regex,
}

impl TemplateSubstitution {
    pub fn new(placeholders: Placeholders) -> Result<Self> {
        Ok(Self {
            placeholders,
            pattern: Regex::new(PLACEHOLDER_PATTERN)?,
        })
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    /// Substitute every known placeholder in `text`.
    pub fn render(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures| match self.placeholders.get(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Walk `root` and substitute into every file accepted by `tracked`.
    pub fn apply<C, F>(
        &self,
        root: &Path,
        tracked: F,
        store: &BackupStore<C>,
        options: &RunOptions,
    ) -> Result<SubstitutionReport>
    where
        C: Clock,
        F: Fn(&Path) -> bool,
    {
        if filesystem::path_kind(root) != Some(PathKind::Directory) {
            return Err(Error::not_found("Substitution root", root));
        }

        let mut report = SubstitutionReport::default();
        // Snapshots are never rewritten, wherever the root puts them.
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(backup::outside_snapshots);
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    log::warn!("Skipping {}: {}", path.display(), e);
                    report.files.push(FileOutcome {
                        path,
                        outcome: Outcome::Failed {
                            message: e.to_string(),
                        },
                    });
                    continue;
                }
            };
            if !entry.file_type().is_file() || !tracked(entry.path()) {
                continue;
            }

            let outcome = match self.apply_file(entry.path(), store, options) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::warn!("Substitution failed for {}: {}", entry.path().display(), e);
                    Outcome::Failed {
                        message: e.to_string(),
                    }
                }
            };
            report.files.push(FileOutcome {
                path: entry.path().to_path_buf(),
                outcome,
            });
        }

        log::info!(
            "Substitution under {}: {} updated, {} unchanged, {} failed",
            root.display(),
            report.updated().count(),
            report.unchanged().count(),
            report.failed().count()
        );
        Ok(report)
    }

    fn apply_file<C: Clock>(
        &self,
        path: &Path,
        store: &BackupStore<C>,
        options: &RunOptions,
    ) -> Result<Outcome> {
        let original = fs::read_to_string(path).map_err(|e| Error::Filesystem {
            message: format!("Failed to read '{}': {}", path.display(), e),
        })?;
        let rendered = self.render(&original);
        if rendered == original {
            log::debug!("{}: no placeholders to substitute", path.display());
            return Ok(Outcome::Unchanged);
        }
        if options.dry_run {
            return Ok(Outcome::Updated { snapshot: None });
        }

        let snapshot = store.snapshot(path)?;
        filesystem::write_atomic(path, rendered.as_bytes())?;
        log::debug!("{}: placeholders substituted", path.display());
        Ok(Outcome::Updated {
            snapshot: snapshot.map(|s| s.path),
        })
    }
}

/// Substitute `placeholders` into every file under `root` accepted by `tracked`.
pub fn apply<C, F>(
    root: &Path,
    tracked: F,
    placeholders: Placeholders,
    store: &BackupStore<C>,
    options: &RunOptions,
) -> Result<SubstitutionReport>
where
    C: Clock,
    F: Fn(&Path) -> bool,
{
    TemplateSubstitution::new(placeholders)?.apply(root, tracked, store, options)
}
