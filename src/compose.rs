//! # Compose Reconciler
//!
//! Aligns the active and inactive lines of the orchestration template
//! (`docker-compose.yml`) with a `SelectionSet`.
//!
//! The template ships with every optional service commented out. Activating a
//! service means removing the leading comment markers from its lines:
//!
//! ```text
//!     #  - "1515:1515"      becomes      - "1515:1515"
//! ```
//!
//! ## Rules
//!
//! - **Marker rule**: a line containing any marker of any selected app is
//!   uncommented.
//! - **Block rule**: every selected app with a `BlockDelimiter` has its own
//!   OFF/ON state. A line containing the start text switches it ON, every line
//!   while ON is uncommented, and the line containing the finish text is
//!   uncommented and switches it back OFF. A line holding both texts is a
//!   one-line block.
//!
//! Both tests look at the line *after* its comment prefix is removed, and the
//! delimiters are normalised the same way, so `# <- finish` matches the
//! uncommented `<- finish` too. Lines are never added, removed or reordered.
//!
//! ## Idempotence
//!
//! Uncommenting removes the whole run of leading `#` characters, and every
//! decision is taken on text that uncommenting does not change. A second pass
//! therefore makes exactly the same decisions on lines that are already
//! uncommented, and changes nothing.

use crate::backup::{BackupStore, Clock, Snapshot};
use crate::catalog::AppDescriptor;
use crate::error::{Error, Result};
use crate::filesystem::{self, PathKind};
use crate::options::RunOptions;
use crate::selection::SelectionSet;
use std::fs;
use std::path::{Path, PathBuf};

/// The template as an ordered sequence of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeDocument {
    lines: Vec<String>,
}

impl ComposeDocument {
    /// Split on `\n`. A trailing newline becomes a final empty line, so
    /// `to_text` reproduces the input exactly.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Read a template from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if filesystem::path_kind(path) != Some(PathKind::File) {
            return Err(Error::not_found("Compose file", path));
        }
        let text = fs::read_to_string(path).map_err(|e| Error::Filesystem {
            message: format!("Failed to read '{}': {}", path.display(), e),
        })?;
        Ok(Self::from_text(&text))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// A block that was switched ON and never switched OFF again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBlock {
    pub app: String,
    /// 1-based line of the start delimiter.
    pub line: usize,
}

/// Result of a pure reconciliation pass.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub document: ComposeDocument,
    /// 1-based numbers of the lines whose text changed.
    pub changed_lines: Vec<usize>,
    pub unterminated_blocks: Vec<OpenBlock>,
}

impl Reconciliation {
    pub fn is_changed(&self) -> bool {
        !self.changed_lines.is_empty()
    }
}

/// Remove the run of leading `#` (and the blanks around them) while keeping
/// the indentation in front of the first one.
///
/// Only spaces and tabs count as blanks. Lines with no comment prefix are
/// returned as they are.
pub fn strip_comment_prefix(line: &str) -> String {
    let rest = line.trim_start_matches([' ', '\t']);
    if !rest.starts_with('#') {
        return line.to_string();
    }
    let indent = &line[..line.len() - rest.len()];

    let mut rest = rest;
    while let Some(after) = rest.strip_prefix('#') {
        rest = after.trim_start_matches([' ', '\t']);
    }
    format!("{}{}", indent, rest)
}

/// Delimiter text as it appears on an uncommented line.
fn normalize_delimiter(text: &str) -> String {
    strip_comment_prefix(text.trim()).trim().to_string()
}

struct BlockState<'a> {
    app: &'a AppDescriptor,
    start: String,
    finish: String,
    open_at: Option<usize>,
}

impl BlockState<'_> {
    /// Advance the state machine over one stripped line. Returns whether the
    /// line belongs to the block.
    fn step(&mut self, stripped: &str, index: usize) -> bool {
        if self.open_at.is_none() {
            if !stripped.contains(&self.start) {
                return false;
            }
            self.open_at = Some(index);
        }
        // Checked on the start line too, so start and finish together close at once.
        if stripped.contains(&self.finish) {
            self.open_at = None;
        }
        true
    }
}

/// Uncomment the lines of `document` that belong to `selection`.
pub fn reconcile(document: &ComposeDocument, selection: &SelectionSet<'_>) -> Reconciliation {
    let mut blocks: Vec<BlockState> = selection
        .apps()
        .iter()
        .filter_map(|app| {
            let block = app.block.as_ref()?;
            let start = normalize_delimiter(&block.start);
            let finish = normalize_delimiter(&block.finish);
            if start.is_empty() || finish.is_empty() {
                log::warn!("Ignoring empty block delimiter of '{}'", app.name);
                return None;
            }
            Some(BlockState {
                app,
                start,
                finish,
                open_at: None,
            })
        })
        .collect();

    let mut lines = Vec::with_capacity(document.lines.len());
    let mut changed_lines = Vec::new();

    for (index, line) in document.lines.iter().enumerate() {
        let stripped = strip_comment_prefix(line);

        let marked = selection.apps().iter().any(|app| {
            app.markers
                .iter()
                .any(|marker| stripped.contains(marker.as_str()))
        });
        // Every block must see every line, even when a marker already matched.
        let mut in_block = false;
        for block in blocks.iter_mut() {
            in_block |= block.step(&stripped, index);
        }

        if (marked || in_block) && stripped != *line {
            log::debug!("Line {}: uncommented", index + 1);
            changed_lines.push(index + 1);
            lines.push(stripped);
        } else {
            lines.push(line.clone());
        }
    }

    let unterminated_blocks = blocks
        .iter()
        .filter_map(|block| {
            block.open_at.map(|index| OpenBlock {
                app: block.app.name.clone(),
                line: index + 1,
            })
        })
        .collect();

    Reconciliation {
        document: ComposeDocument { lines },
        changed_lines,
        unterminated_blocks,
    }
}

/// What `reconcile_file` did.
#[derive(Debug, Clone)]
pub struct ComposeOutcome {
    pub path: PathBuf,
    pub changed_lines: Vec<usize>,
    pub unterminated_blocks: Vec<OpenBlock>,
    /// Snapshot taken before the write.
    pub snapshot: Option<Snapshot>,
    /// Whether the file on disk was replaced.
    pub written: bool,
}

/// Reconcile the template at `path` in place.
///
/// The file is snapshotted through `store` before it is replaced, and only
/// when the reconciliation changes something.
pub fn reconcile_file<C: Clock>(
    path: &Path,
    selection: &SelectionSet<'_>,
    store: &BackupStore<C>,
    options: &RunOptions,
) -> Result<ComposeOutcome> {
    let document = ComposeDocument::load(path)?;
    let reconciliation = reconcile(&document, selection);

    if let Some(open) = reconciliation.unterminated_blocks.first() {
        if !options.allow_unterminated_blocks {
            return Err(Error::UnterminatedBlock {
                app: open.app.clone(),
                line: open.line,
            });
        }
        for open in &reconciliation.unterminated_blocks {
            log::warn!(
                "Block for '{}' starting at line {} is never finished; uncommented through end of file",
                open.app,
                open.line
            );
        }
    }

    let mut outcome = ComposeOutcome {
        path: path.to_path_buf(),
        changed_lines: reconciliation.changed_lines.clone(),
        unterminated_blocks: reconciliation.unterminated_blocks.clone(),
        snapshot: None,
        written: false,
    };

    if !reconciliation.is_changed() {
        log::info!("{} is already up to date", path.display());
        return Ok(outcome);
    }
    if options.dry_run {
        log::info!(
            "Dry run: {} line(s) of {} would change",
            outcome.changed_lines.len(),
            path.display()
        );
        return Ok(outcome);
    }

    outcome.snapshot = store.snapshot(path)?;
    filesystem::write_atomic(path, reconciliation.document.to_text().as_bytes())?;
    outcome.written = true;
    log::info!(
        "Updated {} ({} line(s) uncommented)",
        path.display(),
        outcome.changed_lines.len()
    );
    Ok(outcome)
}
