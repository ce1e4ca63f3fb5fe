//! Per-invocation options passed explicitly into every mutating operation.

/// Switches that change how a mutating operation behaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute and report changes without taking snapshots or writing.
    pub dry_run: bool,
    /// Accept a selected block whose finish delimiter never appears,
    /// uncommenting through the end of the document.
    pub allow_unterminated_blocks: bool,
}

impl RunOptions {
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }
}
