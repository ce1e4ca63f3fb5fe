//! # Selection Resolver
//!
//! Turns the text a user typed (or the previously saved default) into a
//! validated `SelectionSet` of catalog entries.
//!
//! Resolution rules:
//! - The raw input is trimmed. If it is empty, the default input is used.
//! - `all` (case-insensitive) selects the whole catalog.
//! - Otherwise the input is split on `,` and every trimmed token must be a
//!   catalog key. The first token that is not aborts resolution with
//!   `Error::InvalidSelection`; unknown tokens are never skipped.
//!
//! `resolve` is pure. Re-prompting after a validation error belongs to the
//! caller.

use crate::catalog::{AppDescriptor, ApplicationCatalog};
use crate::error::{Error, Result};

/// Canonical form of a selection that covers the whole catalog.
pub const ALL: &str = "all";

/// A non-empty set of selected apps.
#[derive(Debug, Clone)]
pub struct SelectionSet<'a> {
    /// Selected apps in catalog order, without duplicates.
    apps: Vec<&'a AppDescriptor>,
    /// Whether the selection was made with `all`.
    all: bool,
}

impl<'a> SelectionSet<'a> {
    /// Selected apps in catalog order.
    pub fn apps(&self) -> &[&'a AppDescriptor] {
        &self.apps
    }

    /// Whether the app with `key` is selected.
    pub fn contains(&self, key: &str) -> bool {
        self.apps.iter().any(|app| app.key == key)
    }

    /// Selected keys in catalog order.
    pub fn keys(&self) -> Vec<&str> {
        self.apps.iter().map(|app| app.key.as_str()).collect()
    }

    /// Selected app names, for display.
    pub fn names(&self) -> Vec<&str> {
        self.apps.iter().map(|app| app.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// The persisted form: `all`, or keys in catalog order joined by `,`.
    pub fn canonical(&self) -> String {
        if self.all {
            ALL.to_string()
        } else {
            self.keys().join(",")
        }
    }
}

impl PartialEq for SelectionSet<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.keys() == other.keys()
    }
}

impl Eq for SelectionSet<'_> {}

/// Resolve `raw` (falling back to `default`) against `catalog`.
pub fn resolve<'a>(
    raw: &str,
    default: &str,
    catalog: &'a ApplicationCatalog,
) -> Result<SelectionSet<'a>> {
    let mut input = raw.trim();
    if input.is_empty() {
        input = default.trim();
    }
    if input.is_empty() {
        return Err(Error::EmptySelection);
    }

    if input.eq_ignore_ascii_case(ALL) {
        if catalog.is_empty() {
            return Err(Error::EmptySelection);
        }
        return Ok(SelectionSet {
            apps: catalog.list_all().iter().collect(),
            all: true,
        });
    }

    let mut apps: Vec<&AppDescriptor> = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        let app = catalog.lookup(token).ok_or_else(|| Error::InvalidSelection {
            token: token.to_string(),
        })?;
        if !apps.iter().any(|a| a.key == app.key) {
            apps.push(app);
        }
    }

    apps.sort_by_key(|app| catalog.position(&app.key));
    Ok(SelectionSet { apps, all: false })
}
