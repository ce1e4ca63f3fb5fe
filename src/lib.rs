//! # Hecate Library
//!
//! Desired-state reconciliation of a reverse-proxy deployment's orchestration
//! template, plus versioned backup and restore of the files it touches. It is
//! used by the `hecate` command-line tool. Prompts and argument parsing live in
//! the binary; `output` is the one module here that looks at the terminal, to
//! decide on colours and emoji.
//!
//! ## Quick Example
//!
//! ```
//! use hecate::catalog::ApplicationCatalog;
//! use hecate::compose::{reconcile, ComposeDocument};
//! use hecate::selection::resolve;
//!
//! let catalog = ApplicationCatalog::builtin();
//! let selection = resolve("2", "", &catalog).unwrap();
//! assert_eq!(selection.names(), vec!["Wazuh"]);
//!
//! let template = ComposeDocument::from_text("    #  - \"1515:1515\"\n    #  - \"3478:3478\"");
//! let result = reconcile(&template, &selection);
//! assert_eq!(result.document.to_text(), "    - \"1515:1515\"\n    #  - \"3478:3478\"");
//! ```
//!
//! ## Core Concepts
//!
//! - **Catalog (`catalog`)**: the optional backend services, their nginx
//!   server configs and the markers identifying their template lines.
//! - **Selection (`selection`)**: validated subsets of the catalog with a
//!   canonical, persistable string form. Saved answers live in `preferences`.
//! - **Reconciliation (`compose`)**: uncomments exactly the template lines and
//!   blocks belonging to the selection. Idempotent.
//! - **Snapshots (`backup`)**: timestamped sibling copies taken before every
//!   destructive write, and restoring from them.
//! - **Bulk passes (`substitution`, `prune`)**: placeholder stamping and
//!   removal of unselected server configs across `conf.d`, best-effort per file.
//!
//! Every mutating operation takes a `RunOptions` value; there is no global
//! state.

pub mod backup;
pub mod catalog;
pub mod compose;
pub mod config;
pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod options;
pub mod output;
pub mod preferences;
pub mod prune;
pub mod selection;
pub mod substitution;
pub mod suggestions;

#[cfg(test)]
mod compose_proptest;
