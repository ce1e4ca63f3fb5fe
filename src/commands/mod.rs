//! # CLI Command Implementations
//!
//! One module per `hecate` subcommand. Each defines an `Args` struct derived
//! with `clap` and an `execute` function that calls into the `hecate` library.
//!
//! Shared here: the per-invocation `Context` (project directory, loaded
//! configuration, output settings) and the interactive app selection loop.

pub mod apps;
pub mod backup;
pub mod compose;
pub mod prune;
pub mod restore;
pub mod substitute;

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};
use std::path::{Path, PathBuf};

use hecate::catalog::ApplicationCatalog;
use hecate::config::{self, HecateConfig, ProjectPaths};
use hecate::error::{Error, ErrorKind};
use hecate::output::OutputConfig;
use hecate::preferences::{Preferences, APPS_SELECTION};
use hecate::selection::{self, SelectionSet};
use hecate::suggestions;

/// How many times an invalid interactive selection is re-prompted.
const MAX_SELECTION_ATTEMPTS: usize = 3;

/// Everything a command needs to know about the project it runs on.
#[derive(Debug)]
pub struct Context {
    pub dir: PathBuf,
    pub config: HecateConfig,
    pub paths: ProjectPaths,
    pub output: OutputConfig,
}

impl Context {
    pub fn load(dir: &Path, config_path: Option<&Path>, output: OutputConfig) -> Result<Self> {
        let config = config::load(config_path, dir).map_err(|e| match e {
            Error::NotFound { path, .. } => suggestions::config_not_found(&path),
            other => anyhow::Error::new(other),
        })?;
        let paths = config.paths(dir);
        log::debug!("Project paths: {:?}", paths);
        Ok(Self {
            dir: dir.to_path_buf(),
            config,
            paths,
            output,
        })
    }

    pub fn catalog(&self) -> Result<ApplicationCatalog> {
        Ok(self.config.catalog()?)
    }

    pub fn preferences(&self) -> Result<Preferences> {
        Ok(Preferences::load(&self.paths.preferences_file)?)
    }

    /// Resolve a user-supplied path against the project directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.dir.join(path)
    }
}

/// Whether prompts can be shown.
pub fn interactive() -> bool {
    console::user_attended() && console::Term::stdout().is_term()
}

/// Pick the apps to operate on.
///
/// `--apps` wins and is validated once. Otherwise an attended terminal is
/// prompted (up to `MAX_SELECTION_ATTEMPTS` times, empty input meaning the
/// saved selection), and an unattended run falls back to the saved selection.
pub fn select_apps<'a>(
    apps: Option<&str>,
    catalog: &'a ApplicationCatalog,
    preferences: &Preferences,
) -> Result<SelectionSet<'a>> {
    let saved = preferences.get_or_empty(APPS_SELECTION);

    if let Some(raw) = apps {
        return selection::resolve(raw, saved, catalog)
            .map_err(|e| suggestions::explain(e, Some(catalog)));
    }
    if !interactive() {
        log::debug!("Not attended, using saved selection '{}'", saved);
        return selection::resolve("", saved, catalog)
            .map_err(|e| suggestions::explain(e, Some(catalog)));
    }

    print_catalog(catalog);
    let theme = ColorfulTheme::default();
    let mut attempt = 0;
    loop {
        attempt += 1;
        let prompt = if saved.is_empty() {
            "Apps to enable (comma-separated keys, or 'all')".to_string()
        } else {
            format!("Apps to enable (comma-separated keys, or 'all') [{}]", saved)
        };
        let raw: String = Input::with_theme(&theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;

        match selection::resolve(&raw, saved, catalog) {
            Ok(selection) => return Ok(selection),
            Err(e) if e.kind() == ErrorKind::Validation && attempt < MAX_SELECTION_ATTEMPTS => {
                println!("{}", suggestions::explain(e, Some(catalog)));
            }
            Err(e) => return Err(suggestions::explain(e, Some(catalog))),
        }
    }
}

/// `  2. Wazuh            -> delphi.conf`
pub fn print_catalog(catalog: &ApplicationCatalog) {
    println!("Available applications:");
    for app in catalog.list_all() {
        println!("  {:>3}. {:<16} -> {}", app.key, app.name, app.conf_file);
    }
    println!();
}

/// Remember the selection for the next run.
pub fn save_selection(preferences: &mut Preferences, selection: &SelectionSet<'_>) -> Result<()> {
    preferences.set(APPS_SELECTION, selection.canonical())?;
    preferences.save()?;
    Ok(())
}
