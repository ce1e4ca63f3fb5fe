//! # Project Configuration
//!
//! `hecate.yaml` describes where the deployment's files live and, optionally,
//! a custom application catalog. Every field has a default, so a missing file
//! or an empty one means "the standard layout with the builtin catalog".
//!
//! ```yaml
//! compose_file: docker-compose.yml
//! conf_dir: conf.d
//! certs_dir: certs
//! preferences_file: .hecate.conf
//! tracked_patterns: ["*.conf"]
//! essential_conf_files: [http.conf, stream.conf, fallback.conf]
//! placeholders: [BACKEND_IP, PERS_BACKEND_IP, DELPHI_BACKEND_IP, BASE_DOMAIN]
//! apps: []
//! ```
//!
//! Relative paths are resolved against the project directory (`--dir`).
//! Unknown fields are rejected so that typos do not silently fall back to a
//! default.

use crate::catalog::{AppDescriptor, ApplicationCatalog};
use crate::defaults;
use crate::error::{Error, Result};
use crate::substitution::TrackedFiles;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Field names accepted at the top level, for hints.
const KNOWN_FIELDS: [&str; 8] = [
    "compose_file",
    "conf_dir",
    "certs_dir",
    "preferences_file",
    "tracked_patterns",
    "essential_conf_files",
    "placeholders",
    "apps",
];

/// Contents of `hecate.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HecateConfig {
    pub compose_file: PathBuf,
    pub conf_dir: PathBuf,
    pub certs_dir: PathBuf,
    pub preferences_file: PathBuf,
    /// Globs matched against file names under `conf_dir`.
    pub tracked_patterns: Vec<String>,
    /// Server configs that pruning keeps regardless of the selection.
    pub essential_conf_files: Vec<String>,
    /// Placeholder names prompted for by `substitute`.
    pub placeholders: Vec<String>,
    /// Custom catalog. Empty means the builtin one.
    pub apps: Vec<AppDescriptor>,
}

impl Default for HecateConfig {
    fn default() -> Self {
        Self {
            compose_file: PathBuf::from(defaults::COMPOSE_FILE),
            conf_dir: PathBuf::from(defaults::CONF_DIR),
            certs_dir: PathBuf::from(defaults::CERTS_DIR),
            preferences_file: PathBuf::from(defaults::PREFERENCES_FILE),
            tracked_patterns: defaults::default_tracked_patterns(),
            essential_conf_files: defaults::default_essential_conf_files(),
            placeholders: defaults::default_placeholders(),
            apps: Vec::new(),
        }
    }
}

/// Config paths resolved against a project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub compose_file: PathBuf,
    pub conf_dir: PathBuf,
    pub certs_dir: PathBuf,
    pub preferences_file: PathBuf,
}

impl ProjectPaths {
    /// The paths `backup` and `restore --target all` operate on.
    pub fn tracked(&self) -> Vec<PathBuf> {
        vec![
            self.compose_file.clone(),
            self.conf_dir.clone(),
            self.certs_dir.clone(),
        ]
    }
}

impl HecateConfig {
    /// The catalog described by `apps`, or the builtin one.
    pub fn catalog(&self) -> Result<ApplicationCatalog> {
        if self.apps.is_empty() {
            Ok(ApplicationCatalog::builtin())
        } else {
            ApplicationCatalog::new(self.apps.clone())
        }
    }

    pub fn tracked_files(&self) -> Result<TrackedFiles> {
        TrackedFiles::from_patterns(&self.tracked_patterns)
    }

    pub fn paths(&self, dir: &Path) -> ProjectPaths {
        ProjectPaths {
            compose_file: dir.join(&self.compose_file),
            conf_dir: dir.join(&self.conf_dir),
            certs_dir: dir.join(&self.certs_dir),
            preferences_file: dir.join(&self.preferences_file),
        }
    }

    /// Check everything serde cannot: catalog keys, glob syntax, placeholder names.
    pub fn validate(&self) -> Result<()> {
        self.catalog()?;
        self.tracked_files()?;
        for name in &self.placeholders {
            if !is_placeholder_name(name) {
                return Err(Error::ConfigParse {
                    message: format!("Invalid placeholder name '{}'", name),
                    hint: Some(
                        "Placeholder names use letters, digits and '_' and do not start with a digit"
                            .to_string(),
                    ),
                });
            }
        }
        Ok(())
    }
}

fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse `hecate.yaml` content. Empty content yields the defaults.
pub fn parse(yaml_content: &str) -> Result<HecateConfig> {
    if yaml_content.trim().is_empty() {
        return Ok(HecateConfig::default());
    }
    let config: HecateConfig = serde_yaml::from_str(yaml_content).map_err(|e| {
        let message = e.to_string();
        let hint = message.contains("unknown field").then(|| {
            format!("Valid top-level fields are: {}", KNOWN_FIELDS.join(", "))
        });
        Error::ConfigParse { message, hint }
    })?;
    config.validate()?;
    Ok(config)
}

/// Parse a configuration file. The file must exist.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<HecateConfig> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::not_found("Configuration file", path));
    }
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

/// Load the configuration for the project in `dir`.
///
/// An `explicit` path must exist. Without one, `dir/hecate.yaml` is used when
/// present and the defaults otherwise.
pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<HecateConfig> {
    match explicit {
        Some(path) => from_file(dir.join(path)),
        None => {
            let default_path = dir.join(defaults::CONFIG_FILE);
            if default_path.is_file() {
                from_file(default_path)
            } else {
                log::debug!("No {} in {}, using defaults", defaults::CONFIG_FILE, dir.display());
                Ok(HecateConfig::default())
            }
        }
    }
}
