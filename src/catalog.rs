//! # Application Catalog
//!
//! The static registry of optional backend services that can sit behind the
//! reverse proxy. Each `AppDescriptor` names the nginx server config it owns
//! (`conf_file`), the marker substrings that identify its lines in the compose
//! template, and optionally a block delimiter pair for multi-line regions.
//!
//! A catalog is built once (either the builtin one or from `hecate.yaml`) and
//! never mutated afterwards. Keys are unique within a catalog; construction
//! fails with `Error::DuplicateAppKey` otherwise.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Ports every web app exposes through the proxy.
const DEFAULT_MARKERS: [&str; 2] = ["80", "443"];

/// Sentinel pair bounding a multi-line region that belongs to one app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockDelimiter {
    /// Text of the line that opens the block.
    pub start: String,
    /// Text of the line that closes the block.
    pub finish: String,
}

/// One optional service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppDescriptor {
    /// Catalog-scoped identifier, typed by the user when selecting.
    pub key: String,
    /// Human readable name.
    pub name: String,
    /// nginx server config owned by this app (e.g. `delphi.conf`).
    pub conf_file: String,
    /// Substrings marking template lines that belong to this app.
    #[serde(default)]
    pub markers: Vec<String>,
    /// Optional multi-line region delimiters.
    #[serde(default)]
    pub block: Option<BlockDelimiter>,
}

impl AppDescriptor {
    /// Create a descriptor carrying the default web markers plus `extra`.
    pub fn new(key: &str, name: &str, conf_file: &str, extra: &[&str]) -> Self {
        let markers = DEFAULT_MARKERS
            .iter()
            .chain(extra.iter())
            .map(|m| m.to_string())
            .collect();
        Self {
            key: key.to_string(),
            name: name.to_string(),
            conf_file: conf_file.to_string(),
            markers,
            block: None,
        }
        .normalized()
    }

    /// Attach a block delimiter pair.
    pub fn with_block(mut self, start: &str, finish: &str) -> Self {
        self.block = Some(BlockDelimiter {
            start: start.to_string(),
            finish: finish.to_string(),
        });
        self
    }

    /// Collapse duplicate markers, keeping the first occurrence.
    fn normalized(mut self) -> Self {
        let mut seen = HashSet::new();
        self.markers.retain(|m| !m.is_empty() && seen.insert(m.clone()));
        self
    }
}

/// Read-only registry of optional services.
#[derive(Debug, Clone)]
pub struct ApplicationCatalog {
    apps: Vec<AppDescriptor>,
}

impl ApplicationCatalog {
    /// Build a catalog, validating key uniqueness and sorting by key.
    pub fn new(apps: Vec<AppDescriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for app in &apps {
            if !seen.insert(app.key.as_str()) {
                return Err(Error::DuplicateAppKey {
                    key: app.key.clone(),
                });
            }
        }

        let mut apps: Vec<AppDescriptor> = apps.into_iter().map(AppDescriptor::normalized).collect();
        apps.sort_by(|a, b| compare_keys(&a.key, &b.key));
        Ok(Self { apps })
    }

    /// The services shipped with hecate.
    pub fn builtin() -> Self {
        let apps = vec![
            AppDescriptor::new("1", "Static website", "base.conf", &[]),
            AppDescriptor::new("2", "Wazuh", "delphi.conf", &["1515", "1514", "55000"]),
            AppDescriptor::new("3", "Mattermost", "collaborate.conf", &[]),
            AppDescriptor::new("4", "Nextcloud", "cloud.conf", &["3478", "coturn:"]),
            AppDescriptor::new(
                "5",
                "Mailcow",
                "mailcow.conf",
                &["25", "587", "465", "110", "995", "143", "993"],
            ),
            AppDescriptor::new("6", "Jenkins", "jenkins.conf", &[])
                .with_block("uncomment if using Jenkins behind Hecate", "# <- finish"),
            AppDescriptor::new("7", "Grafana", "observe.conf", &[]),
            AppDescriptor::new("8", "Umami", "analytics.conf", &[]),
            AppDescriptor::new("9", "MinIO", "s3.conf", &[]),
            AppDescriptor::new("10", "Wiki.js", "wiki.conf", &[]),
            AppDescriptor::new("11", "ERPNext", "erp.conf", &[]),
            AppDescriptor::new("12", "Jellyfin", "jellyfin.conf", &[]),
            AppDescriptor::new("13", "Persephone", "persephone.conf", &[]),
        ];
        Self { apps }
    }

    /// Find an app by key.
    pub fn lookup(&self, key: &str) -> Option<&AppDescriptor> {
        self.apps.iter().find(|app| app.key == key)
    }

    /// All apps, numeric keys in numeric order first.
    pub fn list_all(&self) -> &[AppDescriptor] {
        &self.apps
    }

    /// Position of `key` in listing order, used to canonicalize selections.
    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.apps.iter().position(|app| app.key == key)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

impl Default for ApplicationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Numeric keys compare numerically and sort before non-numeric keys.
fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_ordered_numerically() {
        let catalog = ApplicationCatalog::builtin();
        let keys: Vec<&str> = catalog.list_all().iter().map(|a| a.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13"]
        );
    }

    #[test]
    fn test_lookup_known_and_unknown() {
        let catalog = ApplicationCatalog::builtin();
        let wazuh = catalog.lookup("2").unwrap();
        assert_eq!(wazuh.name, "Wazuh");
        assert_eq!(wazuh.conf_file, "delphi.conf");
        assert_eq!(wazuh.markers, vec!["80", "443", "1515", "1514", "55000"]);
        assert!(catalog.lookup("99").is_none());
        assert!(catalog.lookup("wazuh").is_none());
    }

    #[test]
    fn test_jenkins_has_block_delimiter() {
        let catalog = ApplicationCatalog::builtin();
        let block = catalog.lookup("6").unwrap().block.as_ref().unwrap();
        assert_eq!(block.start, "uncomment if using Jenkins behind Hecate");
        assert_eq!(block.finish, "# <- finish");
    }

    #[test]
    fn test_new_rejects_duplicate_keys() {
        let apps = vec![
            AppDescriptor::new("1", "One", "one.conf", &[]),
            AppDescriptor::new("1", "Uno", "uno.conf", &[]),
        ];
        let err = ApplicationCatalog::new(apps).unwrap_err();
        assert!(matches!(err, Error::DuplicateAppKey { key } if key == "1"));
    }

    #[test]
    fn test_new_sorts_mixed_keys() {
        let apps = vec![
            AppDescriptor::new("web", "Web", "web.conf", &[]),
            AppDescriptor::new("10", "Ten", "ten.conf", &[]),
            AppDescriptor::new("2", "Two", "two.conf", &[]),
        ];
        let catalog = ApplicationCatalog::new(apps).unwrap();
        let keys: Vec<&str> = catalog.list_all().iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["2", "10", "web"]);
    }

    #[test]
    fn test_markers_are_an_ordered_set() {
        let app = AppDescriptor::new("1", "Dup", "dup.conf", &["443", "8443", "8443"]);
        assert_eq!(app.markers, vec!["80", "443", "8443"]);
    }

    #[test]
    fn test_deserialize_descriptor_from_yaml() {
        let yaml = r##"
key: "20"
name: Gitea
conf_file: gitea.conf
markers: ["3000", "2222"]
block:
  start: "uncomment if using Gitea"
  finish: "# <- finish"
"##;
        let app: AppDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(app.key, "20");
        assert_eq!(app.markers, vec!["3000", "2222"]);
        let block = app.block.unwrap();
        assert_eq!(block.start, "uncomment if using Gitea");
        assert_eq!(block.finish, "# <- finish");
    }
}
