//! # Persisted Preferences
//!
//! A flat `KEY="value"` file (`.hecate.conf` by default) remembering the last
//! answers a user gave: the app selection, the base domain, backend IPs.
//!
//! Reading ignores blank lines and lines without `=`; keys and values are
//! trimmed and surrounding double quotes are removed from values. Writing
//! emits one `KEY="value"` line per entry. The last write of a key wins.
//! Values holding `"` or a line break cannot round-trip through that format
//! and are rejected by `set`.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key under which the canonical app selection is saved.
pub const APPS_SELECTION: &str = "APPS_SELECTION";

/// String preferences backed by a file.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl Preferences {
    /// Load preferences from `path`. A missing file yields an empty set.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(content) => parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(Error::Filesystem {
                    message: format!("Failed to read preferences '{}': {}", path.display(), e),
                })
            }
        };
        log::debug!("Loaded {} preference(s) from {}", values.len(), path.display());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for `key`, or the empty string.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        check_value(&key, &value)?;
        self.values.insert(key, value);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.values.iter()
    }

    /// Write all entries back to the file.
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, render(&self.values)).map_err(|e| Error::Filesystem {
            message: format!(
                "Failed to write preferences '{}': {}",
                self.path.display(),
                e
            ),
        })?;
        log::debug!("Saved {} preference(s) to {}", self.values.len(), self.path.display());
        Ok(())
    }
}

/// Fail if `value` cannot be written back as `KEY="value"` and read again.
pub fn check_value(key: &str, value: &str) -> Result<()> {
    if value.contains(['"', '\n', '\r']) {
        return Err(Error::InvalidPreferenceValue {
            key: key.to_string(),
        });
    }
    Ok(())
}

fn parse(content: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        values.insert(key.trim().to_string(), value.to_string());
    }
    values
}

fn render(values: &BTreeMap<String, String>) -> String {
    values
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"\n", key, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_skips_blank_and_malformed_lines() {
        let values = parse("\nAPPS_SELECTION=\"1,2\"\nnot a pair\n  BASE_DOMAIN = example.com  \n");
        assert_eq!(values.len(), 2);
        assert_eq!(values["APPS_SELECTION"], "1,2");
        assert_eq!(values["BASE_DOMAIN"], "example.com");
    }

    #[test]
    fn test_parse_last_write_wins() {
        let values = parse("A=\"1\"\nA=\"2\"\n");
        assert_eq!(values["A"], "2");
    }

    #[test]
    fn test_parse_keeps_equals_in_value() {
        let values = parse("TOKEN=\"a=b\"\n");
        assert_eq!(values["TOKEN"], "a=b");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let prefs = Preferences::load(temp.path().join(".hecate.conf")).unwrap();
        assert!(prefs.get(APPS_SELECTION).is_none());
        assert_eq!(prefs.get_or_empty(APPS_SELECTION), "");
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".hecate.conf");

        let mut prefs = Preferences::load(&path).unwrap();
        prefs.set(APPS_SELECTION, "all").unwrap();
        prefs.set("BASE_DOMAIN", "example.com").unwrap();
        prefs.save().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("APPS_SELECTION=\"all\"\n"));
        assert!(content.contains("BASE_DOMAIN=\"example.com\"\n"));

        let reloaded = Preferences::load(&path).unwrap();
        assert_eq!(reloaded.get(APPS_SELECTION), Some("all"));
        assert_eq!(reloaded.get("BASE_DOMAIN"), Some("example.com"));
    }

    #[test]
    fn test_set_rejects_values_that_cannot_round_trip() {
        let temp = TempDir::new().unwrap();
        let mut prefs = Preferences::load(temp.path().join(".hecate.conf")).unwrap();

        for bad in ["x\"", "a\nB=\"c\"", "line\r"] {
            let err = prefs.set("BASE_DOMAIN", bad).unwrap_err();
            assert!(matches!(err, Error::InvalidPreferenceValue { ref key } if key == "BASE_DOMAIN"));
        }
        assert!(prefs.get("BASE_DOMAIN").is_none());

        prefs.set("BASE_DOMAIN", "it's fine").unwrap();
        prefs.save().unwrap();
        let reloaded = Preferences::load(prefs.path()).unwrap();
        assert_eq!(reloaded.get("BASE_DOMAIN"), Some("it's fine"));
    }
}
