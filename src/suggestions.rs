//! # Error Suggestions
//!
//! Helpers that build user-facing errors with hints. An error should tell the
//! user what went wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hecate::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Invalid selection: {}", token);
//!
//! // Use:
//! return Err(suggestions::invalid_selection(token, &catalog));
//! ```

use crate::catalog::ApplicationCatalog;
use crate::error::Error;
use std::path::Path;

/// Convert a library error into an anyhow error, adding hints where we have
/// something useful to say.
pub fn explain(error: Error, catalog: Option<&ApplicationCatalog>) -> anyhow::Error {
    if let (Error::InvalidSelection { token }, Some(catalog)) = (&error, catalog) {
        return invalid_selection(token, catalog);
    }
    match error {
        Error::SnapshotNotFound { prefix, dir } => snapshot_not_found(&prefix, &dir),
        Error::UnterminatedBlock { app, line } => unterminated_block(&app, line),
        Error::EmptySelection => anyhow::anyhow!(
            "{}\n\n\
             hint: Pass --apps with comma-separated keys, or 'all'\n\
             hint: Run 'hecate apps' to list the available applications",
            Error::EmptySelection
        ),
        other => anyhow::Error::new(other),
    }
}

/// Generate an error for when an explicit configuration file is not found.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Omit --config to use ./hecate.yaml or the builtin defaults\n\
         hint: Check the HECATE_CONFIG environment variable",
        path = path.display()
    )
}

/// Generate an error for a selection token that names no application.
///
/// Suggests a close key or app name when there is one.
pub fn invalid_selection(token: &str, catalog: &ApplicationCatalog) -> anyhow::Error {
    let names: Vec<&str> = catalog
        .list_all()
        .iter()
        .flat_map(|app| [app.key.as_str(), app.name.as_str()])
        .collect();
    let did_you_mean = find_similar(token, &names)
        .and_then(|s| {
            catalog
                .list_all()
                .iter()
                .find(|app| app.key == s || app.name == s)
        })
        .map(|app| format!("\nhint: Did you mean '{}' ({})?", app.key, app.name))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Invalid selection: '{token}' is not a known application{did_you_mean}\n\n\
         hint: Use comma-separated keys (e.g. '1,2') or 'all'\n\
         hint: Run 'hecate apps' to list the available applications"
    )
}

/// Generate an error for when no snapshot exists to restore from.
pub fn snapshot_not_found(prefix: &str, dir: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "No snapshot matching '{prefix}*.bak' found in {dir}\n\n\
         hint: Run 'hecate backup' to take a snapshot first\n\
         hint: Run 'hecate restore --list' to see existing snapshots",
        dir = dir.display()
    )
}

/// Generate an error for a block whose finish delimiter never appears.
pub fn unterminated_block(app: &str, line: usize) -> anyhow::Error {
    anyhow::anyhow!(
        "Block for '{app}' starting at line {line} is never finished; nothing was written\n\n\
         hint: Add the finish delimiter line after the block in the compose file\n\
         hint: Use --allow-unterminated to uncomment through the end of the file"
    )
}

/// Generate an error for a malformed `--set` value.
pub fn invalid_assignment(raw: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid placeholder assignment: {raw}\n\n\
         hint: Use NAME=VALUE, e.g. --set BACKEND_IP=10.0.0.5"
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let input_lower = input.to_lowercase();
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(&input_lower, &candidate.to_lowercase());
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rolling rows instead of the full matrix.
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];
    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_config_not_found_includes_hints() {
        let message = config_not_found(Path::new("/srv/custom.yaml")).to_string();
        assert!(message.contains("Configuration file not found"));
        assert!(message.contains("/srv/custom.yaml"));
        assert!(message.contains("HECATE_CONFIG"));
    }

    #[test]
    fn test_invalid_selection_suggests_app_name() {
        let catalog = ApplicationCatalog::builtin();
        let message = invalid_selection("wazu", &catalog).to_string();
        assert!(message.contains("'wazu' is not a known application"));
        assert!(message.contains("Did you mean '2' (Wazuh)?"));
    }

    #[test]
    fn test_invalid_selection_no_suggestion_for_very_different() {
        let catalog = ApplicationCatalog::builtin();
        let message = invalid_selection("kubernetes", &catalog).to_string();
        assert!(!message.contains("Did you mean"));
        assert!(message.contains("hecate apps"));
    }

    #[test]
    fn test_explain_maps_snapshot_not_found() {
        let error = Error::SnapshotNotFound {
            prefix: "conf.d.".to_string(),
            dir: PathBuf::from("/srv"),
        };
        let message = explain(error, None).to_string();
        assert!(message.contains("conf.d.*.bak"));
        assert!(message.contains("hecate backup"));
    }

    #[test]
    fn test_explain_passes_other_errors_through() {
        let error = Error::not_found("Compose file", "/srv/docker-compose.yml");
        let message = explain(error, None).to_string();
        assert_eq!(message, "Compose file not found: /srv/docker-compose.yml");
    }

    #[test]
    fn test_unterminated_block_mentions_flag() {
        let message = unterminated_block("Jenkins", 12).to_string();
        assert!(message.contains("line 12"));
        assert!(message.contains("--allow-unterminated"));
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("wazuh", "wazuh"), 0);
        assert_eq!(edit_distance("wazu", "wazuh"), 1);
        assert_eq!(edit_distance("minio", "mino"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_find_similar_is_case_insensitive() {
        let candidates = ["Wazuh", "Grafana", "MinIO"];
        assert_eq!(find_similar("grafna", &candidates), Some("Grafana"));
        assert_eq!(find_similar("MINO", &candidates), Some("MinIO"));
        assert_eq!(find_similar("foobar", &candidates), None);
    }
}
