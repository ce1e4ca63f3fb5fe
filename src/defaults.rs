//! Default values for hecate configuration.
//!
//! Centralised here so `hecate.yaml` defaults and CLI defaults cannot drift.

/// Project configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "hecate.yaml";

/// Orchestration template reconciled by `compose`.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// nginx server config directory.
pub const CONF_DIR: &str = "conf.d";

pub const CERTS_DIR: &str = "certs";

/// Saved answers (`KEY="value"` lines).
pub const PREFERENCES_FILE: &str = ".hecate.conf";

/// Glob patterns of the files substitution and pruning operate on.
pub fn default_tracked_patterns() -> Vec<String> {
    vec!["*.conf".to_string()]
}

/// Server configs that pruning never removes.
pub fn default_essential_conf_files() -> Vec<String> {
    ["http.conf", "stream.conf", "fallback.conf"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Placeholders asked for by `substitute`.
pub fn default_placeholders() -> Vec<String> {
    [
        "BACKEND_IP",
        "PERS_BACKEND_IP",
        "DELPHI_BACKEND_IP",
        "BASE_DOMAIN",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
