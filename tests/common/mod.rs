//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_deployment();
//!     fixture.command().args(["compose", "--apps", "2"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::files;
    pub use super::TestFixture;
}

/// Deployment files used across tests.
#[allow(dead_code)]
pub mod files {
    /// A compose template with Wazuh, Nextcloud, Mailcow ports and a Jenkins
    /// block, all commented out.
    pub const COMPOSE: &str = r#"services:
  nginx:
    image: nginx
    ports:
      - "80:80"
      - "443:443"
    #  - "1515:1515"
    #  - "1514:1514/udp"
    #  - "55000:55000"
    #  - "3478:3478"
    #  - "25:25"
    # uncomment if using Jenkins behind Hecate
    #  jenkins:
    #    image: jenkins/jenkins:lts
    # <- finish
"#;

    /// Server config with placeholders.
    pub const DELPHI_CONF: &str = "upstream delphi { server ${DELPHI_BACKEND_IP}:55000; }\n";

    pub const HTTP_CONF: &str = "http { include servers/*.conf; }\n";
}

/// A temporary project directory with builder-style population helpers.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add `hecate.yaml`.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file("hecate.yaml", content)
    }

    /// Compose file, conf.d with a few server configs, and certs.
    pub fn with_deployment(self) -> Self {
        self.with_file("docker-compose.yml", files::COMPOSE)
            .with_file("conf.d/http.conf", files::HTTP_CONF)
            .with_file("conf.d/stream.conf", "stream {}\n")
            .with_file("conf.d/servers/base.conf", "server_name ${BASE_DOMAIN};\n")
            .with_file("conf.d/servers/delphi.conf", files::DELPHI_CONF)
            .with_file("conf.d/servers/wiki.conf", "server_name wiki.${BASE_DOMAIN};\n")
            .with_file("certs/fullchain.pem", "-----BEGIN CERTIFICATE-----\n")
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn join(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.join(path)).expect("Failed to read file")
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Names in `dir` (relative to the fixture) ending with `.bak`, sorted.
    pub fn snapshots(&self, dir: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.join(dir))
            .expect("Failed to read directory")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".bak"))
            .collect();
        names.sort();
        names
    }

    /// A `hecate` command running in this fixture's directory, with colours off.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("hecate");
        cmd.current_dir(self.path())
            .env_remove("HECATE_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
