//! Shared helpers for the harness integration tests.
//!
//! Servers and clients are `sh -c` scripts. The script name occupies `$0`, so
//! the positional arguments the harness appends arrive as `$1..$4`.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use xferload::config::{HarnessConfig, ProbeKind};

/// A content root plus a scratch directory for marker and record files.
pub struct TestRig {
    _dir: TempDir,
    pub root: PathBuf,
    pub scratch: PathBuf,
}

impl TestRig {
    /// Create a content root holding `files` (relative paths, nested allowed).
    pub fn with_files(files: &[&str]) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path().join("books");
        let scratch = dir.path().join("scratch");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&scratch).unwrap();

        for file in files {
            let path = root.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, format!("content of {file}")).unwrap();
        }

        Self {
            _dir: dir,
            root,
            scratch,
        }
    }

    pub fn scratch_file(&self, name: &str) -> PathBuf {
        self.scratch.join(name)
    }

    /// Config with readiness probing off and short timings.
    pub fn config(&self, server: &str, client: &str) -> HarnessConfig {
        let mut config = HarnessConfig {
            address: "127.0.0.1".to_string(),
            port: 55_901,
            content_root: self.root.clone(),
            max_transfer_size: 4096,
            server: sh(server, "server"),
            client: sh(client, "client"),
            ..HarnessConfig::default()
        };
        config.readiness.probe = ProbeKind::None;
        config.shutdown.settle_ms = 10;
        config.shutdown.exit_timeout_ms = 5_000;
        config.shutdown.stop_grace_ms = 500;
        config
    }
}

/// argv prefix running `script` under `sh`.
pub fn sh(script: &str, name: &str) -> Vec<String> {
    vec![
        "sh".to_string(),
        "-c".to_string(),
        script.to_string(),
        name.to_string(),
    ]
}

/// Client script appending its file name argument to `record`.
pub fn recording_client(record: &Path) -> String {
    format!("echo \"$3\" >> '{}'", record.display())
}

/// Lines of a record file, sorted; empty if it was never written.
pub fn read_sorted_lines(path: &Path) -> Vec<String> {
    let mut lines: Vec<String> = fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(ToString::to_string)
        .collect();
    lines.sort();
    lines
}
