//! List the fixtures a run would launch clients for, without starting
//! anything.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

use xferload::config::{ConfigOverrides, HarnessConfig};
use xferload::fixtures::{self, Fixture};
use xferload::utils::format_bytes;

pub fn execute(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<()> {
    let (config, warnings) =
        HarnessConfig::resolve(config_path, overrides).context("Invalid configuration")?;
    for warning in &warnings {
        warn!("{warning}");
    }

    let found = collect(&config)?;

    let mut total_bytes = 0;
    for fixture in &found {
        let size = std::fs::metadata(&fixture.path).map_or(0, |m| m.len());
        total_bytes += size;
        println!("{:>10}  {}", format_bytes(size), fixture.path.display());
    }

    println!(
        "\n{} fixture(s), {} total",
        found.len(),
        format_bytes(total_bytes)
    );
    Ok(())
}

fn collect(config: &HarnessConfig) -> Result<Vec<Fixture>> {
    let root = &config.content_root;
    fixtures::discover(root, &config.fixtures.extension)
        .and_then(|found| found.collect())
        .with_context(|| format!("Failed to scan {}", root.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_collect_uses_configured_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("b.pdf"), b"b").unwrap();

        let mut config = HarnessConfig {
            content_root: dir.path().to_path_buf(),
            ..HarnessConfig::default()
        };
        config.fixtures.extension = "txt".to_string();

        let found = collect(&config).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_name, "a.txt");
    }

    #[test]
    fn test_collect_missing_root() {
        let dir = tempdir().unwrap();
        let config = HarnessConfig {
            content_root: dir.path().join("missing"),
            ..HarnessConfig::default()
        };

        let err = collect(&config).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to scan"));
    }
}
