//! Fixture discovery.
//!
//! Walks the content root recursively and yields every regular file whose
//! name ends with the configured extension. Each fixture later becomes one
//! client invocation, identified by its bare file name.
//!
//! Symlinked directories are not descended into, so a link cycle below the
//! content root cannot break discovery. Symlinked files are kept.

use glob::{MatchOptions, Paths, Pattern};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{HarnessError, Result};

/// A file discovered under the content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fixture {
    /// Absolute path of the file on the harness side.
    pub path: PathBuf,
    /// Name handed verbatim to the client; the server resolves it.
    pub file_name: String,
}

/// Lazy, single-pass sequence of fixtures.
///
/// Order follows the underlying traversal and is not part of the contract.
pub struct Fixtures {
    root: PathBuf,
    paths: Paths,
}

impl std::fmt::Debug for Fixtures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fixtures").finish_non_exhaustive()
    }
}

/// Start discovering fixtures below `root` that end in `.<extension>`.
///
/// The root is checked eagerly so a missing or unreadable directory fails
/// here, before anything is launched. Problems with entries deeper in the
/// tree surface as `Err` items from the iterator.
///
/// # Errors
///
/// - [`HarnessError::Discovery`] if the root cannot be read
/// - [`HarnessError::Pattern`] if the root is not valid UTF-8
pub fn discover(root: &Path, extension: &str) -> Result<Fixtures> {
    fs::read_dir(root).map_err(|e| HarnessError::discovery(root, e))?;
    let root = fs::canonicalize(root).map_err(|e| HarnessError::discovery(root, e))?;

    let root_str = root.to_str().ok_or_else(|| HarnessError::Pattern {
        pattern: root.display().to_string(),
        reason: "content root is not valid UTF-8".to_string(),
    })?;

    let pattern = format!(
        "{}/**/*.{}",
        Pattern::escape(root_str.trim_end_matches('/')),
        Pattern::escape(extension)
    );

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let paths = glob::glob_with(&pattern, options).map_err(|e| HarnessError::Pattern {
        pattern: pattern.clone(),
        reason: e.to_string(),
    })?;

    Ok(Fixtures { root, paths })
}

impl Fixtures {
    /// True if any directory between the root and `path` is a symlink.
    ///
    /// `glob` follows directory links while walking, so entries reached that
    /// way are filtered out here instead.
    fn behind_symlinked_dir(&self, path: &Path) -> bool {
        let Some(parent) = path.parent() else {
            return false;
        };
        let Ok(relative) = parent.strip_prefix(&self.root) else {
            return false;
        };

        let mut current = self.root.clone();
        relative.components().any(|component| {
            current.push(component);
            is_symlink(&current)
        })
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}

impl Iterator for Fixtures {
    type Item = Result<Fixture>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = match self.paths.next()? {
                Ok(path) => path,
                Err(e) => {
                    let path = e.path().to_path_buf();
                    if is_symlink(&path) || self.behind_symlinked_dir(&path) {
                        debug!(path = %path.display(), error = %e, "Skipping entry behind symlink");
                        continue;
                    }
                    return Some(Err(HarnessError::discovery(path, e.into_error())));
                },
            };

            if self.behind_symlinked_dir(&path) {
                continue;
            }

            // Directories can match the pattern too
            if !path.is_file() {
                continue;
            }

            let Some(name) = path.file_name() else {
                continue;
            };
            let file_name = name.to_string_lossy().into_owned();

            return Some(Ok(Fixture { path, file_name }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    fn names(root: &Path, ext: &str) -> Vec<String> {
        let mut names: Vec<String> = discover(root, ext)
            .unwrap()
            .map(|f| f.unwrap().file_name)
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_discovers_nested_files_by_extension() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.pdf");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "shelf/b.pdf");
        touch(dir.path(), "shelf/deep/c.pdf");
        touch(dir.path(), "shelf/deep/c.pdf.bak");

        assert_eq!(names(dir.path(), "pdf"), vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn test_paths_are_absolute() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "sub/a.pdf");

        let fixture = discover(dir.path(), "pdf").unwrap().next().unwrap().unwrap();
        assert!(fixture.path.is_absolute());
        assert!(fixture.path.ends_with("sub/a.pdf"));
        assert_eq!(fixture.file_name, "a.pdf");
    }

    #[test]
    fn test_directories_with_matching_names_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("volume.pdf")).unwrap();
        touch(dir.path(), "volume.pdf/inner.pdf");

        assert_eq!(names(dir.path(), "pdf"), vec!["inner.pdf"]);
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "upper.PDF");
        touch(dir.path(), "lower.pdf");

        assert_eq!(names(dir.path(), "pdf"), vec!["lower.pdf"]);
    }

    #[test]
    fn test_empty_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(discover(dir.path(), "pdf").unwrap().count(), 0);
    }

    #[test]
    fn test_root_with_glob_metacharacters() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("books [2024]");
        touch(&root, "a.pdf");

        assert_eq!(names(&root, "pdf"), vec!["a.pdf"]);
    }

    #[test]
    fn test_missing_root_fails_eagerly() {
        let dir = TempDir::new().unwrap();
        let err = discover(&dir.path().join("missing"), "pdf").unwrap_err();
        assert!(matches!(err, HarnessError::Discovery { .. }));
        assert!(err.is_pre_launch());
    }

    #[test]
    fn test_file_root_fails_eagerly() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.pdf");
        assert!(discover(&dir.path().join("a.pdf"), "pdf").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dirs_are_not_followed() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let root = dir.path().join("books");
        let outside = dir.path().join("outside");
        touch(&root, "a.pdf");
        touch(&outside, "x.pdf");

        // A cycle back to the root and a link to a directory elsewhere
        symlink(&root, root.join("loop")).unwrap();
        symlink(&outside, root.join("shelf")).unwrap();
        // Symlinked files are still fixtures
        symlink(outside.join("x.pdf"), root.join("link.pdf")).unwrap();

        let found: Vec<Fixture> = discover(&root, "pdf")
            .unwrap()
            .collect::<Result<_>>()
            .expect("link cycles must not surface as errors");
        let mut names: Vec<String> = found.into_iter().map(|f| f.file_name).collect();
        names.sort();
        assert_eq!(names, vec!["a.pdf", "link.pdf"]);
    }
}
