//! Source reads and destination deletion.
//!
//! Glob expansion is always relative to the project root. Destination
//! paths for matched files are computed against a base directory: the
//! configured `src_options.base` when present, otherwise the non-glob
//! prefix of the pattern that matched (`js/vendor/*.js` puts `a.js` at
//! `a.js`, not `js/vendor/a.js`).

use crate::config::{CommonSpec, DeleteSpec};
use crate::pipeline::Asset;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Error while reading sources or deleting outputs.
#[derive(Debug)]
pub enum FsError {
    /// Invalid glob pattern
    Pattern(String, glob::PatternError),
    /// I/O failure
    Io(std::io::Error),
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsError::Pattern(pattern, e) => write!(f, "Invalid pattern '{}': {}", pattern, e),
            FsError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for FsError {}

impl From<std::io::Error> for FsError {
    fn from(e: std::io::Error) -> Self {
        FsError::Io(e)
    }
}

fn has_glob_meta(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}

/// The leading directory components of a pattern before any glob meta
/// character.
pub(crate) fn non_glob_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    for component in Path::new(pattern).components() {
        match component {
            Component::Normal(part) if !has_glob_meta(&part.to_string_lossy()) => {
                prefix.push(part);
            }
            Component::Normal(_) => break,
            other => prefix.push(other),
        }
    }
    // A pattern with no meta names a file; its prefix is the directory.
    if !has_glob_meta(pattern) {
        prefix.pop();
    }
    prefix
}

/// Read every file matched by the task's source patterns.
///
/// Matches are deduplicated across patterns, preserving first-match
/// order. Unreadable glob entries are logged and skipped; the build is
/// not failed for a file that vanished mid-scan.
pub fn read_sources(root: &Path, common: &CommonSpec) -> Result<Vec<Asset>, FsError> {
    let base_override = common.src_options.base.as_ref().map(|b| root.join(b));

    let mut assets: Vec<Asset> = Vec::new();
    let mut seen: Vec<PathBuf> = Vec::new();

    for pattern in common.src.to_vec() {
        let absolute = root.join(&pattern);
        let pattern_str = absolute.to_string_lossy().into_owned();
        let base = match &base_override {
            Some(base) => base.clone(),
            None => root.join(non_glob_prefix(&pattern)),
        };

        let entries = glob::glob(&pattern_str).map_err(|e| FsError::Pattern(pattern.clone(), e))?;
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    eprintln!("Warning: skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !path.is_file() || seen.contains(&path) {
                continue;
            }

            let rel = path.strip_prefix(&base).unwrap_or(&path).to_path_buf();
            let contents = fs::read(&path)?;
            seen.push(path.clone());
            assets.push(Asset::new(rel, contents).with_source(path));
        }
    }

    Ok(assets)
}

/// Apply a task's deletion preamble.
///
/// `delete = true` removes the destination directory; explicit paths or
/// patterns are resolved against the project root. Missing targets are
/// fine. With `dry_run` the targets are only logged, and `no_delete`
/// suppresses deletion entirely.
pub fn apply_delete(
    root: &Path,
    dest: &Path,
    common: &CommonSpec,
    task_name: &str,
    no_delete: bool,
) -> Result<(), FsError> {
    let targets = match &common.delete {
        None | Some(DeleteSpec::Flag(false)) => return Ok(()),
        Some(DeleteSpec::Flag(true)) => vec![dest.to_path_buf()],
        Some(DeleteSpec::Paths(paths)) => {
            let mut targets = Vec::new();
            for entry in paths.to_vec() {
                if has_glob_meta(&entry) {
                    let pattern = root.join(&entry).to_string_lossy().into_owned();
                    let matches =
                        glob::glob(&pattern).map_err(|e| FsError::Pattern(entry.clone(), e))?;
                    targets.extend(matches.flatten());
                } else {
                    targets.push(root.join(entry));
                }
            }
            targets
        }
    };

    if no_delete {
        if common.verbose {
            println!("{}: deletion suppressed (--no-delete)", task_name);
        }
        return Ok(());
    }

    for target in targets {
        if common.delete_options.dry_run {
            println!("{}: would delete {}", task_name, target.display());
            continue;
        }
        remove_path(&target)?;
    }
    Ok(())
}

/// Remove a file or directory tree, ignoring targets that do not exist.
fn remove_path(path: &Path) -> Result<(), std::io::Error> {
    let result = if path.is_dir() { fs::remove_dir_all(path) } else { fs::remove_file(path) };
    match result {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeleteOptions, SrcOptions, StringList};
    use tempfile::TempDir;

    fn common(src: &[&str]) -> CommonSpec {
        CommonSpec {
            src: StringList::Many(src.iter().map(|s| s.to_string()).collect()),
            ..CommonSpec::default()
        }
    }

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_non_glob_prefix() {
        assert_eq!(non_glob_prefix("js/vendor/*.js"), PathBuf::from("js/vendor"));
        assert_eq!(non_glob_prefix("scss/**/*.scss"), PathBuf::from("scss"));
        assert_eq!(non_glob_prefix("assets/logo.png"), PathBuf::from("assets"));
        assert_eq!(non_glob_prefix("*.txt"), PathBuf::from(""));
    }

    #[test]
    fn test_read_sources_strips_pattern_prefix() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "js/vendor/a.js", "a");
        write(temp.path(), "js/vendor/sub/b.js", "b");

        let assets = read_sources(temp.path(), &common(&["js/vendor/**/*.js"])).unwrap();
        let mut rels: Vec<String> =
            assets.iter().map(|a| a.rel_path.display().to_string()).collect();
        rels.sort();
        assert_eq!(rels, vec!["a.js", "sub/b.js"]);
    }

    #[test]
    fn test_read_sources_base_override() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "js/vendor/a.js", "a");

        let mut spec = common(&["js/vendor/*.js"]);
        spec.src_options = SrcOptions { base: Some("js".to_string()) };
        let assets = read_sources(temp.path(), &spec).unwrap();
        assert_eq!(assets[0].rel_path, PathBuf::from("vendor/a.js"));
    }

    #[test]
    fn test_read_sources_dedupes_across_patterns() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "js/a.js", "a");

        let assets = read_sources(temp.path(), &common(&["js/*.js", "js/a.js"])).unwrap();
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn test_read_sources_empty_match_is_ok() {
        let temp = TempDir::new().unwrap();
        let assets = read_sources(temp.path(), &common(&["missing/**/*.css"])).unwrap();
        assert!(assets.is_empty());
    }

    #[test]
    fn test_delete_flag_removes_destination() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dist");
        write(temp.path(), "dist/old.css", "stale");

        let mut spec = common(&[]);
        spec.delete = Some(DeleteSpec::Flag(true));
        apply_delete(temp.path(), &dest, &spec, "sass-1", false).unwrap();
        assert!(!dest.exists());
    }

    #[test]
    fn test_delete_explicit_glob_targets() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "dist/a.css", "a");
        write(temp.path(), "dist/b.css", "b");
        write(temp.path(), "dist/keep.js", "k");

        let mut spec = common(&[]);
        spec.delete = Some(DeleteSpec::Paths(StringList::One("dist/*.css".to_string())));
        apply_delete(temp.path(), &temp.path().join("dist"), &spec, "sass-1", false).unwrap();
        assert!(!temp.path().join("dist/a.css").exists());
        assert!(temp.path().join("dist/keep.js").exists());
    }

    #[test]
    fn test_no_delete_suppresses() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dist");
        write(temp.path(), "dist/old.css", "stale");

        let mut spec = common(&[]);
        spec.delete = Some(DeleteSpec::Flag(true));
        apply_delete(temp.path(), &dest, &spec, "sass-1", true).unwrap();
        assert!(dest.exists());
    }

    #[test]
    fn test_dry_run_keeps_files() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dist");
        write(temp.path(), "dist/old.css", "stale");

        let mut spec = common(&[]);
        spec.delete = Some(DeleteSpec::Flag(true));
        spec.delete_options = DeleteOptions { dry_run: true };
        apply_delete(temp.path(), &dest, &spec, "sass-1", false).unwrap();
        assert!(dest.exists());
    }

    #[test]
    fn test_delete_missing_target_is_noop() {
        let temp = TempDir::new().unwrap();
        let mut spec = common(&[]);
        spec.delete = Some(DeleteSpec::Paths(StringList::One("gone.txt".to_string())));
        apply_delete(temp.path(), &temp.path().join("dist"), &spec, "copy-1", false).unwrap();
    }
}
