//! Best-effort directory scanning.
//!
//! Directory scans never abort on a single bad file. Every file that could not
//! be used ends up in [`Scan::skipped`] so callers can report it at the end of
//! the run instead of losing it in a log line.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A file or concept that was left out of the run, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// Items collected from a directory plus everything that had to be skipped.
#[derive(Debug, Clone)]
pub struct Scan<T> {
    pub items: Vec<T>,
    pub skipped: Vec<Skipped>,
}

impl<T> Default for Scan<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> Scan<T> {
    /// Record the outcome of loading one file.
    pub fn push(&mut self, path: &Path, outcome: Result<T>) {
        match outcome {
            Ok(item) => self.items.push(item),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping file");
                self.skipped.push(Skipped {
                    path: path.to_path_buf(),
                    reason: format!("{:#}", e),
                });
            }
        }
    }
}

/// Recursively list files under `dir` with one of the given extensions,
/// sorted by path so directory order is deterministic.
pub fn find_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Directory not found: {}", dir.display());
    }

    let root = glob::Pattern::escape(&dir.to_string_lossy());
    let mut files = Vec::new();
    for ext in extensions {
        let pattern = format!("{}/**/*.{}", root, ext);
        let entries = glob::glob(&pattern)
            .with_context(|| format!("Invalid search pattern: {}", pattern))?;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "unreadable directory entry"),
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_files_recursive_and_sorted() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("b")).unwrap();
        fs::create_dir_all(tmp.path().join("a")).unwrap();
        fs::write(tmp.path().join("b/Two.ts"), "").unwrap();
        fs::write(tmp.path().join("a/One.ts"), "").unwrap();
        fs::write(tmp.path().join("a/notes.txt"), "").unwrap();

        let files = find_files(tmp.path(), &["ts"]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["One.ts", "Two.ts"]);
    }

    #[test]
    fn test_find_files_under_glob_metacharacters() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("proj[1]");
        fs::create_dir_all(dir.join("Team")).unwrap();
        fs::write(dir.join("Team/Team.ts"), "").unwrap();

        let files = find_files(&dir, &["ts"]).unwrap();
        assert_eq!(files, vec![dir.join("Team/Team.ts")]);
    }

    #[test]
    fn test_find_files_missing_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(find_files(&tmp.path().join("nope"), &["ts"]).is_err());
    }

    #[test]
    fn test_scan_push_records_skipped() {
        let mut scan: Scan<u32> = Scan::default();
        scan.push(Path::new("ok.txt"), Ok(1));
        scan.push(Path::new("bad.txt"), Err(anyhow::anyhow!("boom")));
        assert_eq!(scan.items, vec![1]);
        assert_eq!(scan.skipped.len(), 1);
        assert_eq!(scan.skipped[0].reason, "boom");
    }
}
