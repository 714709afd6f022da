//! Filesystem utilities

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{error, info};
use walkdir::WalkDir;

/// Ensure a directory exists, creating it and its parents if necessary
///
/// Returns true if the directory exists (either already existed or was created).
pub fn ensure_dir_exists(path: &Path) -> bool {
    if path.is_dir() {
        return true;
    }

    match fs::create_dir_all(path) {
        Ok(_) => {
            info!("Created directory: {}", path.display());
            true
        }
        Err(e) => {
            error!("Failed to create directory {}: {}", path.display(), e);
            false
        }
    }
}

/// Recursively list regular files below `root`, as paths relative to it, sorted
pub fn list_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            found.push(rel.to_path_buf());
        }
    }
    found.sort();
    Ok(found)
}

/// Copy `from` to `to`, creating parent directories of `to` as needed
pub fn copy_file(from: &Path, to: &Path) -> io::Result<u64> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let scratch = tempfile::tempdir().unwrap();
        let dir = scratch.path().join("a/b");
        assert!(ensure_dir_exists(&dir));
        assert!(dir.is_dir());
        // second call is a no-op
        assert!(ensure_dir_exists(&dir));
    }

    #[test]
    fn list_files_walks_subdirectories() {
        let root = tempfile::tempdir().unwrap();
        copy_file(Path::new("Cargo.toml"), &root.path().join("pkg/one.txt")).unwrap();
        copy_file(Path::new("Cargo.toml"), &root.path().join("two.txt")).unwrap();
        fs::create_dir_all(root.path().join("empty/nested")).unwrap();

        let files = list_files(root.path()).unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("pkg/one.txt"), PathBuf::from("two.txt")]
        );
    }

    #[test]
    fn list_files_reports_a_missing_root() {
        let scratch = tempfile::tempdir().unwrap();
        let err = list_files(&scratch.path().join("absent")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
