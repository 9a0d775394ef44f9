//! File system utilities for bundling.
//!
//! Idempotent wrappers so reruns over a partially populated output directory
//! behave the same as a fresh run.

use crate::bundler::error::{ErrorExt, Result};
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Creates a directory and its parents. Succeeds if it already exists.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes a file. Succeeds if it does not exist.
pub async fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

/// Regular files directly inside `dir` with the given extension, sorted.
///
/// A missing directory yields an empty list.
pub async fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).fs_context("listing directory", dir),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("listing directory", dir)?
    {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .fs_context("inspecting", &path)?
            .is_file();
        if is_file && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn remove_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.zip");
        std::fs::write(&path, b"x").unwrap();

        remove_file(&path).await.unwrap();
        remove_file(&path).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn lists_only_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.zip"), b"").unwrap();
        std::fs::write(dir.path().join("a.zip"), b"").unwrap();
        std::fs::write(dir.path().join("app-debug.apk"), b"").unwrap();
        std::fs::create_dir(dir.path().join("dir.zip")).unwrap();

        let files = files_with_extension(dir.path(), "zip").await.unwrap();
        assert_eq!(files, [dir.path().join("a.zip"), dir.path().join("b.zip")]);

        let missing = files_with_extension(&dir.path().join("missing"), "zip")
            .await
            .unwrap();
        assert!(missing.is_empty());
    }
}
