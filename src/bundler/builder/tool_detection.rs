//! External tool detection and availability checking.
//!
//! Lookups are cached so repeated packaging in one process spawns the probe
//! at most once.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

/// Java launcher found in PATH, if it runs.
pub static JAVA: LazyLock<Option<PathBuf>> = LazyLock::new(|| match which::which("java") {
    Ok(path) => {
        log::debug!("Found java at: {}", path.display());

        match std::process::Command::new(&path).arg("-version").output() {
            Ok(output) if output.status.success() => {
                // `java -version` reports on stderr.
                let version = String::from_utf8_lossy(&output.stderr);
                log::info!(
                    "✓ java available: {}",
                    version.lines().next().unwrap_or_default().trim()
                );
                Some(path)
            }
            Ok(output) => {
                log::warn!(
                    "java found at {} but -version check failed (exit code: {:?}). \
                         Stderr: {}",
                    path.display(),
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr)
                );
                None
            }
            Err(e) => {
                log::warn!(
                    "java found at {} but failed to execute: {}. \
                         Check file permissions.",
                    path.display(),
                    e
                );
                None
            }
        }
    }
    Err(e) => {
        log::debug!("java not found in PATH: {}", e);
        None
    }
});

/// Resolves a configured program to an executable path.
///
/// A bare `java` uses the cached probe. Other bare names are searched in PATH.
/// Anything with a directory component must exist as a file.
pub fn resolve_program(program: &Path) -> Option<PathBuf> {
    let bare = program.components().count() == 1 && !program.is_absolute();

    if bare && program == Path::new("java") {
        JAVA.clone()
    } else if bare {
        which::which(program).ok()
    } else if program.is_file() {
        Some(program.to_path_buf())
    } else {
        log::debug!("{} is not a file", program.display());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_paths_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("fake-java");
        std::fs::write(&tool, b"#!/bin/sh\n").unwrap();

        assert_eq!(resolve_program(&tool), Some(tool.clone()));
        assert_eq!(resolve_program(&dir.path().join("missing")), None);
    }

    #[test]
    fn unknown_bare_names_are_not_found() {
        assert_eq!(
            resolve_program(Path::new("definitely-not-a-real-tool-8d1f")),
            None
        );
    }
}
