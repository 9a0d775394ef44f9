//! Version metadata embedded into installer scripts and file names.

use crate::bundler::error::{Error, Result};

/// Version of the package being built.
///
/// Threaded into `util_functions.sh` and the installer's file name. Immutable
/// for the duration of one build.
///
/// # Examples
///
/// ```no_run
/// use flashable_bundler::bundler::VersionInfo;
///
/// let version = VersionInfo::new("24.0", 2400)?;
/// assert_eq!(version.version_string(), "24.0");
/// # Ok::<(), flashable_bundler::bundler::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VersionInfo {
    version_string: String,
    version_code: u32,
}

impl VersionInfo {
    /// Creates version metadata, rejecting strings that cannot be pasted into a
    /// double-quoted shell assignment or a file name.
    pub fn new(version_string: impl Into<String>, version_code: u32) -> Result<Self> {
        let version_string = version_string.into();

        if version_string.is_empty() {
            return Err(Error::InvalidVersion {
                reason: "version string is empty".into(),
            });
        }

        if let Some(c) = version_string
            .chars()
            .find(|c| matches!(c, '"' | '\'' | '\\' | '$' | '`' | '/' | '\n' | '\r' | '\0'))
        {
            return Err(Error::InvalidVersion {
                reason: format!("version string {version_string:?} contains {c:?}"),
            });
        }

        Ok(Self {
            version_string,
            version_code,
        })
    }

    /// Human readable version, e.g. `24.0`.
    pub fn version_string(&self) -> &str {
        &self.version_string
    }

    /// Monotonic version code, e.g. `2400`.
    pub fn version_code(&self) -> u32 {
        self.version_code
    }
}
