//! Comprehensive error types for bundler operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use crate::bundler::error::{Error as PackageError, Producer, SigningStage};
use thiserror::Error;

/// Result type alias for bundler operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all bundler operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Packaging errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        let BundlerError::Bundler(error) = self else {
            return vec!["Check the error message above for specific details".to_string()];
        };

        match innermost(error) {
            PackageError::MissingArtifact {
                producer: Producer::Binary | Producer::Apk,
                ..
            } => vec!["Run the native and app builds, then zip again".to_string()],
            PackageError::MissingArtifact {
                producer: Producer::Signer,
                ..
            } => vec![
                "Build the zip signer jar".to_string(),
                "Point --public-key/--private-key at the signing keys".to_string(),
            ],
            PackageError::MissingArtifact {
                producer: Producer::Adjuster,
                ..
            } => vec!["Drop --zipadjust to use the built-in adjuster".to_string()],
            PackageError::ToolNotFound { .. } => {
                vec!["Install a JDK or pass --java with the launcher path".to_string()]
            }
            PackageError::SigningFailed {
                stage: SigningStage::Adjust,
                ..
            } => vec!["The first signing pass produced an unreadable archive".to_string()],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

fn innermost(error: &PackageError) -> &PackageError {
    match error {
        PackageError::Context(_, inner) => innermost(inner),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_suggests_building() {
        let err = BundlerError::from(PackageError::MissingArtifact {
            path: "out/x86/busybox".into(),
            producer: Producer::Binary,
        });
        assert!(err.recovery_suggestions()[0].contains("builds"));
        assert!(err.to_string().starts_with("out/x86/busybox does not exist!"));
    }
}
