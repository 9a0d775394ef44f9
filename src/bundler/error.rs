//! Error types for package assembly and signing.
//!
//! Every failure in the pipeline is fatal for the current run. The variants here
//! name the failed operation precisely enough that an operator knows which build
//! step to rerun.

use crate::bundler::settings::Arch;
use std::{fmt::Display, io, path::PathBuf};
use thiserror::Error as DeriveError;

/// Result type alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Build step that produces a required input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Producer {
    /// Native binaries (`out/<arch>/...`).
    Binary,
    /// Application package (`out/app-*.apk`).
    Apk,
    /// Files checked into the source tree (scripts, prebuilts).
    SourceTree,
    /// Signer jar and key material.
    Signer,
    /// External trailer adjustment tool.
    Adjuster,
}

impl Display for Producer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Producer::Binary => f.write_str("try building 'binary' before zipping"),
            Producer::Apk => f.write_str("try building 'binary' and 'apk' before zipping"),
            Producer::SourceTree => f.write_str("it should be part of the source tree"),
            Producer::Signer => f.write_str("build the zip signer and provide the signing keys"),
            Producer::Adjuster => f.write_str("build zipadjust or use the built-in adjuster"),
        }
    }
}

/// Stage of the signing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStage {
    /// `Unsigned -> Signed`
    Sign,
    /// `Signed -> Adjusted`
    Adjust,
    /// `Adjusted -> FinalSigned`
    Resign,
}

impl Display for SigningStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SigningStage::Sign => f.write_str("first sign"),
            SigningStage::Adjust => f.write_str("adjust"),
            SigningStage::Resign => f.write_str("second sign"),
        }
    }
}

/// Errors returned by the bundler.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// A required input file is absent.
    #[error("{} does not exist! ({producer})", path.display())]
    MissingArtifact {
        /// Expected location of the artifact
        path: PathBuf,
        /// Step that produces it
        producer: Producer,
    },

    /// A bootstrap encoder input is not in the artifact set.
    #[error("bootstrap input '{name}' for {arch} is unavailable; build 'binary' before zipping")]
    ArtifactUnavailable {
        /// Logical artifact name
        name: String,
        /// Architecture that was requested
        arch: Arch,
    },

    /// The archive writer failed.
    #[error("assembling archive failed: {reason}")]
    AssemblyFailed {
        /// What went wrong
        reason: String,
    },

    /// A signing pipeline stage failed.
    #[error("{stage} flashable zip failed: {reason}")]
    SigningFailed {
        /// Failed stage
        stage: SigningStage,
        /// Tool output or exit status
        reason: String,
    },

    /// An external tool could not be located.
    #[error("required tool '{tool}' was not found; make sure it is available in PATH")]
    ToolNotFound {
        /// Tool name
        tool: String,
    },

    /// Version metadata cannot be embedded.
    #[error("invalid version: {reason}")]
    InvalidVersion {
        /// Why it was rejected
        reason: String,
    },

    /// Error with extra context.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error tied to a path.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        error: io::Error,
    },

    /// Failed to spawn a child process.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command line
        command: String,
        /// Underlying error
        error: io::Error,
    },

    /// Zip library error.
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    /// Template rendering error.
    #[error("{0}")]
    Template(#[from] handlebars::RenderError),

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Wraps an error in a [`SigningFailed`](Error::SigningFailed) for `stage`,
    /// unless it already is one.
    pub fn at_stage(self, stage: SigningStage) -> Self {
        match self {
            err @ Error::SigningFailed { .. } => err,
            other => Error::SigningFailed {
                stage,
                reason: other.to_string(),
            },
        }
    }
}

/// Convenient early return with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::Error::GenericError($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

/// Attaches context to results and options.
pub trait Context<T> {
    /// Adds static context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Adds lazily evaluated context to an error.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Maps I/O errors to [`Error::Fs`] with the offending path.
pub trait ErrorExt<T> {
    /// Adds a description and path to an I/O error.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifact_names_the_producing_step() {
        let err = Error::MissingArtifact {
            path: PathBuf::from("out/x86/magiskinit"),
            producer: Producer::Binary,
        };
        let msg = err.to_string();
        assert!(msg.contains("out/x86/magiskinit"));
        assert!(msg.contains("'binary'"));
    }

    #[test]
    fn at_stage_keeps_existing_signing_failures() {
        let err = Error::SigningFailed {
            stage: SigningStage::Sign,
            reason: "exit status 1".into(),
        }
        .at_stage(SigningStage::Resign);
        assert!(matches!(
            err,
            Error::SigningFailed {
                stage: SigningStage::Sign,
                ..
            }
        ));

        let err = Error::GenericError("boom".into()).at_stage(SigningStage::Adjust);
        assert!(matches!(
            err,
            Error::SigningFailed {
                stage: SigningStage::Adjust,
                ..
            }
        ));
    }
}
