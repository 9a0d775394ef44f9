//! Flashable zip bundler library
//!
//! This library assembles recovery-flashable installer and uninstaller zips
//! from prebuilt native binaries, the app package and installer scripts, then
//! signs them with a two-pass whole-file signature.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
