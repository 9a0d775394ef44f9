//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap. Every path flag can
//! also come from a `FLASHABLE_*` environment variable.

use crate::bundler::{SettingsBuilder, VersionInfo};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Assembles and signs recovery-flashable zips
#[derive(Parser, Debug)]
#[command(
    name = "flashable_bundler",
    version,
    about = "Assembles and signs recovery-flashable zips",
    long_about = "Packs prebuilt native binaries, the app package and installer scripts into
recovery-flashable zips, then signs them (sign, adjust trailer, sign again).

Usage:
  flashable_bundler zip 24.0 24000
  flashable_bundler --release --out build/out all 24.0 24000
  flashable_bundler uninstaller
  flashable_bundler clean

Exit code 0 = every requested package exists at its output path."
)]
pub struct Args {
    /// Project root containing scripts/, out/, chromeos/ and the signing keys
    #[arg(long, global = true, env = "FLASHABLE_ROOT", default_value = ".", value_name = "DIR")]
    pub root: PathBuf,

    /// Output directory (default: <root>/out)
    #[arg(long = "out", global = true, env = "FLASHABLE_OUT_DIR", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Directory for intermediate archives (default: system temp dir)
    #[arg(long, global = true, env = "FLASHABLE_SCRATCH_DIR", value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Config file (default: <root>/bundler.toml if present)
    #[arg(long, global = true, env = "FLASHABLE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Package app-release.apk instead of app-debug.apk
    #[arg(short, long, global = true)]
    pub release: bool,

    /// Java launcher used to run the signer
    #[arg(long, global = true, env = "FLASHABLE_JAVA", value_name = "PATH")]
    pub java: Option<PathBuf>,

    /// Zip signer jar
    #[arg(long, global = true, env = "FLASHABLE_SIGNER_JAR", value_name = "PATH")]
    pub signer_jar: Option<PathBuf>,

    /// Signing certificate (X.509 PEM)
    #[arg(long, global = true, env = "FLASHABLE_PUBLIC_KEY", value_name = "PATH")]
    pub public_key: Option<PathBuf>,

    /// Signing key (PKCS#8)
    #[arg(long, global = true, env = "FLASHABLE_PRIVATE_KEY", value_name = "PATH")]
    pub private_key: Option<PathBuf>,

    /// External zipadjust binary; the built-in adjuster is used otherwise
    #[arg(long, global = true, env = "FLASHABLE_ZIPADJUST", value_name = "PATH")]
    pub zipadjust: Option<PathBuf>,

    /// Print a JSON summary of the created packages on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Show per-step details
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// What to build.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build the flashable installer zip
    Zip {
        /// Version string, e.g. 24.0
        version: String,
        /// Integer version code, e.g. 24000
        version_code: u32,
    },
    /// Build the flashable uninstaller zip
    Uninstaller,
    /// Build the installer and then the uninstaller
    All {
        /// Version string, e.g. 24.0
        version: String,
        /// Integer version code, e.g. 24000
        version_code: u32,
    },
    /// Delete every .zip in the output directory
    Clean,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.root.as_os_str().is_empty() {
            return Err("Root cannot be empty".to_string());
        }
        if let Some(version) = self.version() {
            version.map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// Version info of `zip` and `all`.
    pub fn version(&self) -> Option<crate::bundler::Result<VersionInfo>> {
        match &self.command {
            Command::Zip {
                version,
                version_code,
            }
            | Command::All {
                version,
                version_code,
            } => Some(VersionInfo::new(version.as_str(), *version_code)),
            Command::Uninstaller | Command::Clean => None,
        }
    }

    /// Applies flags that were given on top of `builder`.
    pub fn apply(&self, mut builder: SettingsBuilder) -> SettingsBuilder {
        builder = builder.root(&self.root);
        if self.release {
            builder = builder.release(true);
        }
        if let Some(path) = &self.out_dir {
            builder = builder.out_dir(path);
        }
        if let Some(path) = &self.scratch_dir {
            builder = builder.scratch_dir(path);
        }
        if let Some(path) = &self.java {
            builder = builder.java(path);
        }
        if let Some(path) = &self.signer_jar {
            builder = builder.signer_jar(path);
        }
        if let Some(path) = &self.public_key {
            builder = builder.public_key(path);
        }
        if let Some(path) = &self.private_key {
            builder = builder.private_key(path);
        }
        if let Some(path) = &self.zipadjust {
            builder = builder.zipadjust(path);
        }
        builder
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
    json: bool,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        // JSON on stdout must not be interleaved with status lines.
        let output = super::OutputManager::new(args.verbose, args.quiet || args.json);

        Self {
            output,
            json: args.json,
        }
    }
}

impl RuntimeConfig {
    /// Whether a JSON summary was requested
    pub fn json(&self) -> bool {
        self.json
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
