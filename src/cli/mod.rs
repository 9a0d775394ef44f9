//! Command line interface for the flashable bundler.
//!
//! This module wires argument parsing, configuration layering and user
//! feedback around [`Bundler`](crate::bundler::Bundler).

mod args;
mod output;

pub use args::{Args, Command, RuntimeConfig};
pub use output::OutputManager;

use crate::bundler::{
    self, BundledPackage, Bundler, PackageKind, Settings, SettingsBuilder, VersionInfo,
};
use crate::error::{CliError, Result};
use crate::metadata;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let runtime = RuntimeConfig::from(&args);
    execute(&args, &runtime).await
}

/// Runs a parsed command.
pub async fn execute(args: &Args, runtime: &RuntimeConfig) -> Result<i32> {
    let settings = load_settings(args)?;
    runtime.verbose_println(&format!("Project root: {}", settings.root().display()))?;
    runtime.verbose_println(&format!(
        "Output directory: {}",
        settings.out_dir().display()
    ))?;

    let packages = match &args.command {
        Command::Clean => {
            runtime.section("Cleaning")?;
            let removed = bundler::clean(&settings).await?;
            if removed.is_empty() {
                runtime.warn(&format!("no packages in {}", settings.out_dir().display()))?;
            }
            for path in removed {
                runtime.indent(&format!("rm {}", path.display()))?;
            }
            return Ok(0);
        }
        Command::Zip { .. } => {
            let version = require_version(args)?;
            let bundler = preflight(settings, runtime)?;
            runtime.section(PackageKind::Installer.title())?;
            runtime.progress(&format!("Packing version {}", version.version_string()))?;
            vec![bundler.bundle_installer(&version).await?]
        }
        Command::Uninstaller => {
            let bundler = preflight(settings, runtime)?;
            runtime.section(PackageKind::Uninstaller.title())?;
            runtime.progress("Packing uninstaller")?;
            vec![bundler.bundle_uninstaller().await?]
        }
        Command::All { .. } => {
            let version = require_version(args)?;
            let bundler = preflight(settings, runtime)?;
            runtime.section("Packing Flashable Zips")?;
            runtime.progress(&format!(
                "Packing version {} and uninstaller",
                version.version_string()
            ))?;
            bundler.bundle_all(&version).await?
        }
    };

    report(&packages, runtime)?;
    Ok(0)
}

fn load_settings(args: &Args) -> Result<Settings> {
    let config = metadata::discover_config(&args.root, args.config.as_deref())?;
    let builder = args.apply(config.apply(SettingsBuilder::new()));
    Ok(builder.build()?)
}

fn preflight(settings: Settings, runtime: &RuntimeConfig) -> Result<Bundler> {
    runtime.progress("Checking signer, keys and Java")?;
    Ok(Bundler::new(settings)?)
}

fn require_version(args: &Args) -> Result<VersionInfo> {
    match args.version() {
        Some(version) => Ok(version?),
        None => Err(CliError::InvalidArguments {
            reason: "this command takes a version".to_string(),
        }
        .into()),
    }
}

fn report(packages: &[BundledPackage], runtime: &RuntimeConfig) -> Result<()> {
    if runtime.json() {
        println!("{}", serde_json::to_string_pretty(packages)?);
        return Ok(());
    }

    for package in packages {
        for entry in &package.entries {
            let line = match &entry.source {
                Some(source) => format!("zip: {} -> {}", source.display(), entry.archive_path),
                None => format!("zip: {}", entry.archive_path),
            };
            runtime.verbose_println(&line)?;
        }
        runtime.success(&format!("Output: {}", package.path.display()))?;
        runtime.indent(&format!("size: {} bytes", package.size))?;
        runtime.indent(&format!("sha256: {}", package.checksum))?;
    }
    Ok(())
}
