//! Main bundler orchestration and coordination.
//!
//! This module provides the [`Bundler`] orchestrator that turns prebuilt
//! artifacts into signed flashable packages.

use super::{checksum::calculate_sha256, signing::setup_signing};
use crate::bundler::{
    Result, Settings,
    artifacts::ArtifactSet,
    error::ErrorExt,
    flashable::{self, ArchiveEntry, PackageKind},
    settings::VersionInfo,
    signing::{Adjuster, ArchiveSigner, SigningPipeline, StructuralAdjuster, ZipSignerJar},
    utils::fs,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A published package.
#[derive(Debug, Clone, Serialize)]
pub struct BundledPackage {
    /// Which package this is
    pub kind: PackageKind,
    /// Where it was written
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Hex-encoded SHA-256
    pub checksum: String,
    /// Archive contents in central directory order
    pub entries: Vec<PackedEntry>,
}

/// One file of a published package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackedEntry {
    /// Path inside the archive
    pub archive_path: String,
    /// File it was built from
    pub source: Option<PathBuf>,
}

impl From<&ArchiveEntry> for PackedEntry {
    fn from(entry: &ArchiveEntry) -> Self {
        Self {
            archive_path: entry.archive_path.clone(),
            source: entry.source.clone(),
        }
    }
}

/// Main bundler orchestrator.
///
/// Each packaging call gathers its inputs, assembles the archive in the scratch
/// directory, runs the signing pipeline and publishes the result under the
/// output directory. A failed call never leaves a file at the output path.
///
/// # Examples
///
/// ```no_run
/// use flashable_bundler::bundler::{Bundler, SettingsBuilder, VersionInfo};
///
/// # async fn example() -> flashable_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new().root("/src/magisk").build()?;
/// let bundler = Bundler::new(settings)?;
///
/// let package = bundler.bundle_installer(&VersionInfo::new("24.0", 24000)?).await?;
/// println!("Created: {} ({} bytes)", package.path.display(), package.size);
/// println!("SHA256: {}", package.checksum);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler<S = ZipSignerJar, A = Adjuster> {
    settings: Settings,
    pipeline: SigningPipeline<S, A>,
}

impl Bundler {
    /// Creates a bundler that signs with the configured jar and keys.
    ///
    /// # Errors
    ///
    /// Fails if the signer jar, keys or Java launcher cannot be found.
    pub fn new(settings: Settings) -> Result<Self> {
        let pipeline = setup_signing(&settings)?;
        Ok(Self { settings, pipeline })
    }
}

impl<S: ArchiveSigner, A: StructuralAdjuster> Bundler<S, A> {
    /// Creates a bundler with a custom signing pipeline.
    pub fn with_pipeline(settings: Settings, pipeline: SigningPipeline<S, A>) -> Self {
        Self { settings, pipeline }
    }

    /// Returns a reference to the bundler settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Builds `<out>/<product>-v<version>.zip`.
    pub async fn bundle_installer(&self, version: &VersionInfo) -> Result<BundledPackage> {
        let kind = PackageKind::Installer;
        let artifacts = ArtifactSet::gather(&self.settings, &kind.required_artifacts()).await?;
        let entries = flashable::installer_entries(&artifacts, version)?;

        self.publish(kind, entries, self.settings.installer_output(version))
            .await
    }

    /// Builds `<out>/<product>-uninstaller-<YYYYMMDD>.zip` stamped with today's
    /// local date.
    pub async fn bundle_uninstaller(&self) -> Result<BundledPackage> {
        self.bundle_uninstaller_dated(chrono::Local::now().date_naive())
            .await
    }

    /// Builds the uninstaller stamped with `date`.
    pub async fn bundle_uninstaller_dated(&self, date: NaiveDate) -> Result<BundledPackage> {
        let kind = PackageKind::Uninstaller;
        let artifacts = ArtifactSet::gather(&self.settings, &kind.required_artifacts()).await?;
        let entries = flashable::uninstaller_entries(&artifacts)?;

        self.publish(kind, entries, self.settings.uninstaller_output(date))
            .await
    }

    /// Builds the installer, then the uninstaller.
    ///
    /// Stops at the first failure; a published installer is kept.
    pub async fn bundle_all(&self, version: &VersionInfo) -> Result<Vec<BundledPackage>> {
        let installer = self.bundle_installer(version).await?;
        let uninstaller = self.bundle_uninstaller().await?;
        Ok(vec![installer, uninstaller])
    }

    async fn publish(
        &self,
        kind: PackageKind,
        entries: Vec<ArchiveEntry>,
        output: PathBuf,
    ) -> Result<BundledPackage> {
        log::info!("{}", kind.title());

        fs::create_dir_all(self.settings.out_dir()).await?;
        fs::create_dir_all(self.pipeline.scratch_dir()).await?;

        let packed: Vec<PackedEntry> = entries.iter().map(PackedEntry::from).collect();
        let unsigned = flashable::assemble(entries, self.pipeline.scratch_dir()).await?;
        let path = self.pipeline.run(unsigned, &output).await?;

        let size = tokio::fs::metadata(&path)
            .await
            .fs_context("reading package metadata", &path)?
            .len();
        let checksum = calculate_sha256(&path).await?;

        log::info!("Output: {} ({} bytes)", path.display(), size);

        Ok(BundledPackage {
            kind,
            path,
            size,
            checksum,
            entries: packed,
        })
    }
}

/// Deletes every `.zip` directly inside the output directory.
///
/// Returns the removed paths. A missing output directory removes nothing.
pub async fn clean(settings: &Settings) -> Result<Vec<PathBuf>> {
    clean_dir(settings.out_dir()).await
}

async fn clean_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let packages = fs::files_with_extension(dir, "zip").await?;
    for path in &packages {
        log::info!("rm {}", path.display());
        fs::remove_file(path).await?;
    }
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{SettingsBuilder, signing::TrailerAdjuster};

    #[tokio::test]
    async fn clean_removes_only_packages() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("Magisk-v24.0.zip"), b"").unwrap();
        std::fs::write(out.join("Magisk-uninstaller-20220301.zip"), b"").unwrap();
        std::fs::write(out.join("app-debug.apk"), b"").unwrap();

        let settings = SettingsBuilder::new().root(dir.path()).build().unwrap();
        let removed = clean(&settings).await.unwrap();

        assert_eq!(removed.len(), 2);
        assert!(out.join("app-debug.apk").exists());
        assert!(!out.join("Magisk-v24.0.zip").exists());
    }

    #[tokio::test]
    async fn missing_artifact_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let settings = SettingsBuilder::new()
            .root(dir.path())
            .scratch_dir(scratch.path())
            .build()
            .unwrap();
        let pipeline = SigningPipeline::new(
            ZipSignerJar::new("java", "signer.jar", "pub", "priv"),
            TrailerAdjuster,
            scratch.path(),
        );
        let bundler = Bundler::with_pipeline(settings, pipeline);

        let err = bundler.bundle_uninstaller().await.unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert!(!dir.path().join("out").exists());
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }
}
