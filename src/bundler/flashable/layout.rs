//! Entry lists of the installer and uninstaller packages.
//!
//! Order matters: it becomes the central directory order, and recovery
//! environments look for `update-binary` first.

use super::stub;
use crate::bundler::{
    artifacts::{Artifact, ArtifactId, ArtifactSet, NativeBinary},
    bootstrap,
    error::{Context, Result},
    settings::{Arch, VersionInfo},
};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;

/// Recovery entry point; recovery executes it as the installer.
pub const UPDATE_BINARY_PATH: &str = "META-INF/com/google/android/update-binary";
/// Declarative script slot; ours only defers to `update-binary`.
pub const UPDATER_SCRIPT_PATH: &str = "META-INF/com/google/android/updater-script";

const UPDATE_BINARY_TEMPLATE: &str = "update_binary.sh";
const FLASH_SCRIPT: &str = "flash_script.sh";
const UNINSTALLER_LOADER: &str = "uninstaller_loader.sh";
const UNINSTALLER_SCRIPT: &str = "magisk_uninstaller.sh";
const BOOT_PATCH: &str = "boot_patch.sh";
const UTIL_FUNCTIONS: &str = "util_functions.sh";
const ADDON_D: &str = "addon.d.sh";

/// Key material used by the ChromeOS verified boot helper.
const CHROMEOS_PREBUILTS: [&str; 3] = [
    "chromeos/futility",
    "chromeos/kernel_data_key.vbprivk",
    "chromeos/kernel.keyblock",
];

/// The two packages the bundler produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// Version-stamped flashable installer.
    Installer,
    /// Date-stamped flashable uninstaller.
    Uninstaller,
}

impl PackageKind {
    /// Section title shown while packing.
    pub fn title(self) -> &'static str {
        match self {
            PackageKind::Installer => "Packing Flashable Zip",
            PackageKind::Uninstaller => "Packing Uninstaller Zip",
        }
    }

    /// Every input the package needs, in entry order.
    pub fn required_artifacts(self) -> Vec<ArtifactId> {
        let mut required = bootstrap_artifacts();

        match self {
            PackageKind::Installer => {
                required.push(ArtifactId::Script(FLASH_SCRIPT));
                for arch in Arch::ALL {
                    required.push(ArtifactId::Binary(NativeBinary::MagiskInit, arch));
                    required.push(ArtifactId::Binary(NativeBinary::MagiskBoot, arch));
                }
                required.push(ArtifactId::Apk);
                required.push(ArtifactId::Script(BOOT_PATCH));
                required.push(ArtifactId::Script(UTIL_FUNCTIONS));
                required.push(ArtifactId::Script(ADDON_D));
            }
            PackageKind::Uninstaller => {
                required.push(ArtifactId::Script(UNINSTALLER_LOADER));
                for arch in Arch::ALL {
                    required.push(ArtifactId::Binary(NativeBinary::MagiskBoot, arch));
                }
                required.push(ArtifactId::Script(UNINSTALLER_SCRIPT));
                required.push(ArtifactId::Script(UTIL_FUNCTIONS));
            }
        }

        required.extend(CHROMEOS_PREBUILTS.map(ArtifactId::Prebuilt));
        required
    }
}

fn bootstrap_artifacts() -> Vec<ArtifactId> {
    let mut ids: Vec<_> = Arch::BOOTSTRAP
        .into_iter()
        .flat_map(|arch| {
            [
                ArtifactId::Binary(NativeBinary::B64Xz, arch),
                ArtifactId::Binary(NativeBinary::Busybox, arch),
            ]
        })
        .collect();
    ids.push(ArtifactId::Script(UPDATE_BINARY_TEMPLATE));
    ids
}

/// One file in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Forward-slash path inside the archive.
    pub archive_path: String,
    /// Uncompressed contents.
    pub payload: Vec<u8>,
    /// Per-entry compression.
    pub compression: CompressionMethod,
    /// Unix permission bits recorded in the central directory.
    pub unix_mode: u32,
    /// File the payload was built from, for progress output.
    pub source: Option<PathBuf>,
}

impl ArchiveEntry {
    /// A deflated, non-executable entry.
    pub fn new(archive_path: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            archive_path: archive_path.into(),
            payload,
            compression: CompressionMethod::Deflated,
            unix_mode: 0o644,
            source: None,
        }
    }

    /// Records where the payload came from.
    pub fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    /// Marks the entry executable.
    pub fn executable(mut self) -> Self {
        self.unix_mode = 0o755;
        self
    }
}

/// Entries of the installer package.
pub fn installer_entries(
    artifacts: &ArtifactSet,
    version: &VersionInfo,
) -> Result<Vec<ArchiveEntry>> {
    let mut entries = recovery_entries(artifacts, FLASH_SCRIPT)?;

    for arch in Arch::ALL {
        for binary in [NativeBinary::MagiskInit, NativeBinary::MagiskBoot] {
            entries.push(binary_entry(artifacts, binary, arch)?);
        }
    }

    let apk = require(artifacts, &ArtifactId::Apk)?;
    entries.push(
        ArchiveEntry::new("common/magisk.apk", apk.bytes().to_vec()).with_source(apk.source_path()),
    );
    entries.push(script_entry(artifacts, BOOT_PATCH, "common/boot_patch.sh")?);

    let util_functions = require(artifacts, &ArtifactId::Script(UTIL_FUNCTIONS))?;
    entries.push(
        ArchiveEntry::new(
            "common/util_functions.sh",
            stub::inject_version(util_functions.bytes(), version),
        )
        .with_source(util_functions.source_path()),
    );

    entries.push(script_entry(artifacts, ADDON_D, "addon.d/99-magisk.sh")?);
    entries.extend(prebuilt_entries(artifacts)?);

    Ok(entries)
}

/// Entries of the uninstaller package.
pub fn uninstaller_entries(artifacts: &ArtifactSet) -> Result<Vec<ArchiveEntry>> {
    let mut entries = recovery_entries(artifacts, UNINSTALLER_LOADER)?;

    for arch in Arch::ALL {
        entries.push(binary_entry(artifacts, NativeBinary::MagiskBoot, arch)?);
    }

    entries.push(script_entry(artifacts, UNINSTALLER_SCRIPT, UNINSTALLER_SCRIPT)?);

    let util_functions = require(artifacts, &ArtifactId::Script(UTIL_FUNCTIONS))?;
    entries.push(
        ArchiveEntry::new(UTIL_FUNCTIONS, stub::strip_version(util_functions.bytes()))
            .with_source(util_functions.source_path()),
    );

    entries.extend(prebuilt_entries(artifacts)?);

    Ok(entries)
}

fn recovery_entries(
    artifacts: &ArtifactSet,
    updater_script: &'static str,
) -> Result<Vec<ArchiveEntry>> {
    let control = require(artifacts, &ArtifactId::Script(UPDATE_BINARY_TEMPLATE))?;
    let update_binary = bootstrap::generate_update_binary(artifacts, control.bytes())?;

    Ok(vec![
        ArchiveEntry::new(UPDATE_BINARY_PATH, update_binary)
            .executable()
            .with_source(control.source_path()),
        script_entry(artifacts, updater_script, UPDATER_SCRIPT_PATH)?,
    ])
}

fn binary_entry(artifacts: &ArtifactSet, binary: NativeBinary, arch: Arch) -> Result<ArchiveEntry> {
    let artifact = require(artifacts, &ArtifactId::Binary(binary, arch))?;
    Ok(ArchiveEntry::new(
        format!("{}/{}", arch.zip_dir(), binary.file_name()),
        artifact.bytes().to_vec(),
    )
    .executable()
    .with_source(artifact.source_path()))
}

fn script_entry(
    artifacts: &ArtifactSet,
    script: &'static str,
    archive_path: &str,
) -> Result<ArchiveEntry> {
    let artifact = require(artifacts, &ArtifactId::Script(script))?;
    Ok(ArchiveEntry::new(archive_path, artifact.bytes().to_vec())
        .with_source(artifact.source_path()))
}

fn prebuilt_entries(artifacts: &ArtifactSet) -> Result<Vec<ArchiveEntry>> {
    CHROMEOS_PREBUILTS
        .into_iter()
        .map(|path| {
            let artifact = require(artifacts, &ArtifactId::Prebuilt(path))?;
            Ok(ArchiveEntry::new(path, artifact.bytes().to_vec())
                .with_source(artifact.source_path()))
        })
        .collect()
}

fn require<'a>(artifacts: &'a ArtifactSet, id: &ArtifactId) -> Result<&'a Artifact> {
    artifacts
        .get(id)
        .with_context(|| format!("{id} was not gathered for this package"))
}
