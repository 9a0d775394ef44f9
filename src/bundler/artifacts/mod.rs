//! Prebuilt inputs of a flashable package.
//!
//! An [`ArtifactSet`] is gathered once per package from the paths in
//! [`Settings`]. Every required path is checked before a single byte is read, so a
//! missing binary is reported before any archive exists.

use crate::bundler::{
    error::{Error, ErrorExt, Producer, Result},
    settings::{Arch, Settings},
};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Native binaries built once per architecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeBinary {
    /// Early init replacement
    MagiskInit,
    /// Boot image tool
    MagiskBoot,
    /// Minimal base64/xz decoder used by the bootstrap script
    B64Xz,
    /// General purpose utility binary
    Busybox,
}

impl NativeBinary {
    /// File name in the build output and in the archive.
    pub fn file_name(self) -> &'static str {
        match self {
            NativeBinary::MagiskInit => "magiskinit",
            NativeBinary::MagiskBoot => "magiskboot",
            NativeBinary::B64Xz => "b64xz",
            NativeBinary::Busybox => "busybox",
        }
    }
}

/// Identity of one required input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactId {
    /// `out/<arch>/<binary>`
    Binary(NativeBinary, Arch),
    /// The application package for the configured flavor.
    Apk,
    /// `scripts/<name>`
    Script(&'static str),
    /// A file at the same relative path in the tree and in the archive.
    Prebuilt(&'static str),
}

impl ArtifactId {
    /// Name used in logs and errors.
    pub fn logical_name(&self) -> &'static str {
        match self {
            ArtifactId::Binary(binary, _) => binary.file_name(),
            ArtifactId::Apk => "magisk.apk",
            ArtifactId::Script(name) | ArtifactId::Prebuilt(name) => *name,
        }
    }

    /// Architecture, for native binaries.
    pub fn arch(&self) -> Option<Arch> {
        match self {
            ArtifactId::Binary(_, arch) => Some(*arch),
            _ => None,
        }
    }

    /// Build step that produces this input.
    pub fn producer(&self) -> Producer {
        match self {
            ArtifactId::Binary(..) => Producer::Binary,
            ArtifactId::Apk => Producer::Apk,
            ArtifactId::Script(_) | ArtifactId::Prebuilt(_) => Producer::SourceTree,
        }
    }

    /// Location on disk.
    pub fn path(&self, settings: &Settings) -> PathBuf {
        match self {
            ArtifactId::Binary(binary, arch) => settings.binary_path(*arch, binary.file_name()),
            ArtifactId::Apk => settings.apk_path(),
            ArtifactId::Script(name) => settings.script_path(name),
            ArtifactId::Prebuilt(relative) => settings.source_path(relative),
        }
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arch() {
            Some(arch) => write!(f, "{} ({arch})", self.logical_name()),
            None => f.write_str(self.logical_name()),
        }
    }
}

/// A prebuilt input read into memory.
#[derive(Clone, Debug)]
pub struct Artifact {
    id: ArtifactId,
    bytes: Vec<u8>,
    source_path: PathBuf,
}

impl Artifact {
    /// Wraps bytes that were read from `source_path`.
    pub fn new(id: ArtifactId, bytes: Vec<u8>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            bytes,
            source_path: source_path.into(),
        }
    }

    /// Identity of the artifact.
    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    /// Name used in logs and errors.
    pub fn logical_name(&self) -> &'static str {
        self.id.logical_name()
    }

    /// Architecture, for native binaries.
    pub fn arch(&self) -> Option<Arch> {
        self.id.arch()
    }

    /// File contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Where the bytes came from.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}

/// Immutable collection of the inputs of one package.
#[derive(Clone, Debug, Default)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    /// Reads every artifact in `required`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArtifact`] for the first path (in `required` order)
    /// that is not a regular file. Nothing is read until all paths are present.
    pub async fn gather(settings: &Settings, required: &[ArtifactId]) -> Result<Self> {
        let mut located = Vec::with_capacity(required.len());

        for id in required {
            let path = id.path(settings);
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);

            if !is_file {
                return Err(Error::MissingArtifact {
                    path,
                    producer: id.producer(),
                });
            }
            located.push((id.clone(), path));
        }

        let mut artifacts = Vec::with_capacity(located.len());
        for (id, path) in located {
            let bytes = tokio::fs::read(&path)
                .await
                .fs_context("reading artifact", &path)?;
            log::debug!("Read {} from {} ({} bytes)", id, path.display(), bytes.len());
            artifacts.push(Artifact::new(id, bytes, path));
        }

        Ok(Self { artifacts })
    }

    /// Builds a set from artifacts that are already in memory.
    pub fn from_artifacts(artifacts: impl IntoIterator<Item = Artifact>) -> Self {
        Self {
            artifacts: artifacts.into_iter().collect(),
        }
    }

    /// Looks up an artifact by identity.
    pub fn get(&self, id: &ArtifactId) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.id() == id)
    }

    /// Looks up a native binary.
    pub fn binary(&self, binary: NativeBinary, arch: Arch) -> Option<&Artifact> {
        self.get(&ArtifactId::Binary(binary, arch))
    }

    /// Artifacts in gathering order.
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    /// Number of artifacts.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::SettingsBuilder;

    fn write(root: &Path, relative: &str, contents: &[u8]) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn gathers_in_requested_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "out/armeabi-v7a/busybox", b"bb-arm");
        write(dir.path(), "scripts/boot_patch.sh", b"#!/bin/sh\n");
        let settings = SettingsBuilder::new().root(dir.path()).build().unwrap();

        let required = [
            ArtifactId::Script("boot_patch.sh"),
            ArtifactId::Binary(NativeBinary::Busybox, Arch::Arm),
        ];
        let set = ArtifactSet::gather(&settings, &required).await.unwrap();

        let names: Vec<_> = set.iter().map(|a| a.logical_name()).collect();
        assert_eq!(names, ["boot_patch.sh", "busybox"]);
        assert_eq!(
            set.binary(NativeBinary::Busybox, Arch::Arm).unwrap().bytes(),
            b"bb-arm"
        );
        assert!(set.binary(NativeBinary::Busybox, Arch::X86).is_none());
    }

    #[tokio::test]
    async fn reports_first_missing_artifact_with_its_producer() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "scripts/boot_patch.sh", b"#!/bin/sh\n");
        let settings = SettingsBuilder::new().root(dir.path()).build().unwrap();

        let required = [
            ArtifactId::Script("boot_patch.sh"),
            ArtifactId::Binary(NativeBinary::MagiskInit, Arch::X64),
            ArtifactId::Apk,
        ];
        let err = ArtifactSet::gather(&settings, &required).await.unwrap_err();

        match err {
            Error::MissingArtifact { path, producer } => {
                assert_eq!(path, dir.path().join("out/x86_64/magiskinit"));
                assert_eq!(producer, Producer::Binary);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn directories_do_not_count_as_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("out/app-debug.apk")).unwrap();
        let settings = SettingsBuilder::new().root(dir.path()).build().unwrap();

        let err = ArtifactSet::gather(&settings, &[ArtifactId::Apk])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingArtifact {
                producer: Producer::Apk,
                ..
            }
        ));
    }
}
