//! Source tree fixtures for packaging tests.
#![allow(dead_code)]

use flashable_bundler::bundler::{
    PackageKind, Settings, SettingsBuilder,
    artifacts::{ArtifactId, NativeBinary},
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Project tree with every packaging input, the signer files and a scratch dir.
pub struct Fixture {
    pub root: TempDir,
    pub scratch: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let fixture = Self {
            root: tempfile::tempdir().unwrap(),
            scratch: tempfile::tempdir().unwrap(),
        };

        let settings = fixture.settings();
        for kind in [PackageKind::Installer, PackageKind::Uninstaller] {
            for id in kind.required_artifacts() {
                write(&id.path(&settings), &contents(&id));
            }
        }
        for key in [
            "crypto/build/libs/zipsigner-1.1.jar",
            "ziptools/public.certificate.x509.pem",
            "ziptools/private.key.pk8",
        ] {
            write(&fixture.path(key), key.as_bytes());
        }
        fixture
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.path("out")
    }

    pub fn settings(&self) -> Settings {
        SettingsBuilder::new()
            .root(self.root.path())
            .scratch_dir(self.scratch.path())
            .build()
            .unwrap()
    }

    pub fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch.path()).unwrap().next().is_none()
    }

    /// Zips in the output directory.
    pub fn packages(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(self.out_dir()) else {
            return Vec::new();
        };
        let mut zips: Vec<_> = entries
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "zip"))
            .collect();
        zips.sort();
        zips
    }

    /// Shell script that behaves like `java -jar zipsigner.jar [-m] pub priv in out`.
    #[cfg(unix)]
    pub fn fake_java(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.path("bin/java");
        write(
            &path,
            concat!(
                "#!/bin/sh\n",
                "shift 2\n",
                "[ \"$1\" = \"-m\" ] && shift\n",
                "cp \"$3\" \"$4\" && printf 'SIGNATURE' >> \"$4\"\n",
            )
            .as_bytes(),
        );
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

/// Deterministic, distinguishable contents per input.
pub fn contents(id: &ArtifactId) -> Vec<u8> {
    match id {
        ArtifactId::Script("util_functions.sh") => {
            b"#!/system/bin/sh\nMAGISK_VERSION_STUB\nBOOTMODE=false\n".to_vec()
        }
        ArtifactId::Binary(NativeBinary::Busybox, arch) => {
            format!("busybox for {arch}\n").repeat(200).into_bytes()
        }
        other => format!("contents of {other}\n").into_bytes(),
    }
}

pub fn write(path: &Path, contents: &[u8]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}
