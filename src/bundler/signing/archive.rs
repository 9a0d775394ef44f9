//! Archive handles that encode how far through signing a file has come.
//!
//! Each handle owns a temporary file. A transition consumes the handle and
//! returns one for the next stage, so stages can only run in order, and every
//! intermediate file is deleted as soon as it is superseded or on error.

use super::{ArchiveSigner, StructuralAdjuster};
use crate::bundler::error::{Error, ErrorExt, Result, SigningStage};
use std::{
    fmt,
    marker::PhantomData,
    path::{Path, PathBuf},
};
use tempfile::TempPath;

mod sealed {
    pub trait Sealed {}
}

/// Marker for signing stages.
pub trait Stage: sealed::Sealed {
    /// Short name used for scratch file prefixes and logs.
    const NAME: &'static str;
}

/// Freshly assembled, no signature.
#[derive(Debug)]
pub struct Unsigned;
/// Signed once.
#[derive(Debug)]
pub struct Signed;
/// Trailer fixed up after the first signature.
#[derive(Debug)]
pub struct Adjusted;
/// Signed over the adjusted archive; ready to publish.
#[derive(Debug)]
pub struct FinalSigned;

macro_rules! stage {
    ($ty:ty, $name:literal) => {
        impl sealed::Sealed for $ty {}
        impl Stage for $ty {
            const NAME: &'static str = $name;
        }
    };
}

stage!(Unsigned, "unsigned");
stage!(Signed, "signed");
stage!(Adjusted, "adjusted");
stage!(FinalSigned, "final");

/// A zip archive at stage `S`.
pub struct Archive<S: Stage> {
    path: TempPath,
    _stage: PhantomData<S>,
}

impl<S: Stage> fmt::Debug for Archive<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("stage", &S::NAME)
            .field("path", &self.path())
            .finish()
    }
}

impl<S: Stage> Archive<S> {
    fn from_temp(path: TempPath) -> Self {
        Self {
            path,
            _stage: PhantomData,
        }
    }

    /// Current location of the archive.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Archive<Unsigned> {
    /// Takes ownership of a freshly written archive.
    pub fn from_temp_path(path: TempPath) -> Self {
        Self::from_temp(path)
    }

    /// Runs the first signing pass.
    pub async fn sign<S: ArchiveSigner>(
        self,
        signer: &S,
        scratch_dir: &Path,
    ) -> Result<Archive<Signed>> {
        let next =
            stage_file::<Signed>(scratch_dir).map_err(|e| e.at_stage(SigningStage::Sign))?;
        signer
            .sign(self.path(), &next)
            .await
            .map_err(|e| e.at_stage(SigningStage::Sign))?;
        ensure_written(&next, SigningStage::Sign).await?;
        Ok(Archive::from_temp(next))
    }
}

impl Archive<Signed> {
    /// Repairs the trailer so the archive can be signed again.
    pub async fn adjust<A: StructuralAdjuster>(
        self,
        adjuster: &A,
        scratch_dir: &Path,
    ) -> Result<Archive<Adjusted>> {
        let next =
            stage_file::<Adjusted>(scratch_dir).map_err(|e| e.at_stage(SigningStage::Adjust))?;
        adjuster
            .adjust(self.path(), &next)
            .await
            .map_err(|e| e.at_stage(SigningStage::Adjust))?;
        ensure_written(&next, SigningStage::Adjust).await?;
        Ok(Archive::from_temp(next))
    }
}

impl Archive<Adjusted> {
    /// Runs the second signing pass.
    ///
    /// The result is staged in `output_dir` so publishing it is a rename on the
    /// same file system.
    pub async fn resign<S: ArchiveSigner>(
        self,
        signer: &S,
        output_dir: &Path,
    ) -> Result<Archive<FinalSigned>> {
        let next =
            stage_file::<FinalSigned>(output_dir).map_err(|e| e.at_stage(SigningStage::Resign))?;
        signer
            .resign(self.path(), &next)
            .await
            .map_err(|e| e.at_stage(SigningStage::Resign))?;
        ensure_written(&next, SigningStage::Resign).await?;
        Ok(Archive::from_temp(next))
    }
}

impl Archive<FinalSigned> {
    /// Moves the archive to `output`, replacing any previous file there.
    ///
    /// Scratch files are created owner-only; the published package is made
    /// world-readable first.
    pub fn persist(self, output: &Path) -> Result<PathBuf> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::Permissions::from_mode(PUBLISHED_MODE);
            std::fs::set_permissions(&self.path, mode)
                .fs_context("setting permissions on", self.path.to_path_buf())?;
        }
        self.path.persist(output).map_err(|e| Error::Fs {
            context: "publishing signed archive to",
            path: output.to_path_buf(),
            error: e.error,
        })?;
        Ok(output.to_path_buf())
    }
}

/// Mode of a published package.
#[cfg(unix)]
const PUBLISHED_MODE: u32 = 0o644;

/// Reserves a scratch file for stage `S` in `dir`.
///
/// Names end in `.partial`, so a leftover is never mistaken for a package.
fn stage_file<S: Stage>(dir: &Path) -> Result<TempPath> {
    let file = tempfile::Builder::new()
        .prefix(&format!(".flashable-{}-", S::NAME))
        .suffix(".partial")
        .tempfile_in(dir)
        .fs_context("creating scratch archive in", dir)?;
    Ok(file.into_temp_path())
}

async fn ensure_written(path: &Path, stage: SigningStage) -> Result<()> {
    let len = tokio::fs::metadata(path)
        .await
        .fs_context("inspecting", path)
        .map_err(|e| e.at_stage(stage))?
        .len();
    if len == 0 {
        return Err(Error::SigningFailed {
            stage,
            reason: format!("{} is empty", path.display()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_files_are_hidden_partials() {
        let dir = tempfile::tempdir().unwrap();
        let path = stage_file::<Signed>(dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();

        assert!(name.starts_with(".flashable-signed-"));
        assert!(name.ends_with(".partial"));
        assert!(path.exists());

        let kept = path.to_path_buf();
        drop(path);
        assert!(!kept.exists());
    }

    #[test]
    fn persist_moves_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let temp = stage_file::<FinalSigned>(dir.path()).unwrap();
        std::fs::write(&temp, b"PK").unwrap();

        let output = dir.path().join("Magisk-v24.0.zip");
        let archive = Archive::<FinalSigned>::from_temp(temp);
        assert_eq!(archive.persist(&output).unwrap(), output);
        assert_eq!(std::fs::read(&output).unwrap(), b"PK");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn persisted_package_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let temp = stage_file::<FinalSigned>(dir.path()).unwrap();
        std::fs::write(&temp, b"PK").unwrap();
        assert_eq!(std::fs::metadata(&temp).unwrap().permissions().mode() & 0o777, 0o600);

        let output = dir.path().join("Magisk-v24.0.zip");
        Archive::<FinalSigned>::from_temp(temp).persist(&output).unwrap();

        let mode = std::fs::metadata(&output).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
