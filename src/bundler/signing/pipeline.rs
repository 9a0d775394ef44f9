//! Sign, adjust, sign again.

use super::{Archive, ArchiveSigner, StructuralAdjuster, Unsigned};
use crate::bundler::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Drives an unsigned archive through both signing passes and publishes it.
#[derive(Debug, Clone)]
pub struct SigningPipeline<S, A> {
    signer: S,
    adjuster: A,
    scratch_dir: PathBuf,
}

impl<S: ArchiveSigner, A: StructuralAdjuster> SigningPipeline<S, A> {
    /// Creates a pipeline that keeps intermediates in `scratch_dir`.
    pub fn new(signer: S, adjuster: A, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            signer,
            adjuster,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Directory for intermediate archives.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Signs `unsigned` and moves the result to `output`.
    ///
    /// Nothing is written at `output` unless every stage succeeds. Intermediate
    /// files are removed whether or not it does.
    pub async fn run(&self, unsigned: Archive<Unsigned>, output: &Path) -> Result<PathBuf> {
        let output_dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        if !output_dir.is_dir() {
            return Err(Error::GenericError(format!(
                "output directory {} does not exist",
                output_dir.display()
            )));
        }

        log::info!("Signing {}", output.display());
        let signed = unsigned.sign(&self.signer, &self.scratch_dir).await?;

        log::debug!("Adjusting {}", signed.path().display());
        let adjusted = signed.adjust(&self.adjuster, &self.scratch_dir).await?;

        log::debug!("Re-signing {}", adjusted.path().display());
        let final_signed = adjusted.resign(&self.signer, output_dir).await?;

        final_signed.persist(output)
    }
}
