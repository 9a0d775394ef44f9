//! Signing setup and preflight checks.
//!
//! Every external collaborator is located before an archive is assembled, so a
//! missing key or launcher fails the run without leaving scratch files behind.

use super::tool_detection::resolve_program;
use crate::bundler::{
    Result, Settings,
    error::{Error, Producer},
    settings::AdjusterKind,
    signing::{Adjuster, SigningPipeline, TrailerAdjuster, ZipAdjustTool, ZipSignerJar},
};
use std::path::Path;

/// Builds the production signing pipeline from `settings`.
///
/// # Errors
///
/// - [`Error::MissingArtifact`] if the signer jar, a key, or a configured
///   `zipadjust` binary is missing
/// - [`Error::ToolNotFound`] if the Java launcher cannot be resolved
pub fn setup_signing(settings: &Settings) -> Result<SigningPipeline<ZipSignerJar, Adjuster>> {
    let signing = settings.signing();

    for path in [&signing.signer_jar, &signing.public_key, &signing.private_key] {
        require_file(path, Producer::Signer)?;
    }

    let java = resolve_program(&signing.java).ok_or_else(|| Error::ToolNotFound {
        tool: signing.java.display().to_string(),
    })?;
    log::debug!("Signing with {} -jar {}", java.display(), signing.signer_jar.display());

    let adjuster = match &signing.adjuster {
        AdjusterKind::Native => Adjuster::Native(TrailerAdjuster),
        AdjusterKind::Tool(program) => {
            require_file(program, Producer::Adjuster)?;
            log::debug!("Adjusting with {}", program.display());
            Adjuster::Tool(ZipAdjustTool::new(program))
        }
    };

    let signer = ZipSignerJar::new(
        java,
        &signing.signer_jar,
        &signing.public_key,
        &signing.private_key,
    );

    Ok(SigningPipeline::new(signer, adjuster, settings.scratch_dir()))
}

fn require_file(path: &Path, producer: Producer) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::MissingArtifact {
            path: path.to_path_buf(),
            producer,
        })
    }
}
