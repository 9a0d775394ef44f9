//! Recovery entry point generation.
//!
//! Some recovery environments cannot unpack the outer zip before running the
//! installer, so the entry point carries what it needs as text: the `b64xz`
//! launcher as escaped hex and `busybox` as base64 of an xz stream, for the two
//! 32-bit architectures. The control script appended after the variables uses
//! the launcher to decode busybox and then runs the real installer.
//!
//! # Module Organization
//!
//! - `encode` - hex escaping and xz+base64 encoding
//! - `template` - script header with the variable assignments

mod encode;
mod template;

pub use encode::{XZ_PRESET, escape_hex, xz_base64};

use crate::bundler::{
    artifacts::{ArtifactSet, NativeBinary},
    error::{Error, Result},
    settings::Arch,
};
use handlebars::Handlebars;
use std::collections::BTreeMap;
use template::UPDATE_BINARY_HEADER;

/// Generates the `update-binary` script.
///
/// Renders `EX_ARM`, `EX_X86`, `BB_ARM` and `BB_X86` in that order, then appends
/// `control_script` unchanged.
///
/// # Errors
///
/// Returns [`Error::ArtifactUnavailable`] if the launcher or utility binary of a
/// bootstrap architecture is not in `artifacts`.
pub fn generate_update_binary(artifacts: &ArtifactSet, control_script: &[u8]) -> Result<Vec<u8>> {
    let mut data = BTreeMap::new();

    for arch in Arch::BOOTSTRAP {
        let suffix = arch
            .bootstrap_suffix()
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| Error::GenericError(format!("{arch} is not a bootstrap architecture")))?;

        let launcher = bootstrap_input(artifacts, NativeBinary::B64Xz, arch)?;
        data.insert(format!("ex_{suffix}"), escape_hex(launcher));

        let utility = bootstrap_input(artifacts, NativeBinary::Busybox, arch)?;
        data.insert(format!("bb_{suffix}"), xz_base64(utility)?);

        log::debug!(
            "Encoded bootstrap binaries for {} ({} + {} bytes)",
            arch,
            launcher.len(),
            utility.len()
        );
    }

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);
    handlebars
        .register_template_string("update-binary", UPDATE_BINARY_HEADER)
        .map_err(|e| {
            Error::GenericError(format!("failed to register update-binary template: {e}"))
        })?;

    let header = handlebars.render("update-binary", &data)?;

    let mut script = header.into_bytes();
    script.extend_from_slice(control_script);
    Ok(script)
}

fn bootstrap_input(artifacts: &ArtifactSet, binary: NativeBinary, arch: Arch) -> Result<&[u8]> {
    artifacts
        .binary(binary, arch)
        .map(|a| a.bytes())
        .ok_or_else(|| Error::ArtifactUnavailable {
            name: binary.file_name().to_string(),
            arch,
        })
}
