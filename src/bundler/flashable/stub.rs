//! Version placeholder handling for `util_functions.sh`.

use crate::bundler::settings::VersionInfo;

/// Token in `util_functions.sh` that marks where version variables go.
pub const VERSION_STUB: &str = "MAGISK_VERSION_STUB";

/// Replaces the placeholder with `MAGISK_VER` and `MAGISK_VER_CODE` assignments.
pub fn inject_version(script: &[u8], version: &VersionInfo) -> Vec<u8> {
    let assignment = format!(
        "MAGISK_VER=\"{}\"\nMAGISK_VER_CODE={}",
        version.version_string(),
        version.version_code()
    );
    replace_stub(script, assignment.as_bytes())
}

/// Removes the placeholder without adding anything in its place.
pub fn strip_version(script: &[u8]) -> Vec<u8> {
    replace_stub(script, b"")
}

fn replace_stub(script: &[u8], replacement: &[u8]) -> Vec<u8> {
    let token = VERSION_STUB.as_bytes();
    let mut out = Vec::with_capacity(script.len() + replacement.len());
    let mut rest = script;
    let mut replaced = 0usize;

    while let Some(pos) = rest.windows(token.len()).position(|w| w == token) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(replacement);
        rest = &rest[pos + token.len()..];
        replaced += 1;
    }
    out.extend_from_slice(rest);

    if replaced == 0 {
        log::warn!("{} not found in util_functions.sh; version info not updated", VERSION_STUB);
    }
    out
}
