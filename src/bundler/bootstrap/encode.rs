//! Text encodings for binaries inlined into a shell script.

use crate::bundler::error::{Context, Result};
use base64::Engine;
use std::io::Write;

/// xz preset for the utility binary. Changing it changes every release archive.
pub const XZ_PRESET: u32 = 9;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Encodes bytes as `\xHH` escapes that `printf`/`echo -e` turn back into raw bytes.
pub fn escape_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for &b in bytes {
        out.push('\\');
        out.push('x');
        out.push(HEX_DIGITS[(b >> 4) as usize] as char);
        out.push(HEX_DIGITS[(b & 0x0f) as usize] as char);
    }
    out
}

/// Compresses bytes into an xz stream (CRC64 check) and encodes it as base64.
pub fn xz_base64(bytes: &[u8]) -> Result<String> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), XZ_PRESET);
    encoder
        .write_all(bytes)
        .map_err(crate::bundler::Error::IoError)
        .context("compressing bootstrap binary")?;
    let compressed = encoder
        .finish()
        .map_err(crate::bundler::Error::IoError)
        .context("finishing xz stream")?;

    Ok(base64::engine::general_purpose::STANDARD.encode(compressed))
}
