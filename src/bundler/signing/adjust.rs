//! Trailer repair between the two signing passes.
//!
//! The first pass appends its signature block after the end-of-central-directory
//! record without counting it as the archive comment. Readers that insist on the
//! EOCD sitting exactly at `len - 22 - comment_len` then reject the archive. The
//! adjustment rewrites the comment length so the trailing bytes become the
//! comment, leaving every entry untouched.

use super::signer::check_status;
use crate::bundler::error::{Error, ErrorExt, Result, SigningStage};
use std::{
    future::Future,
    path::{Path, PathBuf},
};
use tokio::process::Command;

const EOCD_SIGNATURE: [u8; 4] = *b"PK\x05\x06";
const CENTRAL_HEADER_SIGNATURE: [u8; 4] = *b"PK\x01\x02";
const EOCD_LEN: usize = 22;

/// Repairs the structure of a signed archive.
pub trait StructuralAdjuster {
    /// Writes an adjusted copy of `input` to `output`.
    fn adjust(&self, input: &Path, output: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// Where the trailer was found and what it was changed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailerFix {
    /// Offset of the end-of-central-directory record
    pub eocd_offset: usize,
    /// Comment length recorded before adjusting
    pub previous_comment_len: u16,
    /// Comment length after adjusting
    pub comment_len: u16,
}

/// Rewrites the EOCD comment length so the record ends at end-of-file.
///
/// The EOCD is the last `PK\x05\x06` whose central directory offset and size
/// end exactly at the record and point at a central directory header. Signature
/// bytes that happen to appear inside the trailing data are skipped that way.
///
/// # Errors
///
/// Fails for archives without a valid EOCD, for zip64 archives, and when more
/// than 65535 bytes follow the record.
pub fn adjust_trailer(bytes: &mut [u8]) -> Result<TrailerFix> {
    let eocd_offset = find_eocd(bytes)?;

    let trailing = bytes.len() - (eocd_offset + EOCD_LEN);
    let comment_len = u16::try_from(trailing).map_err(|_| Error::SigningFailed {
        stage: SigningStage::Adjust,
        reason: format!(
            "{trailing} bytes follow the end of central directory; \
             at most {} fit in the comment",
            u16::MAX
        ),
    })?;

    let field = eocd_offset + 20;
    let previous_comment_len = read_u16(bytes, field);
    bytes[field..field + 2].copy_from_slice(&comment_len.to_le_bytes());

    Ok(TrailerFix {
        eocd_offset,
        previous_comment_len,
        comment_len,
    })
}

fn find_eocd(bytes: &[u8]) -> Result<usize> {
    if bytes.len() < EOCD_LEN {
        return Err(not_a_zip("file is shorter than an end of central directory record"));
    }

    let mut zip64 = false;
    for offset in (0..=bytes.len() - EOCD_LEN).rev() {
        if bytes[offset..offset + 4] != EOCD_SIGNATURE {
            continue;
        }

        let entries = read_u16(bytes, offset + 10);
        let cd_size = read_u32(bytes, offset + 12);
        let cd_offset = read_u32(bytes, offset + 16);

        if entries == u16::MAX || cd_size == u32::MAX || cd_offset == u32::MAX {
            zip64 = true;
            continue;
        }

        let (cd_offset, cd_size) = (cd_offset as usize, cd_size as usize);
        if cd_offset.checked_add(cd_size) != Some(offset) {
            continue;
        }
        let cd_header = bytes.get(cd_offset..cd_offset + 4);
        if entries > 0 && cd_header != Some(&CENTRAL_HEADER_SIGNATURE[..]) {
            continue;
        }

        return Ok(offset);
    }

    if zip64 {
        Err(not_a_zip("zip64 archives are not supported"))
    } else {
        Err(not_a_zip("no end of central directory record found"))
    }
}

fn not_a_zip(reason: &str) -> Error {
    Error::SigningFailed {
        stage: SigningStage::Adjust,
        reason: reason.to_string(),
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// In-process trailer repair.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailerAdjuster;

impl StructuralAdjuster for TrailerAdjuster {
    async fn adjust(&self, input: &Path, output: &Path) -> Result<()> {
        let mut bytes = tokio::fs::read(input)
            .await
            .fs_context("reading signed archive", input)?;
        let fix = adjust_trailer(&mut bytes)?;
        log::debug!(
            "EOCD at {:#x}: comment length {} -> {}",
            fix.eocd_offset,
            fix.previous_comment_len,
            fix.comment_len
        );
        tokio::fs::write(output, bytes)
            .await
            .fs_context("writing adjusted archive", output)
    }
}

/// Runs an external `zipadjust <in> <out>`.
#[derive(Debug, Clone)]
pub struct ZipAdjustTool {
    program: PathBuf,
}

impl ZipAdjustTool {
    /// Uses the tool at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl StructuralAdjuster for ZipAdjustTool {
    async fn adjust(&self, input: &Path, output: &Path) -> Result<()> {
        let result = Command::new(&self.program)
            .arg(input)
            .arg(output)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|error| Error::CommandFailed {
                command: self.program.display().to_string(),
                error,
            })?;
        check_status(&result, "zipadjust")
    }
}

/// Adjuster chosen by configuration.
#[derive(Debug, Clone)]
pub enum Adjuster {
    /// [`TrailerAdjuster`]
    Native(TrailerAdjuster),
    /// [`ZipAdjustTool`]
    Tool(ZipAdjustTool),
}

impl StructuralAdjuster for Adjuster {
    async fn adjust(&self, input: &Path, output: &Path) -> Result<()> {
        match self {
            Adjuster::Native(native) => native.adjust(input, output).await,
            Adjuster::Tool(tool) => tool.adjust(input, output).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn small_zip() -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("a.txt", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"hello").unwrap();
        zip.start_file("b.txt", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"world").unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn trailing_block_becomes_the_comment() {
        let mut bytes = small_zip();
        let eocd = bytes.len() - EOCD_LEN;
        // Contains an EOCD signature that must not be picked.
        bytes.extend_from_slice(b"sigblock PK\x05\x06 more signature bytes \xff\xff");
        let appended = bytes.len() - eocd - EOCD_LEN;

        let fix = adjust_trailer(&mut bytes).unwrap();

        assert_eq!(fix.eocd_offset, eocd);
        assert_eq!(fix.previous_comment_len, 0);
        assert_eq!(fix.comment_len as usize, appended);
        assert_eq!(read_u16(&bytes, eocd + 20) as usize, appended);

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.by_index(1).unwrap().name(), "b.txt");
    }

    #[test]
    fn clean_archive_is_unchanged() {
        let original = small_zip();
        let mut bytes = original.clone();
        let fix = adjust_trailer(&mut bytes).unwrap();
        assert_eq!(fix.comment_len, 0);
        assert_eq!(bytes, original);
    }

    #[test]
    fn oversized_trailer_is_rejected() {
        let mut bytes = small_zip();
        bytes.resize(bytes.len() + 70_000, 0);
        let err = adjust_trailer(&mut bytes).unwrap_err();
        assert!(matches!(
            err,
            Error::SigningFailed {
                stage: SigningStage::Adjust,
                ..
            }
        ));
    }

    #[test]
    fn garbage_is_not_a_zip() {
        assert!(adjust_trailer(&mut b"definitely not a zip archive".to_vec()).is_err());
        assert!(adjust_trailer(&mut b"PK".to_vec()).is_err());
    }

    #[tokio::test]
    async fn native_adjuster_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("signed.zip");
        let output = dir.path().join("adjusted.zip");
        let mut bytes = small_zip();
        bytes.extend_from_slice(b"trailer");
        std::fs::write(&input, &bytes).unwrap();

        Adjuster::Native(TrailerAdjuster)
            .adjust(&input, &output)
            .await
            .unwrap();

        let adjusted = std::fs::read(&output).unwrap();
        assert_eq!(adjusted.len(), bytes.len());
        assert_eq!(read_u16(&adjusted, bytes.len() - 7 - EOCD_LEN + 20), 7);
    }
}
