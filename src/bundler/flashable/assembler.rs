//! Writes entry lists into a zip archive.

use super::ArchiveEntry;
use crate::bundler::{
    error::{Error, ErrorExt, Result},
    signing::{Archive, Unsigned},
};
use std::{
    collections::HashSet,
    io::{BufWriter, Seek, Write},
    path::{Path, PathBuf},
};
use zip::{DateTime, ZipWriter, write::SimpleFileOptions};

/// Writes `entries` to `writer` in order.
///
/// Every entry carries the same DOS timestamp (1980-01-01 00:00), so identical
/// inputs always produce identical bytes. Zip64 is disabled.
///
/// # Errors
///
/// Returns [`Error::AssemblyFailed`] for duplicate or malformed entry paths and
/// for write failures.
pub fn write_archive<W: Write + Seek>(writer: W, entries: &[ArchiveEntry]) -> Result<W> {
    validate_paths(entries)?;

    let mut zip = ZipWriter::new(writer);
    for entry in entries {
        let options = SimpleFileOptions::default()
            .compression_method(entry.compression)
            .last_modified_time(DateTime::default())
            .unix_permissions(entry.unix_mode)
            .large_file(false);

        zip.start_file(entry.archive_path.as_str(), options)
            .map_err(|e| assembly_failed(&entry.archive_path, e))?;
        zip.write_all(&entry.payload)
            .map_err(|e| assembly_failed(&entry.archive_path, e))?;
        match &entry.source {
            Some(source) => log::debug!("zip: {} -> {}", source.display(), entry.archive_path),
            None => log::debug!("zip: {}", entry.archive_path),
        }
    }

    zip.finish().map_err(|e| Error::AssemblyFailed {
        reason: format!("writing central directory: {e}"),
    })
}

/// Assembles `entries` into a new unsigned archive in `scratch_dir`.
pub async fn assemble(
    entries: Vec<ArchiveEntry>,
    scratch_dir: &Path,
) -> Result<Archive<Unsigned>> {
    let scratch_dir: PathBuf = scratch_dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let file = tempfile::Builder::new()
            .prefix(".flashable-unsigned-")
            .suffix(".partial")
            .tempfile_in(&scratch_dir)
            .fs_context("creating scratch archive in", &scratch_dir)?;

        let mut writer = write_archive(BufWriter::new(file), &entries)?;
        writer.flush().map_err(|e| Error::AssemblyFailed {
            reason: format!("flushing archive: {e}"),
        })?;
        let file = writer.into_inner().map_err(|e| Error::AssemblyFailed {
            reason: format!("flushing archive: {}", e.error()),
        })?;

        log::debug!(
            "Assembled {} entries into {}",
            entries.len(),
            file.path().display()
        );
        Ok(Archive::from_temp_path(file.into_temp_path()))
    })
    .await
    .map_err(|e| Error::GenericError(format!("archive assembly task failed: {e}")))?
}

fn validate_paths(entries: &[ArchiveEntry]) -> Result<()> {
    let mut seen = HashSet::with_capacity(entries.len());

    for entry in entries {
        let path = entry.archive_path.as_str();
        let malformed = path.is_empty()
            || path.starts_with('/')
            || path.ends_with('/')
            || path.contains('\\')
            || path.split('/').any(|part| part.is_empty() || part == "." || part == "..");

        if malformed {
            return Err(Error::AssemblyFailed {
                reason: format!("invalid archive path '{path}'"),
            });
        }
        if !seen.insert(path) {
            return Err(Error::AssemblyFailed {
                reason: format!("duplicate archive path '{path}'"),
            });
        }
    }
    Ok(())
}

fn assembly_failed(path: &str, error: impl std::fmt::Display) -> Error {
    Error::AssemblyFailed {
        reason: format!("{path}: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use zip::{CompressionMethod, ZipArchive};

    fn sample() -> Vec<ArchiveEntry> {
        vec![
            ArchiveEntry::new("META-INF/com/google/android/update-binary", b"#!/sbin/sh\n".to_vec())
                .executable(),
            ArchiveEntry::new("common/util_functions.sh", b"MAGISK_VER=\"24.0\"\n".repeat(40)),
            ArchiveEntry::new("chromeos/kernel.keyblock", vec![0u8; 0]),
        ]
    }

    fn write(entries: &[ArchiveEntry]) -> Vec<u8> {
        write_archive(Cursor::new(Vec::new()), entries)
            .unwrap()
            .into_inner()
    }

    #[test]
    fn entries_keep_order_payload_and_mode() {
        let entries = sample();
        let bytes = write(&entries);
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.len(), entries.len());
        for (i, expected) in entries.iter().enumerate() {
            let mut file = archive.by_index(i).unwrap();
            assert_eq!(file.name(), expected.archive_path);
            assert_eq!(file.compression(), CompressionMethod::Deflated);
            assert_eq!(file.unix_mode().map(|m| m & 0o777), Some(expected.unix_mode));

            let mut payload = Vec::new();
            file.read_to_end(&mut payload).unwrap();
            assert_eq!(payload, expected.payload);
        }
    }

    #[test]
    fn output_is_byte_identical_across_runs() {
        assert_eq!(write(&sample()), write(&sample()));
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let mut entries = sample();
        entries.push(ArchiveEntry::new("common/util_functions.sh", Vec::new()));

        let err = write_archive(Cursor::new(Vec::new()), &entries).unwrap_err();
        assert!(matches!(err, Error::AssemblyFailed { reason } if reason.contains("duplicate")));
    }

    #[test]
    fn malformed_paths_are_rejected() {
        for path in ["/abs", "a//b", "../escape", "win\\path", "dir/"] {
            let entries = [ArchiveEntry::new(path, Vec::new())];
            assert!(
                write_archive(Cursor::new(Vec::new()), &entries).is_err(),
                "{path} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn assemble_writes_into_scratch() {
        let scratch = tempfile::tempdir().unwrap();
        let archive = assemble(sample(), scratch.path()).await.unwrap();

        assert!(archive.path().starts_with(scratch.path()));
        let bytes = std::fs::read(archive.path()).unwrap();
        assert_eq!(bytes, write(&sample()));

        drop(archive);
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }
}
