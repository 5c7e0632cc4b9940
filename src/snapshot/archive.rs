//! Archive codec
//!
//! Bundles a set of paths into one gzip-compressed tar archive and expands
//! archives back onto the filesystem. Knows nothing about snapshot names or
//! retention.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

use crate::error::{SnapvaultError, SnapvaultResult};

/// Prefix of in-progress archive files
const PARTIAL_PREFIX: &str = ".backup-";

/// Suffix of in-progress archive files
const PARTIAL_SUFFIX: &str = ".partial";

/// A freshly written archive
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveHandle {
    /// Where the archive landed
    pub path: PathBuf,
    /// Compressed size in bytes
    pub size_bytes: u64,
    /// Number of tar entries (files and directories)
    pub entries: usize,
}

/// Contents of an archive, gathered without extracting it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    /// Number of tar entries (files and directories)
    pub entries: usize,
    /// Uncompressed size of all file contents
    pub total_bytes: u64,
}

/// Creates and extracts `.tar.gz` archives relative to a source root
#[derive(Debug, Clone)]
pub struct ArchiveCodec {
    source_root: PathBuf,
}

impl ArchiveCodec {
    /// Create a codec whose member paths are resolved against `source_root`
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
        }
    }

    /// Bundle `members` (files or directories, relative to the source root)
    /// into a compressed archive at `destination`.
    ///
    /// The archive is written to a temp file next to `destination` and
    /// renamed into place once complete, so a failure never leaves a file at
    /// `destination`.
    pub fn create(&self, members: &[PathBuf], destination: &Path) -> SnapvaultResult<ArchiveHandle> {
        let creation_err = |reason: String| SnapvaultError::ArchiveCreation {
            destination: destination.to_path_buf(),
            reason,
        };

        for member in members {
            if !is_safe_relative(member) {
                return Err(creation_err(format!(
                    "member path must be relative to the source root: {}",
                    member.display()
                )));
            }
        }

        let dest_dir = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let temp = tempfile::Builder::new()
            .prefix(PARTIAL_PREFIX)
            .suffix(PARTIAL_SUFFIX)
            .tempfile_in(dest_dir)
            .map_err(|e| creation_err(format!("cannot create temp file: {}", e)))?;

        let file = temp
            .as_file()
            .try_clone()
            .map_err(|e| creation_err(e.to_string()))?;

        let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);

        let mut entries = 0;
        for member in members {
            entries += self
                .append_member(&mut builder, member)
                .map_err(|e| creation_err(format!("{}: {}", member.display(), e)))?;
        }

        let file = builder
            .into_inner()
            .and_then(|encoder| encoder.finish())
            .and_then(|writer| writer.into_inner().map_err(|e| e.into_error()))
            .map_err(|e| creation_err(format!("cannot finish archive: {}", e)))?;

        file.sync_all()
            .map_err(|e| creation_err(format!("cannot sync archive: {}", e)))?;
        drop(file);

        temp.persist(destination)
            .map_err(|e| creation_err(format!("cannot move archive into place: {}", e.error)))?;

        let size_bytes = fs::metadata(destination)
            .map_err(|e| creation_err(e.to_string()))?
            .len();

        tracing::debug!(
            archive = %destination.display(),
            entries,
            size_bytes,
            "archive written"
        );

        Ok(ArchiveHandle {
            path: destination.to_path_buf(),
            size_bytes,
            entries,
        })
    }

    /// Add one member (recursively for directories), returning the entry count
    fn append_member<W: Write>(
        &self,
        builder: &mut tar::Builder<W>,
        relative: &Path,
    ) -> io::Result<usize> {
        let full = self.source_root.join(relative);
        let metadata = fs::symlink_metadata(&full)?;
        let file_type = metadata.file_type();

        // Links are stored as links, never followed
        if file_type.is_file() || file_type.is_symlink() {
            builder.append_path_with_name(&full, relative)?;
            return Ok(1);
        }

        if !file_type.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file, directory or symlink",
            ));
        }

        builder.append_dir(relative, &full)?;
        let mut count = 1;

        let mut children = fs::read_dir(&full)?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<io::Result<Vec<_>>>()?;
        children.sort();

        for child in children {
            if is_partial_name(&child.to_string_lossy()) {
                continue;
            }
            count += self.append_member(builder, &relative.join(child))?;
        }

        Ok(count)
    }

    /// Validate an archive without extracting it
    ///
    /// Reads every entry and the gzip trailer, so truncated or garbled
    /// archives are reported as corrupt.
    pub fn inspect(archive: &Path) -> SnapvaultResult<ArchiveSummary> {
        let corrupt = |reason: String| SnapvaultError::ArchiveCorrupt {
            archive: archive.to_path_buf(),
            reason,
        };

        let mut tar = open_archive(archive)?;
        let mut summary = ArchiveSummary::default();

        for entry in tar.entries().map_err(|e| corrupt(e.to_string()))? {
            let mut entry = entry.map_err(|e| corrupt(e.to_string()))?;

            let path = entry.path().map_err(|e| corrupt(e.to_string()))?.into_owned();
            if !is_safe_relative(&path) {
                return Err(corrupt(format!("unsafe entry path: {}", path.display())));
            }

            summary.total_bytes += io::copy(&mut entry, &mut io::sink())
                .map_err(|e| corrupt(format!("{}: {}", path.display(), e)))?;
            summary.entries += 1;
        }

        // Drain the gzip stream so the trailer checksum is verified
        io::copy(&mut tar.into_inner(), &mut io::sink()).map_err(|e| corrupt(e.to_string()))?;

        Ok(summary)
    }

    /// Expand an archive onto `destination_root`, overwriting files at the
    /// same relative paths.
    ///
    /// The archive is validated in full before the first write, so a corrupt
    /// archive leaves the destination untouched. A write failure after that
    /// point leaves already-extracted files in place.
    pub fn extract(archive: &Path, destination_root: &Path) -> SnapvaultResult<ArchiveSummary> {
        let summary = Self::inspect(archive)?;

        let extraction_err = |reason: String| SnapvaultError::Extraction {
            archive: archive.to_path_buf(),
            reason,
        };

        fs::create_dir_all(destination_root).map_err(|e| {
            extraction_err(format!(
                "cannot create {}: {}",
                destination_root.display(),
                e
            ))
        })?;

        let mut tar = open_archive(archive)?;
        tar.set_overwrite(true);
        tar.set_preserve_mtime(true);

        let entries = tar.entries().map_err(|e| SnapvaultError::ArchiveCorrupt {
            archive: archive.to_path_buf(),
            reason: e.to_string(),
        })?;

        for entry in entries {
            let mut entry = entry.map_err(|e| SnapvaultError::ArchiveCorrupt {
                archive: archive.to_path_buf(),
                reason: e.to_string(),
            })?;
            let path = entry
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();

            let unpacked = entry
                .unpack_in(destination_root)
                .map_err(|e| extraction_err(format!("{}: {}", path, e)))?;
            if !unpacked {
                return Err(extraction_err(format!(
                    "{}: entry escapes {}",
                    path,
                    destination_root.display()
                )));
            }
        }

        tracing::debug!(
            archive = %archive.display(),
            destination = %destination_root.display(),
            entries = summary.entries,
            "archive extracted"
        );

        Ok(summary)
    }
}

/// Open a `.tar.gz` for reading
fn open_archive(archive: &Path) -> SnapvaultResult<tar::Archive<GzDecoder<BufReader<File>>>> {
    let file = File::open(archive).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SnapvaultError::ArchiveNotFound(archive.to_path_buf()),
        _ => SnapvaultError::Io(format!("Failed to open {}: {}", archive.display(), e)),
    })?;

    let is_empty = file.metadata().map(|m| m.len() == 0).unwrap_or(false);
    if is_empty {
        return Err(SnapvaultError::ArchiveCorrupt {
            archive: archive.to_path_buf(),
            reason: "archive is empty".into(),
        });
    }

    Ok(tar::Archive::new(GzDecoder::new(BufReader::new(file))))
}

/// Relative, with no `..` components
fn is_safe_relative(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// In-progress archives written by [`ArchiveCodec::create`]
pub(crate) fn is_partial_name(name: &str) -> bool {
    name.starts_with(PARTIAL_PREFIX) && name.ends_with(PARTIAL_SUFFIX)
}
