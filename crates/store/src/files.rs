//! Directory discovery and read-only file loading.

use anyhow::Result;
use memmap2::Mmap;
use record::{Diagnostics, DIAG_TAG};
use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Kind of store file, keyed on extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileKind {
    /// Sorted table (`.ldb`).
    Table,
    /// Write-ahead log (`.log`).
    Log,
}

/// One discovered store file.
#[derive(Debug)]
pub(crate) struct StoreFile {
    pub path: PathBuf,
    pub kind: FileKind,
    pub modified: SystemTime,
}

/// Lists the table and log files of `dir`, newest first.
///
/// Hidden files and anything that is not a regular file are skipped;
/// extensions match case-insensitively. A file without a modification
/// timestamp sorts as the distant past.
pub(crate) fn discover(dir: &Path, diag: &dyn Diagnostics) -> Vec<StoreFile> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            diag.report(&format!(
                "{DIAG_TAG} cannot list {}: {err}",
                dir.display()
            ));
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let kind = match ext.to_ascii_lowercase().as_str() {
            "ldb" => FileKind::Table,
            "log" => FileKind::Log,
            _ => continue,
        };
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(UNIX_EPOCH);
        files.push(StoreFile {
            path,
            kind,
            modified,
        });
    }

    files.sort_by(|a, b| b.modified.cmp(&a.modified));
    files
}

/// Read-only file contents.
///
/// Memory-mapped when the platform allows, loaded whole otherwise. The store
/// is assumed quiescent while a read call is in flight.
pub(crate) enum FileBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileBytes::Mapped(map) => map,
            FileBytes::Owned(bytes) => bytes,
        }
    }
}

/// Opens `path` read-only, preferring a memory map over a full read.
pub(crate) fn load(path: &Path) -> Result<FileBytes> {
    let file = File::open(path)?;
    // Safety: the mapping is read-only and the store is quiescent by
    // contract; a concurrent writer voids every guarantee of this reader.
    match unsafe { Mmap::map(&file) } {
        Ok(map) => Ok(FileBytes::Mapped(map)),
        Err(_) => Ok(FileBytes::Owned(std::fs::read(path)?)),
    }
}
