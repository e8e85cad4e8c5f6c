//! # Store — recency-ordered merge of table and log files
//!
//! The store is a directory of immutable sorted tables (`.ldb`) and
//! append-only logs (`.log`). This crate enumerates them, newest first by
//! modification time, routes each to the matching reader, and concatenates
//! the results into one flat stream:
//!
//! ```text
//! directory
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                 READ STORE                    │
//! │                                               │
//! │ discover: *.ldb / *.log, hidden files skipped │
//! │   sort by mtime, newest first                 │
//! │     |                                         │
//! │     v                                         │
//! │ per file: mmap (or read whole)                │
//! │   .ldb -> sstable::read_table  (file order)   │
//! │   .log -> wal::read_log        (reversed)     │
//! │     |                                         │
//! │     v                                         │
//! │ concatenated RawEntry stream                  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Within the stream the first entry for a user key is the most recent one,
//! so consumers apply first-seen-wins with tombstone shadowing. Files are
//! never written, and no state outlives the call.
//!
//! Ordering across files leans entirely on modification times; a store whose
//! mtimes were scrambled (say, by a filesystem restore) can surface stale
//! values. Sequence numbers inside the files are not consulted.

mod files;

use files::{discover, load, FileKind};
use record::{Diagnostics, RawEntry, DIAG_TAG};
use std::path::Path;

/// Reads every entry of the store at `dir`, most recent file first.
///
/// Unreadable directories or files produce a diagnostic and are skipped;
/// the result is whatever decoded cleanly. An empty result with no
/// diagnostics means the store is genuinely empty of matching files.
pub fn read_store(dir: &Path, diag: &dyn Diagnostics) -> Vec<RawEntry> {
    let mut entries = Vec::new();
    for file in discover(dir, diag) {
        let label = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.path.display().to_string());
        let bytes = match load(&file.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                diag.report(&format!("{DIAG_TAG} {label}: unreadable: {err}"));
                continue;
            }
        };
        match file.kind {
            FileKind::Table => entries.extend(sstable::read_table(&bytes, &label, diag)),
            FileKind::Log => entries.extend(wal::read_log(&bytes, &label, diag)),
        }
    }
    entries
}
