use record::{Diagnostics, RawEntry, DIAG_TAG};
use std::borrow::Cow;

use crate::block::{walk_block, BlockKind};
use crate::format::{BlockHandle, Compression, Footer, BLOCK_TRAILER_BYTES, FOOTER_BYTES};

/// Reads every entry of a table file, in file order.
///
/// `label` names the file in diagnostics. The reader is best-effort: any
/// structural inconsistency is confined to the block it occurs in, and the
/// entries decoded up to that point are always returned. A file shorter than
/// the footer yields no entries.
pub fn read_table(file: &[u8], label: &str, diag: &dyn Diagnostics) -> Vec<RawEntry> {
    if file.len() < FOOTER_BYTES {
        return Vec::new();
    }
    let footer = match Footer::decode(&file[file.len() - FOOTER_BYTES..]) {
        Some(f) => f,
        None => {
            diag.report(&format!("{DIAG_TAG} {label}: unreadable table footer"));
            return Vec::new();
        }
    };

    let index_payload = match read_block(file, &footer.index, label, diag) {
        Some(p) => p,
        None => return Vec::new(),
    };

    let mut entries = Vec::new();
    for index_entry in walk_block(&index_payload, BlockKind::Index) {
        let handle = match BlockHandle::decode_from(&index_entry.value) {
            Some(h) => h,
            None => {
                diag.report(&format!("{DIAG_TAG} {label}: unreadable data-block handle"));
                continue;
            }
        };
        let payload = match read_block(file, &handle, label, diag) {
            Some(p) => p,
            None => continue,
        };
        for entry in walk_block(&payload, BlockKind::Data) {
            entries.push(if entry.deleted {
                RawEntry::tombstone(entry.key)
            } else {
                RawEntry::put(entry.key, entry.value)
            });
        }
    }
    entries
}

/// Extracts one block payload, decompressing when the trailer asks for it.
///
/// The byte after the payload selects the compression; the 4 checksum bytes
/// after it are skipped without verification. Returns `None` (with a
/// diagnostic) when the handle points outside the file, the compression type
/// is unknown, or Snappy decoding fails.
fn read_block<'a>(
    file: &'a [u8],
    handle: &BlockHandle,
    label: &str,
    diag: &dyn Diagnostics,
) -> Option<Cow<'a, [u8]>> {
    let payload_end = handle.offset.checked_add(handle.size)?;
    let block_end = payload_end.checked_add(BLOCK_TRAILER_BYTES as u64)?;
    if block_end > file.len() as u64 {
        diag.report(&format!("{DIAG_TAG} {label}: block handle outside the file"));
        return None;
    }
    let payload = &file[handle.offset as usize..payload_end as usize];
    match Compression::from_byte(file[payload_end as usize]) {
        Compression::Raw => Some(Cow::Borrowed(payload)),
        Compression::Snappy => match snappy::decompress(payload) {
            Ok(decoded) => Some(Cow::Owned(decoded)),
            Err(err) => {
                diag.report(&format!("{DIAG_TAG} {label}: snappy block unreadable: {err}"));
                None
            }
        },
        Compression::Unknown(code) => {
            diag.report(&format!(
                "{DIAG_TAG} {label}: unsupported compression type {code}"
            ));
            None
        }
    }
}
