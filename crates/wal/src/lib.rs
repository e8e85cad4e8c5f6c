//! # WAL — write-ahead log reader
//!
//! Read-only parser for append-only log files (`.log`). The log holds the
//! mutations that never made it into a table; replaying it is how the most
//! recent writes are recovered.
//!
//! ## Binary layout
//!
//! The file is sliced into fixed 32 KiB blocks (the last may be short).
//! Records never span a block boundary; a logical payload too large for the
//! space left in a block is split into typed fragments:
//!
//! ```text
//! record := [checksum: u32 LE][length: u16 LE][type: u8][payload: length]
//! type   := 1 full | 2 first | 3 middle | 4 last
//! ```
//!
//! A zero `length` is block padding. Checksums are CRC-32C of the payload
//! but are not verified by this reader.
//!
//! Reassembled payloads are write batches:
//!
//! ```text
//! batch := [sequence: u64 LE][count: u32 LE] entry*
//! entry := 0x00 [key: varint-prefixed]                          (delete)
//!        | 0x01 [key: varint-prefixed][value: varint-prefixed]  (put)
//! ```
//!
//! Any other entry tag ends the batch; whatever decoded before it is kept.
//! [`read_log`] returns entries in **reverse record order** so the newest
//! mutation for a key is seen first by the store merger.

use byteorder::{ByteOrder, LittleEndian};
use encoding::ByteReader;
use record::{Diagnostics, RawEntry, DIAG_TAG};

/// Fixed framing block size.
pub const BLOCK_SIZE: usize = 32 * 1024;

/// Bytes in a record header (checksum + length + type).
pub const RECORD_HEADER_BYTES: usize = 7;

/// Bytes in a write-batch header (sequence + count).
const BATCH_HEADER_BYTES: usize = 12;

/// Fragment type carried in a record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordType {
    Full,
    First,
    Middle,
    Last,
    /// Type 0 marks space preallocated but never written.
    Pad,
    Unknown(u8),
}

impl RecordType {
    fn from_byte(byte: u8) -> Self {
        match byte {
            0 => RecordType::Pad,
            1 => RecordType::Full,
            2 => RecordType::First,
            3 => RecordType::Middle,
            4 => RecordType::Last,
            other => RecordType::Unknown(other),
        }
    }
}

/// Reads every write-batch entry of a log file, newest record first.
///
/// `label` names the file in diagnostics. The reader is best-effort: a
/// malformed record or batch is confined to itself, and a fragment sequence
/// left dangling by a truncated tail is decoded as far as it goes.
pub fn read_log(file: &[u8], label: &str, diag: &dyn Diagnostics) -> Vec<RawEntry> {
    let mut entries = Vec::new();
    let mut pending: Vec<u8> = Vec::new();

    for block in file.chunks(BLOCK_SIZE) {
        let mut pos = 0;
        while pos + RECORD_HEADER_BYTES <= block.len() {
            // The 4-byte checksum is skipped unverified.
            let length = LittleEndian::read_u16(&block[pos + 4..pos + 6]) as usize;
            let kind = RecordType::from_byte(block[pos + 6]);
            pos += RECORD_HEADER_BYTES;

            if length == 0 {
                continue; // padding
            }
            if pos + length > block.len() {
                diag.report(&format!(
                    "{DIAG_TAG} {label}: record runs past its 32 KiB block"
                ));
                break;
            }
            let payload = &block[pos..pos + length];
            pos += length;

            match kind {
                RecordType::Full => decode_write_batch(payload, &mut entries),
                RecordType::First => {
                    pending.clear();
                    pending.extend_from_slice(payload);
                }
                RecordType::Middle => pending.extend_from_slice(payload),
                RecordType::Last => {
                    pending.extend_from_slice(payload);
                    decode_write_batch(&pending, &mut entries);
                    pending.clear();
                }
                RecordType::Pad | RecordType::Unknown(_) => {}
            }
        }
    }

    // A truncated log can end inside a fragment run; decode what is there.
    if !pending.is_empty() {
        decode_write_batch(&pending, &mut entries);
    }

    entries.reverse();
    entries
}

/// Decodes one write batch, appending its entries in record order.
///
/// The sequence number and entry count are decoded past without being used.
/// Decoding stops at the first malformed entry or foreign tag; everything
/// before it is kept.
fn decode_write_batch(payload: &[u8], out: &mut Vec<RawEntry>) {
    if payload.len() < BATCH_HEADER_BYTES {
        return;
    }
    let mut r = ByteReader::new(&payload[BATCH_HEADER_BYTES..]);
    while let Some(tag) = r.read_u8() {
        match tag {
            0 => {
                let Some(key) = r.read_length_prefixed() else { return };
                out.push(RawEntry::tombstone(key.to_vec()));
            }
            1 => {
                let Some(key) = r.read_length_prefixed() else { return };
                let Some(value) = r.read_length_prefixed() else { return };
                out.push(RawEntry::put(key.to_vec(), value.to_vec()));
            }
            _ => return,
        }
    }
}
