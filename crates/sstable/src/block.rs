//! Prefix-compressed block parsing.
//!
//! Block payload layout:
//!
//! ```text
//! entry*: [shared: varint][non_shared: varint][value_len: varint]
//!         [key suffix: non_shared bytes][value: value_len bytes]
//! tail:   [restart offset: u32 LE] x restart_count
//!         [restart_count: u32 LE]
//! ```
//!
//! Each full key is the previous full key's first `shared` bytes followed by
//! the suffix. The restart offsets mark entries with `shared == 0`; this
//! reader walks the whole block sequentially and needs only the count, which
//! fixes where the entry region ends.

use byteorder::{ByteOrder, LittleEndian};
use encoding::ByteReader;

/// What a block's keys mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Index block: keys are plain user keys, values are block handles.
    Index,
    /// Data block: keys are internal keys carrying the 8-byte tag.
    Data,
}

/// One decoded block entry, key fully reconstructed and tag stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub deleted: bool,
}

/// Walks a block payload in entry order.
///
/// Decoding stops at the first entry that does not fit the entry region or,
/// for data blocks, whose key is shorter than the internal tag; everything
/// decoded before that is returned. A restart array larger than the payload
/// yields no entries.
pub(crate) fn walk_block(payload: &[u8], kind: BlockKind) -> Vec<BlockEntry> {
    if payload.len() < 4 {
        return Vec::new();
    }
    let restart_count = LittleEndian::read_u32(&payload[payload.len() - 4..]) as usize;
    let restart_bytes = match restart_count.checked_add(1).and_then(|n| n.checked_mul(4)) {
        Some(n) if n <= payload.len() => n,
        _ => return Vec::new(),
    };
    let region = &payload[..payload.len() - restart_bytes];

    let mut entries = Vec::new();
    let mut r = ByteReader::new(region);
    let mut last_key: Vec<u8> = Vec::new();
    while !r.is_exhausted() {
        let Some(shared) = r.read_varint32() else { break };
        let Some(non_shared) = r.read_varint32() else { break };
        let Some(value_len) = r.read_varint32() else { break };
        let shared = shared as usize;
        if shared > last_key.len() {
            break;
        }
        let Some(suffix) = r.read_bytes(non_shared as usize) else { break };
        let Some(value) = r.read_bytes(value_len as usize) else { break };

        last_key.truncate(shared);
        last_key.extend_from_slice(suffix);

        match kind {
            BlockKind::Index => entries.push(BlockEntry {
                key: last_key.clone(),
                value: value.to_vec(),
                deleted: false,
            }),
            BlockKind::Data => {
                if last_key.len() < 8 {
                    break;
                }
                let split = last_key.len() - 8;
                // Low byte of the little-endian tag is the value type.
                let deleted = last_key[split] == 0;
                entries.push(BlockEntry {
                    key: last_key[..split].to_vec(),
                    value: if deleted { Vec::new() } else { value.to_vec() },
                    deleted,
                });
            }
        }
    }
    entries
}
