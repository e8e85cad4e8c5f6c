//! Table binary format: block handles and the footer.
//!
//! ## Footer (always the last 48 bytes)
//!
//! ```text
//! [metaindex handle][index handle][zero padding to 40 bytes][magic: 8 bytes]
//! ```
//!
//! A block handle is two varint64s `(offset, size)` pointing at a block
//! payload earlier in the file. Every payload is followed by one
//! compression-type byte and a 4-byte checksum trailer; the checksum is
//! CRC-32C of `payload ∥ compression_type` but this reader skips it without
//! verification, and the footer magic is likewise not checked.

use encoding::ByteReader;

/// Size of the footer at the end of every table file.
pub const FOOTER_BYTES: usize = 48;

/// Portion of the footer holding the two block handles; the rest is magic.
pub const FOOTER_HANDLE_BYTES: usize = 40;

/// Compression-type byte plus checksum trailing every block payload.
pub const BLOCK_TRAILER_BYTES: usize = 5;

/// Pointer to a contiguous block payload inside the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHandle {
    /// Byte offset of the payload from the start of the file.
    pub offset: u64,
    /// Payload length in bytes (trailer excluded).
    pub size: u64,
}

impl BlockHandle {
    /// Decodes a handle as two consecutive varints.
    pub fn decode(r: &mut ByteReader<'_>) -> Option<Self> {
        let offset = r.read_varint64()?;
        let size = r.read_varint64()?;
        Some(Self { offset, size })
    }

    /// Decodes a handle from the start of `bytes` (index-entry values).
    pub fn decode_from(bytes: &[u8]) -> Option<Self> {
        Self::decode(&mut ByteReader::new(bytes))
    }
}

/// How a block payload is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Stored verbatim.
    Raw,
    /// Raw Snappy block.
    Snappy,
    /// Anything else; the block is skipped with a diagnostic.
    Unknown(u8),
}

impl Compression {
    /// Maps the on-disk compression-type byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Compression::Raw,
            1 => Compression::Snappy,
            other => Compression::Unknown(other),
        }
    }
}

/// Parsed table footer.
///
/// Only the index handle is consumed by this reader; the metaindex handle is
/// decoded and ignored (filter blocks are not read).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    /// Handle of the metaindex block (unused).
    pub metaindex: BlockHandle,
    /// Handle of the index block.
    pub index: BlockHandle,
}

impl Footer {
    /// Decodes the footer from the last [`FOOTER_BYTES`] of a file.
    pub fn decode(tail: &[u8]) -> Option<Self> {
        if tail.len() < FOOTER_BYTES {
            return None;
        }
        let mut r = ByteReader::new(&tail[..FOOTER_HANDLE_BYTES]);
        let metaindex = BlockHandle::decode(&mut r)?;
        let index = BlockHandle::decode(&mut r)?;
        Some(Self { metaindex, index })
    }
}
