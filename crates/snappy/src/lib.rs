//! # Snappy — raw block decompressor
//!
//! Decodes the raw Snappy block format used inside table files: a varint
//! length preamble followed by a stream of tag-driven elements. The low two
//! bits of each tag select the element kind:
//!
//! ```text
//! 0b00  literal       length (tag >> 2) + 1; field values 60..=63 select
//!                     1..=4 extra little-endian bytes encoding length - 1
//! 0b01  copy          length ((tag >> 2) & 0x7) + 4,
//!                     offset ((tag >> 5) << 8) | next byte
//! 0b10  copy          length (tag >> 2) + 1, offset next two bytes LE
//! 0b11  copy          length (tag >> 2) + 1, offset next four bytes LE
//! ```
//!
//! A copy may reach into bytes it is itself producing (offset smaller than
//! length); the decoder repeats bytes one at a time so run-length patterns
//! expand correctly. Only the block format is handled here — the framed
//! stream format with chunk headers and checksums is never stored inside
//! table files and is not supported.

use encoding::ByteReader;
use thiserror::Error;

/// Preallocation cap for the output buffer (16 MiB). A corrupt preamble can
/// claim any length; beyond this the buffer grows on demand instead of
/// trusting the claim.
const MAX_PREALLOC: usize = 16 * 1024 * 1024;

/// Errors produced while decoding a raw Snappy block.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnappyError {
    /// The input ended before the current element's bytes were available.
    #[error("compressed input truncated")]
    Truncated,

    /// A copy referenced data before the start of the output, or offset 0.
    #[error("copy offset {offset} invalid with {produced} bytes produced")]
    BadOffset {
        /// Offset the copy asked for.
        offset: usize,
        /// Bytes decoded so far.
        produced: usize,
    },
}

/// Decompresses one raw Snappy block.
///
/// Returns the full decompressed payload or an error — no partial output is
/// ever handed back. The length preamble only sizes the output buffer; it is
/// not validated against the decoded length.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, SnappyError> {
    let mut r = ByteReader::new(input);
    let claimed = r.read_varint64().ok_or(SnappyError::Truncated)? as usize;
    let mut out: Vec<u8> = Vec::with_capacity(claimed.min(MAX_PREALLOC));

    while let Some(tag) = r.read_u8() {
        match tag & 0b11 {
            0b00 => {
                let field = (tag >> 2) as usize;
                let len = if field < 60 {
                    field + 1
                } else {
                    // 60..=63: the field counts extra little-endian bytes
                    // holding length - 1.
                    let extra = field - 59;
                    let bytes = r.read_bytes(extra).ok_or(SnappyError::Truncated)?;
                    let mut v = 0usize;
                    for (i, b) in bytes.iter().enumerate() {
                        v |= (*b as usize) << (8 * i);
                    }
                    v + 1
                };
                let literal = r.read_bytes(len).ok_or(SnappyError::Truncated)?;
                out.extend_from_slice(literal);
            }
            0b01 => {
                let len = (((tag >> 2) & 0x7) as usize) + 4;
                let low = r.read_u8().ok_or(SnappyError::Truncated)?;
                let offset = (((tag >> 5) as usize) << 8) | low as usize;
                copy_back(&mut out, offset, len)?;
            }
            0b10 => {
                let len = ((tag >> 2) as usize) + 1;
                let offset = r.read_u16_le().ok_or(SnappyError::Truncated)? as usize;
                copy_back(&mut out, offset, len)?;
            }
            _ => {
                let len = ((tag >> 2) as usize) + 1;
                let offset = r.read_u32_le().ok_or(SnappyError::Truncated)? as usize;
                copy_back(&mut out, offset, len)?;
            }
        }
    }

    Ok(out)
}

/// Appends `len` bytes copied from `offset` bytes behind the end of `out`.
///
/// The source range may overlap the bytes being produced; copying one byte
/// at a time makes an offset smaller than the length repeat the trailing
/// pattern.
fn copy_back(out: &mut Vec<u8>, offset: usize, len: usize) -> Result<(), SnappyError> {
    if offset == 0 || offset > out.len() {
        return Err(SnappyError::BadOffset {
            offset,
            produced: out.len(),
        });
    }
    let start = out.len() - offset;
    for i in 0..len {
        let byte = out[start + i];
        out.push(byte);
    }
    Ok(())
}

#[cfg(test)]
mod tests;
