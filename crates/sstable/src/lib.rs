//! # SSTable — sorted table reader
//!
//! Read-only, best-effort parser for block-based sorted tables (`.ldb`
//! files). Tables are immutable once written; this crate only decodes them.
//!
//! ## File layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ DATA BLOCKS (prefix-compressed entries, internal keys)        │
//! │                                                               │
//! │ each block payload is followed by:                            │
//! │   compression type (u8): 0 = raw, 1 = snappy                  │
//! │   checksum (4 bytes, not verified)                            │
//! ├───────────────────────────────────────────────────────────────┤
//! │ METAINDEX BLOCK (ignored by this reader)                      │
//! ├───────────────────────────────────────────────────────────────┤
//! │ INDEX BLOCK (user keys -> data-block handles)                 │
//! ├───────────────────────────────────────────────────────────────┤
//! │ FOOTER (last 48 bytes)                                        │
//! │                                                               │
//! │ metaindex handle | index handle | padding to 40 | magic (8)   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! An internal key is the user key followed by an 8-byte little-endian tag:
//! the low byte is the value type (`0` deletion, `1` put), the upper bytes a
//! sequence number this reader decodes past without using.
//!
//! [`read_table`] walks footer → index block → data blocks and emits
//! [`record::RawEntry`] values in file order. Corruption is confined to the
//! block it occurs in; whatever decoded cleanly is returned.

mod block;
mod format;
mod reader;

pub use block::BlockKind;
pub use format::{BlockHandle, Compression, Footer, BLOCK_TRAILER_BYTES, FOOTER_BYTES};
pub use reader::read_table;

#[cfg(test)]
mod tests;
