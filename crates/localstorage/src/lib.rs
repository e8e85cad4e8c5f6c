//! # Local storage — origin-keyed projection over the merged store
//!
//! Decodes the user keys and values surfaced by [`store::read_store`] into
//! browser local-storage entries. The three entry points are pure functions
//! over a store directory; diagnostics through the optional sink are the
//! only side channel, and nothing is ever written.
//!
//! ## Entry points
//!
//! | Function | Result |
//! |----------|--------|
//! | [`read_entries`] | `(origin, key, value, raw length)` rows for one origin, tombstones honored |
//! | [`read_text_entries`] | every merged entry decoded as text |
//! | [`read_token_candidates`] | ASCII token runs harvested from keys and values |
//!
//! ## Merge semantics
//!
//! The merged stream arrives newest first, so the projection applies
//! first-seen-wins per key: a live value is kept the first time its key is
//! seen, and a deletion records a tombstone that both removes the key and
//! blocks every older value behind it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use localstorage::{read_entries, NoDiagnostics};
//! use std::path::Path;
//!
//! let dir = Path::new("Local Storage/leveldb");
//! for entry in read_entries("https://example.com", dir, &NoDiagnostics) {
//!     println!("{} = {}", entry.key, entry.value);
//! }
//! ```

mod key;
mod text;

pub use record::{Diagnostics, NoDiagnostics};

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Default minimum run length for [`read_token_candidates`].
pub const DEFAULT_TOKEN_MIN_LEN: usize = 60;

/// One decoded local-storage entry for a requested origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStorageEntry {
    /// Normalized origin the entry was stored under.
    pub origin: String,
    /// Script-visible key.
    pub key: String,
    /// Decoded value.
    pub value: String,
    /// Length of the raw value bytes before decoding.
    pub raw_value_len: usize,
}

/// One key/value pair decoded as text, origin-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub key: String,
    pub value: String,
}

/// Reads the local-storage entries stored for `origin` under `dir`.
///
/// The requested origin is normalized (whitespace, one trailing slash) and
/// matched against each entry's storage key by byte equality, host+port
/// equality, or scheme-stripped equality. Entries whose keys do not decode
/// as local-storage keys are silently skipped — the store is shared with
/// other subsystems and foreign keys are expected.
pub fn read_entries(origin: &str, dir: &Path, diag: &dyn Diagnostics) -> Vec<LocalStorageEntry> {
    let requested = key::normalize_origin(origin);
    let mut entries: Vec<LocalStorageEntry> = Vec::new();
    let mut tombstones: HashSet<String> = HashSet::new();
    let mut present: HashSet<String> = HashSet::new();

    for raw in store::read_store(dir, diag) {
        let Some(decoded) = key::decode_storage_key(&raw.key) else {
            continue;
        };
        let entry_origin = key::storage_key_origin(&decoded.origin);
        if !key::origins_match(&entry_origin, requested) {
            continue;
        }

        if raw.deleted {
            // The tombstone shadows every older value for this key.
            entries.retain(|e| e.key != decoded.key);
            present.remove(&decoded.key);
            tombstones.insert(decoded.key);
        } else if !tombstones.contains(&decoded.key) && !present.contains(&decoded.key) {
            let value = text::decode_value(&raw.value);
            present.insert(decoded.key.clone());
            entries.push(LocalStorageEntry {
                origin: entry_origin,
                key: decoded.key,
                value,
                raw_value_len: raw.value.len(),
            });
        }
    }
    entries
}

/// Decodes every merged entry's key and value as text, in stream order.
///
/// The value keeps the longer of the prefix-tagged and autodetected
/// decodings. Useful for eyeballing a store without knowing its origins.
pub fn read_text_entries(dir: &Path, diag: &dyn Diagnostics) -> Vec<TextEntry> {
    store::read_store(dir, diag)
        .into_iter()
        .map(|raw| TextEntry {
            key: text::decode_auto(&raw.key),
            value: longer_decoding(&raw.value),
        })
        .collect()
}

/// Harvests ASCII token candidates from every merged entry's key and value.
///
/// A maximal run over `A–Z a–z 0–9 . _ - + / =` is kept when it is at least
/// `min_len` bytes long ([`DEFAULT_TOKEN_MIN_LEN`] suits bearer-token
/// hunting) or shaped like three dot-separated segments.
pub fn read_token_candidates(dir: &Path, min_len: usize, diag: &dyn Diagnostics) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    for raw in store::read_store(dir, diag) {
        text::scan_tokens(&raw.key, min_len, &mut tokens);
        text::scan_tokens(&raw.value, min_len, &mut tokens);
    }
    tokens
}

fn longer_decoding(bytes: &[u8]) -> String {
    let auto = text::decode_auto(bytes);
    match text::decode_prefixed(bytes) {
        Some(prefixed) if prefixed.len() > auto.len() => prefixed,
        _ => auto,
    }
}

#[cfg(test)]
mod tests;
