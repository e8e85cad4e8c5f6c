//! Storage-key decoding, origin normalization, and origin matching.
//!
//! Local-storage user keys serialize the owning origin and the script-visible
//! key into one byte string:
//!
//! ```text
//! 0x5F  storage_key  0x00  key_payload      (prefixed form)
//!       storage_key  0x00  key_payload      (unprefixed fallback)
//! ```
//!
//! The storage key is a serialized origin, optionally carrying a `^nonce`
//! partition suffix and a path. Other subsystems park their own keys in the
//! same store, so the unprefixed form is only trusted when the decoded
//! origin is plausible.

use crate::text;
use encoding::ByteReader;
use url::Url;

/// Byte Chromium writes before the serialized origin ('_').
const KEY_PREFIX: u8 = 0x5f;

/// Origin and key decoded from a stored user key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecodedKey {
    /// Decoded storage-key text, not yet normalized.
    pub origin: String,
    /// Script-visible key.
    pub key: String,
}

/// Decodes `raw` as a local-storage key, preferring the prefixed form.
///
/// Returns `None` for keys without a NUL separator, and for unprefixed keys
/// whose decoded origin does not look like one — both are expected for
/// foreign entries sharing the store.
pub(crate) fn decode_storage_key(raw: &[u8]) -> Option<DecodedKey> {
    if raw.first() == Some(&KEY_PREFIX) {
        if let Some(decoded) = split_at_nul(&raw[1..]) {
            return Some(decoded);
        }
    }
    let decoded = split_at_nul(raw)?;
    if looks_like_origin(&decoded.origin) {
        Some(decoded)
    } else {
        None
    }
}

/// Splits at the first NUL: origin text left, key payload right.
fn split_at_nul(raw: &[u8]) -> Option<DecodedKey> {
    let nul = raw.iter().position(|&b| b == 0)?;
    let origin = text::decode_auto(&raw[..nul]);
    let key = decode_key_payload(&raw[nul + 1..]);
    Some(DecodedKey { origin, key })
}

/// Key payloads are usually a length-prefixed string; plain text otherwise.
fn decode_key_payload(raw: &[u8]) -> String {
    let mut r = ByteReader::new(raw);
    if let Some(body) = r.read_length_prefixed() {
        if r.is_exhausted() {
            return text::decode_auto(body);
        }
    }
    text::decode_auto(raw)
}

/// A decoded origin is plausible when it carries a scheme, names localhost,
/// or contains a dot.
fn looks_like_origin(origin: &str) -> bool {
    origin.contains("://") || origin.starts_with("localhost") || origin.contains('.')
}

/// Normalizes a caller-supplied origin: surrounding whitespace and one
/// trailing slash are dropped.
pub(crate) fn normalize_origin(origin: &str) -> &str {
    let trimmed = origin.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed)
}

/// Reduces decoded storage-key text to its origin.
///
/// The `^nonce` partition suffix and anything past the authority are
/// dropped, as is a trailing slash.
pub(crate) fn storage_key_origin(storage_key: &str) -> String {
    let s = match storage_key.find('^') {
        Some(caret) => &storage_key[..caret],
        None => storage_key,
    };
    let s = match s.find("://") {
        Some(scheme_end) => {
            let authority = scheme_end + 3;
            match s[authority..].find('/') {
                Some(slash) => &s[..authority + slash],
                None => s,
            }
        }
        None => match s.find('/') {
            Some(slash) => &s[..slash],
            None => s,
        },
    };
    s.strip_suffix('/').unwrap_or(s).to_string()
}

/// Tests a normalized stored origin against the normalized requested one.
///
/// Origins match when byte-equal, when both parse as URLs with the same
/// host and (default-resolved) port, or when the stored origin equals the
/// requested one with its scheme stripped.
pub(crate) fn origins_match(entry_origin: &str, requested: &str) -> bool {
    if entry_origin == requested {
        return true;
    }
    if let (Some(a), Some(b)) = (host_port(entry_origin), host_port(requested)) {
        if a == b {
            return true;
        }
    }
    match requested.split_once("://") {
        Some((_, rest)) => entry_origin == rest,
        None => false,
    }
}

/// Host and port of an origin, when it parses as an absolute URL.
fn host_port(origin: &str) -> Option<(String, Option<u16>)> {
    let url = Url::parse(origin).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    Some((host, url.port_or_known_default()))
}
