//! Text decoding for stored keys and values, plus token scanning.
//!
//! Values (and key payloads) are usually tagged with a one-byte encoding
//! prefix: `0x00` UTF-16LE, `0x01` ISO-8859-1. Untagged bytes go through a
//! best-effort autodetect chain instead.

use std::collections::BTreeSet;

/// Decodes UTF-16 little-endian; fails on odd length or broken surrogates.
pub(crate) fn decode_utf16le(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

/// ISO-8859-1: every byte maps to the code point of the same value.
pub(crate) fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Decodes a payload whose first byte selects the encoding of the rest:
/// `0x00` UTF-16LE, `0x01` ISO-8859-1. Anything else is not prefix-tagged.
pub(crate) fn decode_prefixed(bytes: &[u8]) -> Option<String> {
    let (&prefix, body) = bytes.split_first()?;
    match prefix {
        0x00 => decode_utf16le(body).map(|s| trim_controls(&s)),
        0x01 => Some(trim_controls(&decode_latin1(body))),
        _ => None,
    }
}

/// Best-effort text decode.
///
/// Tried in order: encoding prefix (inputs of at least 2 bytes), UTF-16LE
/// when the byte-distribution heuristic fires, strict UTF-8, UTF-16LE,
/// ISO-8859-1. The last step always succeeds, so every input decodes to
/// something; control characters are trimmed from the result.
pub(crate) fn decode_auto(bytes: &[u8]) -> String {
    if bytes.len() >= 2 {
        if let Some(s) = decode_prefixed(bytes) {
            return s;
        }
    }
    if looks_like_utf16le(bytes) {
        if let Some(s) = decode_utf16le(bytes) {
            return trim_controls(&s);
        }
    }
    if let Ok(s) = std::str::from_utf8(bytes) {
        return trim_controls(s);
    }
    if let Some(s) = decode_utf16le(bytes) {
        return trim_controls(&s);
    }
    trim_controls(&decode_latin1(bytes))
}

/// Decodes a stored value: encoding-prefixed payload preferred, autodetected
/// text otherwise.
pub(crate) fn decode_value(bytes: &[u8]) -> String {
    decode_prefixed(bytes).unwrap_or_else(|| decode_auto(bytes))
}

/// UTF-16LE sniff: even length of at least 6, and more than 60% of the
/// odd-index bytes within the first 64 are zero (ASCII-heavy UTF-16).
fn looks_like_utf16le(bytes: &[u8]) -> bool {
    if bytes.len() < 6 || bytes.len() % 2 != 0 {
        return false;
    }
    let window = &bytes[..bytes.len().min(64)];
    let mut odd = 0usize;
    let mut zeros = 0usize;
    for (i, &b) in window.iter().enumerate() {
        if i % 2 == 1 {
            odd += 1;
            if b == 0 {
                zeros += 1;
            }
        }
    }
    odd > 0 && zeros * 10 > odd * 6
}

fn trim_controls(s: &str) -> String {
    s.trim_matches(char::is_control).to_string()
}

/// Bytes allowed inside a token candidate.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-' | b'+' | b'/' | b'=')
}

/// Three-plus dot-separated non-empty segments (the shape of signed
/// compact tokens).
fn looks_dotted(run: &str) -> bool {
    run.split('.').filter(|segment| !segment.is_empty()).count() >= 3
}

/// Scans `bytes` for maximal ASCII token runs, collecting every run at
/// least `min_len` long or shaped like three dot-separated segments.
pub(crate) fn scan_tokens(bytes: &[u8], min_len: usize, out: &mut BTreeSet<String>) {
    let mut start: Option<usize> = None;
    for (i, &b) in bytes.iter().enumerate() {
        if is_token_byte(b) {
            start.get_or_insert(i);
        } else if let Some(s) = start.take() {
            consider_run(&bytes[s..i], min_len, out);
        }
    }
    if let Some(s) = start {
        consider_run(&bytes[s..], min_len, out);
    }
}

fn consider_run(run: &[u8], min_len: usize, out: &mut BTreeSet<String>) {
    // Runs are pure ASCII by construction.
    let Ok(text) = std::str::from_utf8(run) else {
        return;
    };
    if text.len() >= min_len || looks_dotted(text) {
        out.insert(text.to_string());
    }
}
