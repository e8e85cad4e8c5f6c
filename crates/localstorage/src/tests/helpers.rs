//! Builders for synthetic store directories.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends `v` as a base-128 varint.
pub fn put_varint(out: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        out.push((v as u8 & 0x7f) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

// -------------------- Local-storage key/value encoding --------------------

/// Prefixed local-storage user key: `_ origin NUL key`.
pub fn storage_key(origin: &str, key: &str) -> Vec<u8> {
    let mut out = vec![0x5f];
    out.extend_from_slice(origin.as_bytes());
    out.push(0);
    out.extend_from_slice(key.as_bytes());
    out
}

/// Unprefixed user key: `origin NUL key`.
pub fn bare_storage_key(origin: &str, key: &str) -> Vec<u8> {
    let mut out = origin.as_bytes().to_vec();
    out.push(0);
    out.extend_from_slice(key.as_bytes());
    out
}

/// Value tagged ISO-8859-1.
pub fn latin1_value(value: &str) -> Vec<u8> {
    let mut out = vec![0x01];
    out.extend_from_slice(value.as_bytes());
    out
}

/// Value tagged UTF-16LE.
pub fn utf16_value(value: &str) -> Vec<u8> {
    let mut out = vec![0x00];
    for unit in value.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

// -------------------- Table files --------------------

/// One table row: user key, value, deletion flag.
pub type TableRow = (Vec<u8>, Vec<u8>, bool);

/// Builds a one-data-block `.ldb` file, optionally Snappy-wrapped.
pub fn table_file(rows: &[TableRow], compress: bool) -> Vec<u8> {
    let mut block = Vec::new();
    for (seq, (user, value, deleted)) in rows.iter().enumerate() {
        let mut internal = user.clone();
        let value_type = u64::from(!deleted);
        let tag = ((seq as u64 + 1) << 8) | value_type;
        internal.extend_from_slice(&tag.to_le_bytes());
        put_varint(&mut block, 0);
        put_varint(&mut block, internal.len() as u64);
        put_varint(&mut block, value.len() as u64);
        block.extend_from_slice(&internal);
        block.extend_from_slice(value);
    }
    block.extend_from_slice(&0u32.to_le_bytes());
    block.extend_from_slice(&1u32.to_le_bytes());

    let payload = if compress {
        snappy_literal(&block)
    } else {
        block
    };

    let mut file = Vec::new();
    file.extend_from_slice(&payload);
    file.push(u8::from(compress));
    file.extend_from_slice(&[0u8; 4]);
    let data_size = payload.len() as u64;

    let mut handle = Vec::new();
    put_varint(&mut handle, 0);
    put_varint(&mut handle, data_size);
    let mut index = Vec::new();
    put_varint(&mut index, 0);
    put_varint(&mut index, 1);
    put_varint(&mut index, handle.len() as u64);
    index.push(b'k');
    index.extend_from_slice(&handle);
    index.extend_from_slice(&0u32.to_le_bytes());
    index.extend_from_slice(&1u32.to_le_bytes());

    let index_offset = file.len() as u64;
    file.extend_from_slice(&index);
    file.push(0);
    file.extend_from_slice(&[0u8; 4]);

    let mut footer = Vec::new();
    put_varint(&mut footer, 0);
    put_varint(&mut footer, 0);
    put_varint(&mut footer, index_offset);
    put_varint(&mut footer, index.len() as u64);
    footer.resize(40, 0);
    footer.extend_from_slice(&[0x57, 0xfb, 0x80, 0x8b, 0x24, 0x75, 0x47, 0xdb]);
    file.extend_from_slice(&footer);
    file
}

/// Wraps `payload` as a literal-only raw Snappy block.
pub fn snappy_literal(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    put_varint(&mut out, payload.len() as u64);
    if payload.len() <= 60 {
        out.push(((payload.len() as u8) - 1) << 2);
    } else {
        out.push(61 << 2);
        out.extend_from_slice(&((payload.len() - 1) as u16).to_le_bytes());
    }
    out.extend_from_slice(payload);
    out
}

// -------------------- Log files --------------------

/// One batch operation: a put or, with `None`, a delete.
pub type LogOp = (Vec<u8>, Option<Vec<u8>>);

/// Builds a `.log` file with one full record per batch.
pub fn log_file(batches: &[Vec<LogOp>]) -> Vec<u8> {
    let mut file = Vec::new();
    for (seq, ops) in batches.iter().enumerate() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&(seq as u64 + 1).to_le_bytes());
        payload.extend_from_slice(&(ops.len() as u32).to_le_bytes());
        for (key, value) in ops {
            match value {
                Some(v) => {
                    payload.push(1);
                    put_varint(&mut payload, key.len() as u64);
                    payload.extend_from_slice(key);
                    put_varint(&mut payload, v.len() as u64);
                    payload.extend_from_slice(v);
                }
                None => {
                    payload.push(0);
                    put_varint(&mut payload, key.len() as u64);
                    payload.extend_from_slice(key);
                }
            }
        }
        file.extend_from_slice(&[0u8; 4]);
        file.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        file.push(1); // full record
        file.extend_from_slice(&payload);
    }
    file
}

// -------------------- Directory plumbing --------------------

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(bytes).unwrap();
    path
}

pub fn set_mtime(path: &Path, time: std::time::SystemTime) {
    let f = std::fs::OpenOptions::new().write(true).open(path).unwrap();
    f.set_modified(time).unwrap();
}
