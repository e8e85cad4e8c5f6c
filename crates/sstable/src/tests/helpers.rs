//! Builders for synthetic table files used across the test modules.

/// Appends `v` as a base-128 varint.
pub fn put_varint(out: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        out.push((v as u8 & 0x7f) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

/// Internal key: user key followed by the 8-byte LE tag `(seq << 8) | type`.
pub fn internal_key(user: &[u8], seq: u64, value_type: u8) -> Vec<u8> {
    let mut key = user.to_vec();
    let tag = (seq << 8) | u64::from(value_type);
    key.extend_from_slice(&tag.to_le_bytes());
    key
}

/// Builds a block payload from `(key, value)` pairs, sharing each key's
/// common prefix with its predecessor and closing with a single restart.
pub fn build_block(pairs: &[(Vec<u8>, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut last: Vec<u8> = Vec::new();
    for (key, value) in pairs {
        let shared = last
            .iter()
            .zip(key.iter())
            .take_while(|(a, b)| a == b)
            .count();
        put_varint(&mut out, shared as u64);
        put_varint(&mut out, (key.len() - shared) as u64);
        put_varint(&mut out, value.len() as u64);
        out.extend_from_slice(&key[shared..]);
        out.extend_from_slice(value);
        last = key.clone();
    }
    out.extend_from_slice(&0u32.to_le_bytes()); // restart offset 0
    out.extend_from_slice(&1u32.to_le_bytes()); // restart count
    out
}

/// Wraps `payload` as a literal-only raw Snappy block.
pub fn snappy_literal(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    put_varint(&mut out, payload.len() as u64);
    if payload.len() <= 60 {
        out.push(((payload.len() as u8) - 1) << 2);
    } else {
        out.push(61 << 2); // two extra length bytes
        out.extend_from_slice(&((payload.len() - 1) as u16).to_le_bytes());
    }
    out.extend_from_slice(payload);
    out
}

/// Appends `payload` plus its trailer (compression byte + dummy checksum)
/// and returns the block handle as `(offset, size)`.
pub fn append_block(file: &mut Vec<u8>, payload: &[u8], compression: u8) -> (u64, u64) {
    let offset = file.len() as u64;
    file.extend_from_slice(payload);
    file.push(compression);
    file.extend_from_slice(&[0u8; 4]);
    (offset, payload.len() as u64)
}

/// Serializes a block handle the way index entries store them.
pub fn handle_bytes(offset: u64, size: u64) -> Vec<u8> {
    let mut out = Vec::new();
    put_varint(&mut out, offset);
    put_varint(&mut out, size);
    out
}

/// Appends an index block over `data_handles` and the 48-byte footer.
pub fn finish_table(file: &mut Vec<u8>, data_handles: &[(u64, u64)]) {
    let index_pairs: Vec<(Vec<u8>, Vec<u8>)> = data_handles
        .iter()
        .enumerate()
        .map(|(i, &(offset, size))| {
            (
                format!("index-key-{i}").into_bytes(),
                handle_bytes(offset, size),
            )
        })
        .collect();
    let index_block = build_block(&index_pairs);
    let (index_offset, index_size) = append_block(file, &index_block, 0);

    let mut footer = Vec::new();
    put_varint(&mut footer, 0); // metaindex handle (empty)
    put_varint(&mut footer, 0);
    put_varint(&mut footer, index_offset);
    put_varint(&mut footer, index_size);
    footer.resize(40, 0);
    footer.extend_from_slice(&[0x57, 0xfb, 0x80, 0x8b, 0x24, 0x75, 0x47, 0xdb]);
    file.extend_from_slice(&footer);
}

/// Convenience: a one-data-block table over `(user_key, value, seq, type)`
/// rows, optionally Snappy-wrapped.
pub fn build_table(rows: &[(&[u8], &[u8], u64, u8)], compress: bool) -> Vec<u8> {
    let pairs: Vec<(Vec<u8>, Vec<u8>)> = rows
        .iter()
        .map(|&(user, value, seq, ty)| (internal_key(user, seq, ty), value.to_vec()))
        .collect();
    let block = build_block(&pairs);
    let mut file = Vec::new();
    let handle = if compress {
        append_block(&mut file, &snappy_literal(&block), 1)
    } else {
        append_block(&mut file, &block, 0)
    };
    finish_table(&mut file, &[handle]);
    file
}
