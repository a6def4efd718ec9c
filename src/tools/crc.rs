//! CRC-32 helpers for the stream framer and the sessions.
//!
//! Both the per-block CRC and the rolling stream CRC are the IEEE CRC-32 computed by
//! crc32fast. The rolling form lets a session fold in every accepted chunk as it arrives.
use crc32fast::Hasher;

/// Continue a CRC-32 from `crc` over `data`. Start from 0 for a fresh checksum.
pub fn do_crc(crc: u32, data: &[u8]) -> u32 {
    let mut hasher = Hasher::new_with_initial(crc);
    hasher.update(data);
    hasher.finalize()
}

/// CRC-32 over several slices, as if they were concatenated.
pub fn crc_of(parts: &[&[u8]]) -> u32 {
    let mut hasher = Hasher::new();
    parts.iter().for_each(|part| hasher.update(part));
    hasher.finalize()
}
