//! Stream framer: header, block records and footer around the opaque block payloads.
//!
//! Layout, all integers big-endian:
//! - stream header: `BZi` + block size class byte ('1'..='9')
//! - block record: block magic, original length (u32), payload length (u32), payload,
//!   CRC-32 (u32) over the class byte of the stream header, the two lengths and the payload
//! - footer: footer magic, CRC-32 of all original bytes (u32), original byte count (u64)
//!
use log::trace;

use super::options::BlockSize;
use crate::error::{BzError, Result};
use crate::tools::crc::crc_of;

pub const STREAM_MAGIC: [u8; 3] = *b"BZi";
pub const BLOCK_MAGIC: [u8; 6] = [0x31, 0x41, 0x59, 0x26, 0x53, 0x59];
pub const FOOTER_MAGIC: [u8; 6] = [0x17, 0x72, 0x45, 0x38, 0x50, 0x90];

pub const STREAM_HEADER_LEN: usize = 4;
pub const RECORD_MAGIC_LEN: usize = 6;
pub const BLOCK_HEADER_LEN: usize = 8;
pub const BLOCK_CRC_LEN: usize = 4;
pub const FOOTER_LEN: usize = 12;

/// Slack for the huffman tables and selectors on top of the coded symbols.
const PAYLOAD_SLACK: usize = 64 * 1024;

/// What follows a record magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Block,
    Footer,
}

/// Lengths carried in front of a block payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub original_len: u32,
    pub payload_len: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub stream_crc: u32,
    pub total: u64,
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn be_u64(bytes: &[u8]) -> u64 {
    (be_u32(&bytes[..4]) as u64) << 32 | be_u32(&bytes[4..8]) as u64
}

/// Largest payload a block of this class can legitimately need.
pub fn max_payload(block_size: BlockSize) -> usize {
    block_size.bytes() * 3 + PAYLOAD_SLACK
}

pub fn push_stream_header(out: &mut Vec<u8>, block_size: BlockSize) {
    out.extend_from_slice(&STREAM_MAGIC);
    out.push(block_size.header_byte());
}

/// Frame one encoded block and append it to `out`. The CRC also covers the stream's class
/// byte, so a damaged header cannot pass with a valid block behind it.
pub fn push_block(
    out: &mut Vec<u8>,
    block_size: BlockSize,
    original_len: u32,
    payload: &[u8],
) {
    let original = original_len.to_be_bytes();
    let payload_len = (payload.len() as u32).to_be_bytes();
    let crc = crc_of(&[&[block_size.header_byte()], &original, &payload_len, payload]);
    trace!(
        "Framing block of {} bytes, payload {} bytes, crc {:08x}",
        original_len,
        payload.len(),
        crc
    );
    out.extend_from_slice(&BLOCK_MAGIC);
    out.extend_from_slice(&original);
    out.extend_from_slice(&payload_len);
    out.extend_from_slice(payload);
    out.extend_from_slice(&crc.to_be_bytes());
}

pub fn push_footer(out: &mut Vec<u8>, stream_crc: u32, total: u64) {
    out.extend_from_slice(&FOOTER_MAGIC);
    out.extend_from_slice(&stream_crc.to_be_bytes());
    out.extend_from_slice(&total.to_be_bytes());
}

/// Check the stream magic and return the block size class.
pub fn parse_stream_header(field: &[u8]) -> Result<BlockSize> {
    if field[..3] != STREAM_MAGIC {
        return Err(BzError::corrupt("bad stream magic"));
    }
    BlockSize::from_header_byte(field[3])
}

pub fn parse_record_magic(field: &[u8]) -> Result<Record> {
    if field == BLOCK_MAGIC {
        Ok(Record::Block)
    } else if field == FOOTER_MAGIC {
        Ok(Record::Footer)
    } else {
        Err(BzError::corrupt("bad block magic"))
    }
}

/// Parse the block lengths, rejecting any the stream's block size rules out.
pub fn parse_block_header(field: &[u8], block_size: BlockSize) -> Result<BlockHeader> {
    let header = BlockHeader {
        original_len: be_u32(&field[..4]),
        payload_len: be_u32(&field[4..8]),
    };
    if header.original_len == 0 || header.original_len as usize > block_size.bytes() {
        return Err(BzError::corrupt(format!(
            "block length {} outside 1..={}",
            header.original_len,
            block_size.bytes()
        )));
    }
    if header.payload_len == 0 || header.payload_len as usize > max_payload(block_size) {
        return Err(BzError::corrupt(format!(
            "payload length {} is impossible",
            header.payload_len
        )));
    }
    Ok(header)
}

/// Split the block body into payload and CRC, and check the CRC.
pub fn verify_block<'a>(
    header: &BlockHeader,
    block_size: BlockSize,
    body: &'a [u8],
) -> Result<&'a [u8]> {
    let (payload, crc_field) = body.split_at(body.len() - BLOCK_CRC_LEN);
    let expected = be_u32(crc_field);
    let found = crc_of(&[
        &[block_size.header_byte()],
        &header.original_len.to_be_bytes(),
        &header.payload_len.to_be_bytes(),
        payload,
    ]);
    if found != expected {
        return Err(BzError::corrupt(format!(
            "block crc {:08x} does not match {:08x}",
            found, expected
        )));
    }
    Ok(payload)
}

pub fn parse_footer(field: &[u8]) -> Footer {
    Footer {
        stream_crc: be_u32(&field[..4]),
        total: be_u64(&field[4..12]),
    }
}
