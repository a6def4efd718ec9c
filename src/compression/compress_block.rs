use log::{debug, trace};

use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;
use crate::bwt_algorithms::bwt_sort::{bwt_decode, bwt_encode};
use crate::error::{BzError, Result};
use crate::huffman_coding::huffman::{huf_decode, huf_encode};
use crate::tools::rle1::{rle1_decode, rle1_encode};
use crate::tools::rle2_mtf::{rle2_mtf_decode, rle2_mtf_encode};
use crate::tools::symbol_map::decode_sym_map;

/// One block after the transform and entropy stages, ready for framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBlock {
    /// Input bytes the block decodes to.
    pub original_len: u32,
    /// Row of the unrotated data in the sorted rotations.
    pub key: u32,
    /// Bits of coded data before padding to a byte.
    pub bit_len: usize,
    /// Byte aligned coded data.
    pub payload: Vec<u8>,
}

/// Largest RLE1 output for a block of `len` bytes: every run of exactly four gains a count byte.
fn max_rle1_len(len: usize) -> usize {
    len + len / 4 + 1
}

#[allow(clippy::unusual_byte_groupings)]
/// Run one block through RLE1, the BWT, MTF/RLE2 and the huffman coder.
pub fn compress_block(data: &[u8], iterations: usize) -> EncodedBlock {
    let rle1 = rle1_encode(data);
    let (key, bwt) = bwt_encode(&rle1);
    let rle2 = rle2_mtf_encode(&bwt);

    let mut bw = BitWriter::new(data.len() / 2 + 64);

    // 24 bit BWT key
    trace!("\r\x1b[43mWriting key at {}.    \x1b[0m", bw.loc());
    bw.out24(0x18_000000 | key);

    // Symbol maps, 16 bit index + one 16 bit map per set index bit.
    trace!("\r\x1b[43mSymbol maps written at {}.     \x1b[0m", bw.loc());
    for &word in &rle2.sym_map {
        bw.out16(word);
    }

    huf_encode(&mut bw, &rle2, iterations);

    debug!(
        "{} bytes in block, {} after RLE1, {} after MTF & RLE2, {} syms in use",
        data.len(),
        rle1.len(),
        rle2.rle2.len(),
        rle2.eob - 1,
    );

    let bit_len = bw.bit_len();
    EncodedBlock {
        original_len: data.len() as u32,
        key,
        bit_len,
        payload: bw.into_bytes(),
    }
}

/// Reverse compress_block. The result is exactly `original_len` bytes or an error.
pub fn decompress_block(payload: &[u8], original_len: usize) -> Result<Vec<u8>> {
    let eof = || BzError::corrupt("payload ended inside the block header");
    let mut br = BitReader::new(payload);

    let key = br.bint(24).ok_or_else(eof)? as u32;

    let mut sym_map = vec![br.bint(16).ok_or_else(eof)? as u16];
    for _ in 0..sym_map[0].count_ones() {
        let map = br.bint(16).ok_or_else(eof)? as u16;
        if map == 0 {
            return Err(BzError::corrupt("empty symbol map word"));
        }
        sym_map.push(map);
    }
    let symbol_set = decode_sym_map(&sym_map);
    if symbol_set.is_empty() {
        return Err(BzError::corrupt("block uses no symbols"));
    }
    trace!(
        "\nFound {} symbols, key {}, tables at {}.",
        symbol_set.len(),
        key,
        br.loc()
    );

    let limit = max_rle1_len(original_len);
    let eob = symbol_set.len() as u16 + 1;
    let symbols = huf_decode(&mut br, eob, limit + 1)?;
    let bwt = rle2_mtf_decode(&symbols, &symbol_set, limit)?;
    if bwt.is_empty() {
        return Err(BzError::corrupt("block decodes to nothing"));
    }
    let rle1 = bwt_decode(key, &bwt)?;
    let data = rle1_decode(&rle1, original_len)?;

    if data.len() != original_len {
        return Err(BzError::corrupt(format!(
            "block decoded to {} bytes, header says {}",
            data.len(),
            original_len
        )));
    }
    Ok(data)
}

#[cfg(test)]
mod test {
    use super::*;

    fn round_trip(data: &[u8]) {
        let block = compress_block(data, 4);
        assert_eq!(block.original_len as usize, data.len());
        assert!(block.bit_len <= block.payload.len() * 8);
        assert!(block.bit_len > (block.payload.len() - 1) * 8);
        assert_eq!(
            decompress_block(&block.payload, data.len()).unwrap(),
            data.to_vec()
        );
    }

    #[test]
    fn single_byte() {
        round_trip(b"A");
    }

    #[test]
    fn repeated_byte() {
        round_trip(&[0_u8; 1000]);
        round_trip(&[b'a'; 10]);
    }

    #[test]
    fn text() {
        round_trip(
            b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. Donec egestas, \
              enim et consectetuer ullamcorper, lectus ligula rutrum leo, a elementum \
              elit tortor eu quam.",
        );
    }

    #[test]
    fn every_byte_value() {
        let data: Vec<u8> = (0..4096_u32).map(|i| (i * 31 % 256) as u8).collect();
        round_trip(&data);
    }

    #[test]
    fn ten_a_block() {
        let block = compress_block(b"aaaaaaaaaa", 4);
        // RLE1 turns the run into "aaaa" and a count byte of 6.
        assert_eq!(block.original_len, 10);
        assert_eq!(decompress_block(&block.payload, 10).unwrap(), b"aaaaaaaaaa");
    }

    #[test]
    fn deterministic() {
        let data = b"how much wood would a woodchuck chuck if a woodchuck could chuck wood";
        assert_eq!(compress_block(data, 4), compress_block(data, 4));
    }

    #[test]
    fn wrong_length_is_corrupt() {
        let block = compress_block(b"hello hello hello", 4);
        assert!(matches!(
            decompress_block(&block.payload, 16),
            Err(BzError::CorruptStream(_))
        ));
    }

    #[test]
    fn garbage_is_corrupt() {
        assert!(decompress_block(&[0xff; 40], 100).is_err());
        assert!(decompress_block(&[], 100).is_err());
    }
}
