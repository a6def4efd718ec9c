//! Perform move-to-front and run-length-encoding 2 transforms on BWT output.
//!
//! The move-to-front transform will increase the frequency of lower byte values. The result of
//! this is that the huffman codes can more efficiently compress those high frequency values.
//!
//! The run-length-encoding compresses runs of the zero rank irregardless of the number of zeros
//! found. The number of zeros is written in bijective base 2 using the RUNA and RUNB symbols.
//! Since the move-to-front transform makes zero ranks very common, this reduces the symbol
//! count significantly for most data.
//!
//! Encoding also returns the frequency table and symbol map used during the huffman stage.
//!
use crate::error::{BzError, Result};

use super::symbol_map::encode_sym_map;

pub const RUNA: u16 = 0;
pub const RUNB: u16 = 1;

/// Output of the MTF/RLE2 stage for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rle2Block {
    /// RUNA/RUNB digits and ranks + 1, terminated by the EOB symbol.
    pub rle2: Vec<u16>,
    /// Frequency of every symbol in rle2, indexed by symbol (EOB included).
    pub freqs: Vec<u32>,
    /// Symbol map of the bytes present in the block.
    pub sym_map: Vec<u16>,
    /// End of block symbol, also the largest symbol of the alphabet.
    pub eob: u16,
}

/// Write a run of `zeros` zero ranks as RUNA/RUNB digits, least significant first.
fn push_zero_run(mut zeros: usize, rle2: &mut Vec<u16>, freqs: &mut [u32]) {
    if zeros == 0 {
        return;
    }
    zeros -= 1;
    loop {
        let digit = (zeros & 1) as u16;
        rle2.push(digit);
        freqs[digit as usize] += 1;
        if zeros < 2 {
            break;
        }
        zeros = (zeros - 2) >> 1;
    }
}

/// Move `idx` to the front of the index, shifting everything in front of it back one.
fn move_to_front(mtf_index: &mut [u8], idx: usize) {
    let sym = mtf_index[idx];
    mtf_index.copy_within(0..idx, 1);
    mtf_index[0] = sym;
}

/// Does Move-To-Front transform and Run-Length-Encoding 2 prior to the huffman stage.
pub fn rle2_mtf_encode(block: &[u8]) -> Rle2Block {
    // Start by finding every u8 in the input.
    let mut present = [false; 256];
    block.iter().for_each(|&b| present[b as usize] = true);

    // The MTF index starts out as the used bytes in ascending order.
    let mut mtf_index: Vec<u8> = (0..=255_u8).filter(|&b| present[b as usize]).collect();
    let eob = mtf_index.len() as u16 + 1;
    let sym_map = encode_sym_map(&present);

    let mut rle2 = Vec::with_capacity(block.len() + 1);
    let mut freqs = vec![0_u32; eob as usize + 1];
    let mut zeros = 0_usize;

    for byte in block {
        // Every byte is in the index, we built it from the block.
        let idx = mtf_index.iter().position(|c| c == byte).unwrap_or(0);
        if idx == 0 {
            zeros += 1;
            continue;
        }
        // Not a zero, so output any pending zeros first
        push_zero_run(zeros, &mut rle2, &mut freqs);
        zeros = 0;

        rle2.push(idx as u16 + 1);
        freqs[idx + 1] += 1;
        move_to_front(&mut mtf_index, idx);
    }
    push_zero_run(zeros, &mut rle2, &mut freqs);

    rle2.push(eob);
    freqs[eob as usize] += 1;

    Rle2Block {
        rle2,
        freqs,
        sym_map,
        eob,
    }
}

/// Does run-length-decoding and MTF decoding.
/// Takes the huffman decoded symbols (without the EOB), the symbol set from the symbol map,
/// and the largest number of bytes the block may hold.
pub fn rle2_mtf_decode(data_in: &[u16], symbol_set: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut mtf_index = symbol_set.to_vec();
    let mut out = Vec::with_capacity(limit.min(data_in.len() * 4));

    let mut zeros = 0_usize;
    let mut bit_multiplier = 1_usize;

    for &rle2_code in data_in {
        match rle2_code {
            RUNA | RUNB => {
                zeros += bit_multiplier << rle2_code;
                bit_multiplier <<= 1;
                if out.len() + zeros > limit {
                    return Err(BzError::corrupt("zero run exceeds the block size"));
                }
            }
            n => {
                flush_zeros(&mut out, &mtf_index, zeros)?;
                zeros = 0;
                bit_multiplier = 1;

                let mtf_code = n as usize - 1;
                if mtf_code >= mtf_index.len() {
                    return Err(BzError::corrupt(format!(
                        "rank {} outside a {} symbol alphabet",
                        mtf_code,
                        mtf_index.len()
                    )));
                }
                out.push(mtf_index[mtf_code]);
                if out.len() > limit {
                    return Err(BzError::corrupt("block decodes past its size"));
                }
                move_to_front(&mut mtf_index, mtf_code);
            }
        }
    }
    flush_zeros(&mut out, &mtf_index, zeros)?;
    Ok(out)
}

/// Output a pending zero run as copies of the symbol at the front of the index.
fn flush_zeros(out: &mut Vec<u8>, mtf_index: &[u8], zeros: usize) -> Result<()> {
    if zeros == 0 {
        return Ok(());
    }
    let front = mtf_index
        .first()
        .copied()
        .ok_or_else(|| BzError::corrupt("zero run in a block with no symbols"))?;
    out.extend(std::iter::repeat(front).take(zeros));
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tools::symbol_map::decode_sym_map;

    #[test]
    fn zero_runs_are_bijective_base_2() {
        let mut freqs = vec![0; 3];
        let mut out = vec![];
        push_zero_run(1, &mut out, &mut freqs);
        assert_eq!(out, vec![RUNA]);
        out.clear();
        push_zero_run(2, &mut out, &mut freqs);
        assert_eq!(out, vec![RUNB]);
        out.clear();
        push_zero_run(3, &mut out, &mut freqs);
        assert_eq!(out, vec![RUNA, RUNA]);
        out.clear();
        push_zero_run(10, &mut out, &mut freqs);
        // 10 = 2*1 + 2*2 + 1*4
        assert_eq!(out, vec![RUNB, RUNB, RUNA]);
    }

    #[test]
    fn encode_small_block() {
        let block = rle2_mtf_encode(b"nnbaaa");
        // index a b n: n=2 -> 3, n=0 -> RUNA, b=2 -> 3, a=2 -> 3, aa -> RUNB
        assert_eq!(block.rle2, vec![3, RUNA, 3, 3, RUNB, 4]);
        assert_eq!(block.eob, 4);
        assert_eq!(block.freqs, vec![1, 1, 0, 3, 1]);
    }

    #[test]
    fn single_byte_block() {
        let block = rle2_mtf_encode(b"x");
        assert_eq!(block.rle2, vec![RUNA, 2]);
        let symbols = decode_sym_map(&block.sym_map);
        assert_eq!(symbols, b"x");
        assert_eq!(rle2_mtf_decode(&block.rle2[..1], &symbols, 1).unwrap(), b"x");
    }

    #[test]
    fn round_trip_text() {
        let data = b"she sells sea shells by the sea shore, the shells she sells";
        let block = rle2_mtf_encode(data);
        let symbols = decode_sym_map(&block.sym_map);
        let body = &block.rle2[..block.rle2.len() - 1];
        assert_eq!(rle2_mtf_decode(body, &symbols, data.len()).unwrap(), data.to_vec());
    }

    #[test]
    fn oversized_run_is_corrupt() {
        let body = vec![RUNB; 30];
        assert!(matches!(
            rle2_mtf_decode(&body, b"a", 1000),
            Err(BzError::CorruptStream(_))
        ));
    }

    #[test]
    fn bad_rank_is_corrupt() {
        assert!(matches!(
            rle2_mtf_decode(&[5], b"ab", 10),
            Err(BzError::CorruptStream(_))
        ));
    }
}
