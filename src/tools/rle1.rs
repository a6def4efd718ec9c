/*
Run Length Encoding 1, done on the raw block before the BWT.

Logic: Walk the input counting how many identical bytes start at each position. Short runs
(1-3 bytes) are copied as they are. A run of 4 or more is written as the 4 bytes followed by a
count byte holding how many more identical bytes followed (0-255). Longer runs simply start a
new run after the count byte, which is exactly where the decoder restarts its own search.
*/
use crate::error::{BzError, Result};

/// Longest run that one 4 byte + count group can describe.
const MAX_RUN: usize = 4 + 255;

/// Encode runs of four or more identical bytes, pre-BWT.
pub fn rle1_encode(data: &[u8]) -> Vec<u8> {
    // Worst case every run is exactly 4 long and grows by a count byte.
    let mut out = Vec::with_capacity(data.len() + data.len() / 4 + 1);
    let mut idx = 0;
    while idx < data.len() {
        let byte = data[idx];
        let run = data[idx..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == byte)
            .count();
        if run >= 4 {
            out.extend_from_slice(&[byte; 4]);
            out.push((run - 4) as u8);
        } else {
            out.extend(std::iter::repeat(byte).take(run));
        }
        idx += run;
    }
    out
}

/// Undo the RLE1 phase. `limit` is the largest output the block may decode to; anything that
/// would grow past it is corrupt.
pub fn rle1_decode(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(limit.min(data.len() * 2));
    let mut last: Option<u8> = None;
    let mut run = 0;

    for &byte in data {
        if run == 4 {
            // This is the count byte that follows four identical bytes.
            if let Some(repeat) = last {
                out.extend(std::iter::repeat(repeat).take(byte as usize));
            }
            run = 0;
        } else {
            out.push(byte);
            if last == Some(byte) {
                run += 1;
            } else {
                last = Some(byte);
                run = 1;
            }
        }
        if out.len() > limit {
            return Err(BzError::corrupt(format!(
                "run length data expands past {} bytes",
                limit
            )));
        }
    }
    if run == 4 {
        return Err(BzError::corrupt("run of four bytes is missing its count"));
    }
    Ok(out)
}
