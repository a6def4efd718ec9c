use log::{debug, trace};

use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;
use crate::error::{BzError, Result};
use crate::tools::rle2_mtf::Rle2Block;

use super::huffman_code_from_weights::{improve_code_len_from_weights, MAX_CODE_LEN};

/// Symbols coded by one selector.
pub const CHUNK_SIZE: usize = 50;
/// RUNA, RUNB, 255 ranks and EOB.
pub const MAX_ALPHA_SIZE: usize = 258;
pub const MAX_TABLES: usize = 6;
const MIN_TABLES: usize = 2;

/// Choose how many coding tables are worth their header cost for this many symbols.
fn table_count_for(symbols: usize) -> usize {
    match symbols {
        0..=199 => 2,
        200..=599 => 3,
        600..=1199 => 4,
        1200..=2399 => 5,
        _ => 6,
    }
}

#[allow(clippy::unusual_byte_groupings)]
/// Encode MTF/RLE2 data using the multi-table system.
/// Each chunk of 50 symbols is coded with whichever of the 2-6 tables is cheapest for it. The
/// tables are refined `iterations` times against the data before they are written.
pub fn huf_encode(bw: &mut BitWriter, block: &Rle2Block, iterations: usize) {
    let eob = block.eob;
    let alpha_size = eob as usize + 1;
    let table_count = table_count_for(block.rle2.len());

    // Now we can initialize the coding tables based on our frequency counts
    let mut tables = init_tables(&block.freqs, table_count, eob);

    let selector_count = block.rle2.len().div_ceil(CHUNK_SIZE);
    let mut selectors = vec![0_usize; selector_count];

    for iter in 0..iterations.max(1) {
        // How often each table won, for reporting only
        let mut favorites = [0; MAX_TABLES];
        let mut total_cost = 0;

        // Recalculated frequency array for each table (for adjusting the tables)
        let mut rfreq = [[0u32; MAX_ALPHA_SIZE]; MAX_TABLES];

        /*
        Move through the input 50 symbols at a time. For each chunk find the table with the
        lowest cost, record it as the selector and count the chunk's symbols against it.
        */
        block
            .rle2
            .chunks(CHUNK_SIZE)
            .enumerate()
            .for_each(|(i, chunk)| {
                let mut cost = [0_u32; MAX_TABLES];
                chunk.iter().for_each(|&symbol| {
                    (0..table_count).for_each(|t| cost[t] += tables[t][symbol as usize])
                });

                // Lowest cost wins; on equal cost the first table wins.
                let bt = (0..table_count).fold(0, |best, t| {
                    if cost[t] < cost[best] {
                        t
                    } else {
                        best
                    }
                });

                total_cost += cost[bt];
                favorites[bt] += 1;
                chunk
                    .iter()
                    .for_each(|&symbol| rfreq[bt][symbol as usize] += 1);
                selectors[i] = bt;
            });

        debug!(
            " pass {}: best cost is {}, grp uses are {:?}",
            iter + 1,
            total_cost / 8,
            &favorites[..table_count]
        );

        // Turn the frequencies of this pass into code lengths for the next one.
        (0..table_count).for_each(|t| {
            improve_code_len_from_weights(&mut tables[t], &rfreq[t], eob);
        });
    }

    // Table count is a 3 bit number, selector count a 15 bit number.
    trace!("\r\x1b[43mTable count written at {}.     \x1b[0m", bw.loc());
    bw.out24((3 << 24) | table_count as u32);
    bw.out24((15 << 24) | selector_count as u32);

    /*
    Selectors tell us which table is to be used for each 50 symbol chunk of the block.
    They are written after a Move-To-Front transform, in unary: n ones followed by a zero.
    */
    let mut table_idx: Vec<usize> = (0..table_count).collect();
    trace!(
        "\r\x1b[43m{} Selectors written at {}.     \x1b[0m",
        selector_count,
        bw.loc()
    );
    for &selector in &selectors {
        let idx = table_idx.iter().position(|&c| c == selector).unwrap_or(0);
        let front = table_idx.remove(idx);
        table_idx.insert(0, front);
        // idx ones then a zero, 1 to 6 bits
        bw.out24(((idx as u32 + 1) << 24) | (((1 << idx) - 1) << 1));
    }

    /*
    Next write the code lengths of each table. They start with an "origin" length of five
    bits. Each symbol's length (including the first symbol) is written as a delta from the
    previous one: 10 for +1, 11 for -1, and a single 0 when the delta is used up.
    */
    let mut code_tables = Vec::with_capacity(table_count);
    for (t, table) in tables.iter().enumerate().take(table_count) {
        let lengths = &table[..alpha_size];
        let mut origin = lengths[0];
        trace!(
            "\r\x1b[43mWriting origin {} for huffman map {} at {}.   \x1b[0m",
            origin,
            t,
            bw.loc()
        );
        bw.out24((5 << 24) | origin);
        for &len in lengths {
            while origin < len {
                bw.out24(0x02_000002);
                origin += 1;
            }
            while origin > len {
                bw.out24(0x02_000003);
                origin -= 1;
            }
            bw.out24(0x01_000000);
        }
        code_tables.push(canonical_codes(lengths));
    }

    // Finally the data itself, switching tables every 50 symbols.
    trace!("\r\x1b[43mSymbols written at {}.     \x1b[0m", bw.loc());
    for (chunk, &selector) in block.rle2.chunks(CHUNK_SIZE).zip(&selectors) {
        let codes = &code_tables[selector];
        for &symbol in chunk {
            bw.out24(codes[symbol as usize]);
        }
    }
}

/// Initialize 2-6 tables of code lengths based on the frequencies of the symbols in the data.
/// Each table gets a contiguous slice of the alphabet holding roughly an equal share of the
/// total frequency; symbols in its slice start at length 0 and all others at 15.
fn init_tables(
    freqs: &[u32],
    table_count: usize,
    eob: u16,
) -> [[u32; MAX_ALPHA_SIZE]; MAX_TABLES] {
    let mut tables = [[15_u32; MAX_ALPHA_SIZE]; MAX_TABLES];
    let alpha_size = eob as usize + 1;

    let mut remaining: u32 = freqs.iter().take(alpha_size).sum();
    let mut start = 0;
    // Hand out slices from the last table down, so RUNA/RUNB land in the last table.
    for parts_left in (1..=table_count).rev() {
        let target = remaining / parts_left as u32;
        let mut portion = 0;
        let mut end = start;
        while end < alpha_size && (portion < target || end == start) {
            portion += freqs[end];
            end += 1;
        }
        // The final slice takes whatever is left.
        if parts_left == 1 {
            end = alpha_size;
        }
        for sym in start..end {
            tables[parts_left - 1][sym] = 0;
        }
        remaining -= portion.min(remaining);
        start = end;
    }
    tables
}

#[allow(clippy::unusual_byte_groupings)]
/// Assign canonical codes from code lengths: codes are handed out in (length, symbol) order,
/// counting up and shifting left whenever the length grows. Returned in the out24 format, with
/// the length in the most significant 8 bits and the code in the least.
pub fn canonical_codes(lengths: &[u32]) -> Vec<u32> {
    let mut len_sym: Vec<(u32, u16)> = lengths
        .iter()
        .enumerate()
        .map(|(sym, &len)| (len, sym as u16))
        .collect();
    len_sym.sort_unstable();

    let mut out_codes = vec![0_u32; lengths.len()];
    let mut next_code: (u32, u32) = (len_sym[0].0, 0);
    for &(len, sym) in &len_sym {
        if len != next_code.0 {
            next_code.1 <<= len - next_code.0;
            next_code.0 = len;
        }
        out_codes[sym as usize] = len << 24 | next_code.1;
        next_code.1 += 1;
    }
    out_codes
}

/// Canonical decoding table for one set of code lengths.
#[derive(Debug, Clone)]
struct DecodeTable {
    /// First code of each length.
    first_code: [u32; MAX_CODE_LEN as usize + 1],
    /// Position in `symbols` of the first symbol of each length.
    offset: [u32; MAX_CODE_LEN as usize + 1],
    /// Number of symbols of each length.
    count: [u32; MAX_CODE_LEN as usize + 1],
    /// Symbols sorted by (length, symbol).
    symbols: Vec<u16>,
}

impl DecodeTable {
    /// Rebuild the table from code lengths, rejecting lengths that are not a prefix code.
    fn new(lengths: &[u32]) -> Result<Self> {
        let mut count = [0_u32; MAX_CODE_LEN as usize + 1];
        for &len in lengths {
            if !(1..=MAX_CODE_LEN).contains(&len) {
                return Err(BzError::corrupt(format!("code length {} out of range", len)));
            }
            count[len as usize] += 1;
        }

        let mut first_code = [0_u32; MAX_CODE_LEN as usize + 1];
        let mut offset = [0_u32; MAX_CODE_LEN as usize + 1];
        let mut code = 0_u32;
        let mut idx = 0_u32;
        for len in 1..=MAX_CODE_LEN as usize {
            first_code[len] = code;
            offset[len] = idx;
            if code + count[len] > 1 << len {
                return Err(BzError::corrupt("code lengths oversubscribe the code space"));
            }
            code = (code + count[len]) << 1;
            idx += count[len];
        }

        let mut by_len: Vec<(u32, u16)> = lengths
            .iter()
            .enumerate()
            .map(|(sym, &len)| (len, sym as u16))
            .collect();
        by_len.sort_unstable();

        Ok(Self {
            first_code,
            offset,
            count,
            symbols: by_len.into_iter().map(|(_, sym)| sym).collect(),
        })
    }

    /// Read one symbol, a bit at a time from the shortest length up.
    fn decode(&self, br: &mut BitReader<'_>) -> Result<u16> {
        let mut code = 0_u32;
        for len in 1..=MAX_CODE_LEN as usize {
            let bit = br
                .bit()
                .ok_or_else(|| BzError::corrupt("payload ended inside a huffman code"))?;
            code = code << 1 | bit as u32;
            if code < self.first_code[len] + self.count[len] {
                return Ok(self.symbols[(self.offset[len] + code - self.first_code[len]) as usize]);
            }
        }
        Err(BzError::corrupt("bits match no huffman code"))
    }
}

/// Decode the tables, selectors and symbols written by huf_encode. Returns the symbols without
/// the EOB. `max_symbols` bounds how many symbols (EOB included) the block may carry.
pub fn huf_decode(br: &mut BitReader<'_>, eob: u16, max_symbols: usize) -> Result<Vec<u16>> {
    let eof = || BzError::corrupt("payload ended inside the huffman header");
    let alpha_size = eob as usize + 1;

    let table_count = br.bint(3).ok_or_else(eof)?;
    if !(MIN_TABLES..=MAX_TABLES).contains(&table_count) {
        return Err(BzError::corrupt(format!("invalid table count {}", table_count)));
    }
    let selector_count = br.bint(15).ok_or_else(eof)?;
    if selector_count == 0 || selector_count > max_symbols.div_ceil(CHUNK_SIZE) {
        return Err(BzError::corrupt(format!(
            "invalid selector count {}",
            selector_count
        )));
    }

    // Read the unary selectors and undo their move to front.
    let mut table_idx: Vec<usize> = (0..table_count).collect();
    let mut selectors = Vec::with_capacity(selector_count);
    for _ in 0..selector_count {
        let mut idx = 0;
        while br.bool_bit().ok_or_else(eof)? {
            idx += 1;
            if idx >= table_count {
                return Err(BzError::corrupt("selector names a missing table"));
            }
        }
        let table = table_idx.remove(idx);
        table_idx.insert(0, table);
        selectors.push(table);
    }

    // Read the delta coded lengths of each table.
    let mut tables = Vec::with_capacity(table_count);
    for _ in 0..table_count {
        let mut len = br.bint(5).ok_or_else(eof)? as i32;
        let mut lengths = Vec::with_capacity(alpha_size);
        for _ in 0..alpha_size {
            while br.bool_bit().ok_or_else(eof)? {
                if br.bool_bit().ok_or_else(eof)? {
                    len -= 1;
                } else {
                    len += 1;
                }
                if !(1..=MAX_CODE_LEN as i32).contains(&len) {
                    return Err(BzError::corrupt(format!("code length {} out of range", len)));
                }
            }
            lengths.push(len as u32);
        }
        tables.push(DecodeTable::new(&lengths)?);
    }

    // Decode symbols, switching tables every 50 symbols, until the EOB.
    let mut out = Vec::with_capacity(selector_count * CHUNK_SIZE);
    for (chunk, &selector) in selectors.iter().enumerate() {
        let table = &tables[selector];
        for _ in 0..CHUNK_SIZE {
            let sym = table.decode(br)?;
            if sym == eob {
                if chunk != selector_count - 1 {
                    return Err(BzError::corrupt("end of block before the last selector"));
                }
                if br.remaining_bits() >= 8 {
                    return Err(BzError::corrupt("data after the end of block"));
                }
                return Ok(out);
            }
            out.push(sym);
        }
    }
    Err(BzError::corrupt("selectors ran out before the end of block"))
}
