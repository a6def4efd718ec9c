//! The symbol map records which byte values occur in a block.
//!
//! There are 256 possible u8s, which equals 16 sets of 16 u8s. The existence of every u8 can be
//! marked by setting bits in 16 16-bit words. Since most blocks use only a subset of the byte
//! values, only the words that have at least one bit set are kept, prefaced by an index word that
//! has a bit set for each word that follows.
const BIT_MASK: u16 = 0x8000;

/// Takes a presence array of all u8s used at the BWT stage and returns a symbol map. The
/// index word always comes first, even when no symbols are present.
pub fn encode_sym_map(present: &[bool; 256]) -> Vec<u16> {
    let mut sym_maps: Vec<u16> = vec![0; 17]; // Index and 16 maps

    // Eg 'A' is 0100_0001, so map 4 (0100) would have bit 1 (0001) set.
    present.iter().enumerate().for_each(|(idx, &sym)| {
        if sym {
            sym_maps[0] |= BIT_MASK >> (idx >> 4);
            sym_maps[1 + (idx >> 4)] |= BIT_MASK >> (idx & 15)
        }
    });

    // Return the index plus only those maps that have bits set.
    let index = sym_maps[0];
    let mut out = vec![index];
    out.extend(sym_maps.into_iter().skip(1).filter(|&map| map > 0));
    out
}

/// Takes a symbol map and returns a sorted vec of all u8s it marks as used.
pub fn decode_sym_map(symbol_map: &[u16]) -> Vec<u8> {
    let mut symbols: Vec<u8> = Vec::with_capacity(256);
    let mut map_idx = 0;

    for block in 0..16_u8 {
        if (symbol_map[0] & (BIT_MASK >> block)) > 0 {
            map_idx += 1;
            let map = symbol_map.get(map_idx).copied().unwrap_or(0);
            for byte_idx in 0..16_u8 {
                if (map & (BIT_MASK >> byte_idx)) > 0 {
                    symbols.push((block << 4) + byte_idx);
                };
            }
        }
    }
    symbols
}

#[cfg(test)]
mod test {
    use super::*;

    fn presence(data: &[u8]) -> [bool; 256] {
        let mut present = [false; 256];
        data.iter().for_each(|&b| present[b as usize] = true);
        present
    }

    #[test]
    fn encode_symbol_map_test() {
        let maps = encode_sym_map(&presence(b"Making a silly test."));
        assert_eq!(maps, vec![11008, 32770, 4, 17754, 6208]);
    }

    #[test]
    fn decode_symbol_map_test() {
        let maps = vec![11008, 32770, 4, 17754, 6208];
        let mut compare = "Making a silly test.".as_bytes().to_vec();
        compare.sort_unstable();
        compare.dedup();
        assert_eq!(compare, decode_sym_map(&maps));
    }

    #[test]
    fn decode_symbol_map_full_test() {
        let maps = vec![0xffff; 17];
        let compare = (0..=255).collect::<Vec<u8>>();
        assert_eq!(compare, decode_sym_map(&maps));
        assert_eq!(encode_sym_map(&[true; 256]), maps);
    }
}
