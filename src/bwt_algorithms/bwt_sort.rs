use log::trace;

use crate::error::{BzError, Result};
use crate::tools::freq_count::freqs;

/*
Rotations are sorted by prefix doubling. After the pass with width w every rotation carries a
rank that orders it by its first 2w bytes, so each pass only has to sort (rank, rank at +w)
pairs. Blocks of a single repeated byte or any periodic data end up with tied ranks once 2w
reaches the block length; tied rotations are identical, so either order gives the same output.
*/

/// Burrows-Wheeler-Transform over the cyclic rotations of the block.
/// This returns a u32 Key (the row of the unrotated block) and a u8 vec of the BWT data.
pub fn bwt_encode(data: &[u8]) -> (u32, Vec<u8>) {
    let end = data.len();
    if end == 0 {
        return (0, vec![]);
    }

    let mut index = (0_u32..end as u32).collect::<Vec<u32>>();
    let mut rank = data.iter().map(|&b| b as u32).collect::<Vec<u32>>();
    let mut next_rank = vec![0_u32; end];
    let mut sort_keys = vec![0_u64; end];
    let mut width = 1_usize;
    let mut passes = 0;

    loop {
        for (i, key) in sort_keys.iter_mut().enumerate() {
            *key = (rank[i] as u64) << 32 | rank[(i + width) % end] as u64;
        }
        // Ties go to the lower position so the output never depends on the sort.
        index.sort_unstable_by_key(|&i| (sort_keys[i as usize], i));

        let mut current = 0_u32;
        next_rank[index[0] as usize] = 0;
        for pair in index.windows(2) {
            if sort_keys[pair[1] as usize] != sort_keys[pair[0] as usize] {
                current += 1;
            }
            next_rank[pair[1] as usize] = current;
        }
        std::mem::swap(&mut rank, &mut next_rank);
        passes += 1;

        if current as usize == end - 1 || width * 2 >= end {
            break;
        }
        width *= 2;
    }
    trace!("\r\x1b[43mSorted {} rotations in {} passes.     \x1b[0m", end, passes);

    // Get key and BWT output
    let mut key = 0_u32;
    let mut bwt = vec![0; end];
    for (i, &row) in index.iter().enumerate() {
        if row == 0 {
            key = i as u32;
            bwt[i] = data[end - 1];
        } else {
            bwt[i] = data[row as usize - 1];
        }
    }
    (key, bwt)
}

/// Decode a Burrows-Wheeler-Transform starting from the row given by key.
pub fn bwt_decode(key: u32, bwt_in: &[u8]) -> Result<Vec<u8>> {
    let end = bwt_in.len();
    if end == 0 {
        return Ok(vec![]);
    }
    if key as usize >= end {
        return Err(BzError::corrupt(format!(
            "BWT key {} outside a block of {} bytes",
            key, end
        )));
    }

    // Convert frequency count to a cumulative sum of frequencies
    let freq_in = freqs(bwt_in);
    let mut freq = [0_u32; 256];
    for i in 0..255 {
        freq[i + 1] = freq[i] + freq_in[i];
    }

    // Build the transformation vector to find the next character in the original data
    let mut t_vec = vec![0_u32; end];
    for (i, &s) in bwt_in.iter().enumerate() {
        t_vec[freq[s as usize] as usize] = i as u32;
        freq[s as usize] += 1
    }

    // Walk the vector from the key to recover the data
    let mut out = Vec::with_capacity(end);
    let mut next = t_vec[key as usize] as usize;
    for _ in 0..end {
        out.push(bwt_in[next]);
        next = t_vec[next] as usize;
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn banana() {
        let (key, bwt) = bwt_encode(b"banana");
        // Rotations sorted: abanan, anaban, ananab, banana, nabana, nanaba
        assert_eq!(bwt, b"nnbaaa");
        assert_eq!(key, 3);
        assert_eq!(bwt_decode(key, &bwt).unwrap(), b"banana");
    }

    #[test]
    fn single_byte() {
        let (key, bwt) = bwt_encode(b"q");
        assert_eq!((key, bwt.as_slice()), (0, &b"q"[..]));
        assert_eq!(bwt_decode(key, &bwt).unwrap(), b"q");
    }

    #[test]
    fn repeated_byte() {
        let data = vec![b'z'; 37];
        let (key, bwt) = bwt_encode(&data);
        assert_eq!(bwt, data);
        assert_eq!(bwt_decode(key, &bwt).unwrap(), data);
    }

    #[test]
    fn periodic_data() {
        let data = b"abcabcabcabcabcabc".to_vec();
        let (key, bwt) = bwt_encode(&data);
        assert_eq!(bwt_decode(key, &bwt).unwrap(), data);
    }

    #[test]
    fn deterministic() {
        let data = b"If Peter Piper picked a peck of pickled peppers".to_vec();
        assert_eq!(bwt_encode(&data), bwt_encode(&data));
        let (key, bwt) = bwt_encode(&data);
        assert_eq!(bwt_decode(key, &bwt).unwrap(), data);
    }

    #[test]
    fn key_past_end_is_corrupt() {
        assert!(matches!(
            bwt_decode(6, b"nnbaaa"),
            Err(BzError::CorruptStream(_))
        ));
    }
}
