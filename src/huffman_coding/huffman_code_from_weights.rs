//! This helper function is part of the huffman encoding system.
//!
//! The main huffman encoding function gathers symbol frequencies for every coding table. This
//! helper turns those frequencies into code lengths (depths in the huffman tree). Lengths are
//! capped at MAX_CODE_LEN bits. If the weights supplied create longer codes, the weights are
//! flattened and another attempt is made.
//!
//! Merging always takes the two lightest nodes; equal weights go to the node holding the lowest
//! symbol, so the same frequencies always give the same lengths.
//!
use std::cmp::Reverse;
use std::collections::BinaryHeap;

pub const MAX_CODE_LEN: u32 = 17;

/// Improve a slice of huffman code lengths using the symbol weights, for the symbols 0..=eob.
/// Every symbol gets a length of at least 1, even if its weight is 0.
pub fn improve_code_len_from_weights<'a>(
    codes: &'a mut [u32],  //[u32; 258]
    sym_weight: &'a [u32], //[u32; 258]
    eob: u16,              //symbol marking last valid entry in the above slices
) -> &'a [u32] {
    let count = eob as usize + 1;

    // A weight of 0 still needs a code, so it counts as 1.
    let mut weight = sym_weight
        .iter()
        .take(count)
        .map(|&f| f.max(1))
        .collect::<Vec<u32>>();

    loop {
        let depths = tree_depths(&weight);
        if depths.iter().all(|&d| d <= MAX_CODE_LEN) {
            codes[..count].copy_from_slice(&depths);
            break codes;
        }
        // Adjust weights by dividing each weight by 2 and adding 1. This "flattens" the tree.
        for w in weight.iter_mut() {
            *w = 1 + (*w / 2);
        }
    }
}

/// Build the tree and return how deep each leaf sits. Depth is the code length.
fn tree_depths(weight: &[u32]) -> Vec<u32> {
    let leaves = weight.len();
    if leaves == 1 {
        return vec![1];
    }

    // Heap entries are (weight, depth of subtree, lowest symbol, node). Leaves are nodes
    // 0..leaves, parents are numbered after them.
    let mut heap: BinaryHeap<Reverse<(u64, u32, u16, usize)>> = weight
        .iter()
        .enumerate()
        .map(|(sym, &w)| Reverse((w as u64, 0, sym as u16, sym)))
        .collect();
    let mut parent = vec![usize::MAX; leaves * 2 - 1];
    let mut next_node = leaves;

    while let (Some(Reverse(a)), Some(Reverse(b))) = (heap.pop(), heap.pop()) {
        parent[a.3] = next_node;
        parent[b.3] = next_node;
        heap.push(Reverse((
            a.0 + b.0,
            a.1.max(b.1) + 1,
            a.2.min(b.2),
            next_node,
        )));
        next_node += 1;
        if heap.len() == 1 {
            break;
        }
    }

    (0..leaves)
        .map(|leaf| {
            let mut depth = 0;
            let mut node = leaf;
            while parent[node] != usize::MAX {
                node = parent[node];
                depth += 1;
            }
            depth
        })
        .collect()
}
