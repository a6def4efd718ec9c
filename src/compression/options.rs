//! Library options: the block size class and the huffman refinement effort.
use crate::error::{BzError, Result};

/// Input bytes per block for each step of the size class.
pub const BLOCK_UNIT: usize = 100_000;
const MAX_ITERATIONS: usize = 10;

/// Validated block size class, 1..=9. A block holds class * 100_000 input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BlockSize(u8);

impl BlockSize {
    pub fn new(class: u8) -> Result<Self> {
        match class {
            1..=9 => Ok(Self(class)),
            other => Err(BzError::UnsupportedBlockSize(other)),
        }
    }

    /// Read the class from its stream header byte ('1'..='9').
    pub fn from_header_byte(byte: u8) -> Result<Self> {
        Self::new(byte.wrapping_sub(b'0'))
    }

    pub fn header_byte(self) -> u8 {
        b'0' + self.0
    }

    pub fn class(self) -> u8 {
        self.0
    }

    /// Capacity of one block, in input bytes.
    pub fn bytes(self) -> usize {
        self.0 as usize * BLOCK_UNIT
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self(9)
    }
}

/// Options for a compression session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BzOpts {
    /// Maximum input block size to process during each loop
    pub block_size: BlockSize,
    /// Passes used to refine the huffman tables of each block
    pub iterations: usize,
}

impl BzOpts {
    pub fn new(block_size: BlockSize) -> Self {
        Self {
            block_size,
            iterations: 4,
        }
    }

    /// Set the refinement passes, kept within 1..=10.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.clamp(1, MAX_ITERATIONS);
        self
    }
}

impl Default for BzOpts {
    fn default() -> Self {
        Self::new(BlockSize::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classes() {
        assert_eq!(BlockSize::new(1).unwrap().bytes(), 100_000);
        assert_eq!(BlockSize::new(9).unwrap().header_byte(), b'9');
        assert_eq!(BlockSize::new(0), Err(BzError::UnsupportedBlockSize(0)));
        assert_eq!(BlockSize::new(10), Err(BzError::UnsupportedBlockSize(10)));
        assert_eq!(BlockSize::from_header_byte(b'4').unwrap().class(), 4);
        assert!(BlockSize::from_header_byte(b'h').is_err());
    }

    #[test]
    fn iterations_are_clamped() {
        assert_eq!(BzOpts::default().with_iterations(0).iterations, 1);
        assert_eq!(BzOpts::default().with_iterations(50).iterations, 10);
        assert_eq!(BzOpts::default().iterations, 4);
    }
}
