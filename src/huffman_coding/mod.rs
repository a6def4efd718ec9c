//! The huffman module turns the MTF/RLE2 symbols of a block into the entropy coded bitstream,
//! and back.
//!
//! The coding is both block and chunk oriented. Within each block, chunks of 50 symbols are
//! encoded separately using one of two to six huffman tables. This allows for higher
//! compression ratios compared to using one huffman table per block.
//!
//! Tables are written as code lengths only. Codes are canonical, so the decoder rebuilds the
//! exact same codes from the lengths before it reads a single symbol.
//!
pub mod huffman;
pub mod huffman_code_from_weights;
