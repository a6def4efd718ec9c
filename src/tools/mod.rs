//! The tools module provides the smaller stages and helpers of the block coder.
//!
//! The tools are:
//! - cli: Command line interface for the demo binary.
//! - crc: CRC-32 checksums, both block and stream versions.
//! - freq_count: Frequency count of a block.
//! - rle1: Run-Length-Encoding phase 1.
//! - rle2_mtf: Move-To-Front transform and Run-Length-Encoding phase 2 (integrated for speed).
//! - symbol_map: Encode and decode the symbol map.
//!
pub mod cli;
pub mod crc;
pub mod freq_count;
pub mod rle1;
pub mod rle2_mtf;
pub mod symbol_map;
