//! Incremental block-sorting compression.
//!
//! Provides caller owned compression and decompression sessions that accept input in chunks of
//! any size and hand back output as soon as it is complete. Data is cut into blocks of
//! 100k-900k bytes; each block goes through run length encoding, the Burrows-Wheeler transform,
//! move-to-front and huffman coding, and is framed with its own CRC.
//!
//! Basic usage:
//!
//! ```
//! use bzstream::{new_compressor, new_decompressor};
//!
//! let mut compressor = new_compressor(1).unwrap();
//! let mut stream = compressor.feed(b"hello, hello, hello").unwrap();
//! stream.extend(compressor.finish().unwrap());
//!
//! let mut decompressor = new_decompressor();
//! let plain = decompressor.feed(&stream).unwrap();
//! decompressor.finish().unwrap();
//! assert_eq!(plain, b"hello, hello, hello");
//! ```
//!
#![warn(rust_2018_idioms)]
pub mod bitstream;
pub mod bwt_algorithms;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use compression::compress::{compress, new_compressor, Compressor, CompressorState};
pub use compression::decompress::{decompress, new_decompressor, Decompressor, DecompressorState};
pub use compression::options::{BlockSize, BzOpts};
pub use error::{BzError, Result};
