//! The compression module holds the streaming sessions and the per-block pipeline.
//!
//! Compression of each block happens in the following steps:
//! - Run Length Encoding 1: Compress all runs of 4-259 identical bytes.
//! - Burrow Wheeler Transform: Sort the rotations to increase the probability of runs of identical bytes.
//! - Move To Front transform: Increase the frequency of lower byte values.
//! - Run Length Encoding 2: Compress all runs of the zero rank.
//! - Huffman coding: Encode frequent symbols using shorter bit codes and less frequent symbols with longer ones.
//!
//! Decompression follows the inverse of the compression process.
//!
//! The Compressor and Decompressor are caller owned state machines. They never do I/O; bytes
//! go in and come out by value, and a session is used from one caller at a time. Independent
//! sessions share nothing and can run on as many threads as the caller likes.
//!

pub mod compress;
pub mod compress_block;
pub mod decompress;
pub mod framing;
pub mod options;
