//! The bitstream module is the bit level I/O layer of the block coder.
//!
//! Entropy coded symbols, code length tables and block headers are written MSB first with the
//! BitWriter and read back with the BitReader. A block payload always ends on a byte boundary
//! (the writer pads with zero bits), so each block can be framed and checked on its own.
//!
//! Neither side touches a file or socket. The sessions hand complete payloads in and out.
//!
pub mod bitreader;
pub mod bitwriter;
