use log::{debug, info};

use super::compress_block::compress_block;
use super::framing::{push_block, push_footer, push_stream_header};
use super::options::{BlockSize, BzOpts};
use crate::error::{BzError, Result};
use crate::tools::crc::do_crc;

/*
    The compressor owns a buffer that collects input until it holds a whole block. Each full
    block is sent through compress_block and framed right away, so every byte handed back to
    the caller belongs to a complete, checksummed block record. Whatever is left in the buffer
    is encoded as a short final block by finish().
*/

/// Lifecycle of a compression session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressorState {
    /// Accepting input. The buffer holds less than one block.
    Buffering,
    /// finish() has run; the stream footer has been emitted.
    Finished,
}

/// Incremental compression session: construct, feed any number of chunks, finish, drop.
#[derive(Debug)]
pub struct Compressor {
    opts: BzOpts,
    buffer: Vec<u8>,
    state: CompressorState,
    header_written: bool,
    stream_crc: u32,
    total_in: u64,
    total_out: u64,
    blocks: u32,
}

/// Create a compressor for the given block size class (1..=9) with default options.
pub fn new_compressor(block_size_class: u8) -> Result<Compressor> {
    Ok(Compressor::new(BzOpts::new(BlockSize::new(block_size_class)?)))
}

impl Compressor {
    pub fn new(opts: BzOpts) -> Self {
        Self {
            buffer: Vec::with_capacity(opts.block_size.bytes()),
            opts,
            state: CompressorState::Buffering,
            header_written: false,
            stream_crc: 0,
            total_in: 0,
            total_out: 0,
            blocks: 0,
        }
    }

    /// Accept a chunk of input. Returns the framed bytes of every block this chunk completed,
    /// which is empty while the session is still buffering.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        if self.state == CompressorState::Finished {
            return Err(BzError::InvalidState("feed called after finish"));
        }
        self.stream_crc = do_crc(self.stream_crc, chunk);
        self.total_in += chunk.len() as u64;

        let capacity = self.opts.block_size.bytes();
        let mut out = Vec::new();
        let mut rest = chunk;

        while !rest.is_empty() {
            // Whole blocks straight from the caller's chunk skip the copy.
            if self.buffer.is_empty() && rest.len() >= capacity {
                let (block, tail) = rest.split_at(capacity);
                self.emit_block(block, &mut out);
                rest = tail;
                continue;
            }
            let take = (capacity - self.buffer.len()).min(rest.len());
            self.buffer.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if self.buffer.len() == capacity {
                let block = std::mem::take(&mut self.buffer);
                self.emit_block(&block, &mut out);
                self.buffer = block;
                self.buffer.clear();
            }
        }

        if out.is_empty() {
            debug!("buffering {} of {} bytes", self.buffer.len(), capacity);
        }
        self.total_out += out.len() as u64;
        Ok(out)
    }

    /// Encode any partial block, append the stream footer and end the session.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        if self.state == CompressorState::Finished {
            return Err(BzError::InvalidState("finish called twice"));
        }
        let mut out = Vec::new();
        if !self.buffer.is_empty() {
            let block = std::mem::take(&mut self.buffer);
            self.emit_block(&block, &mut out);
        }
        self.buffer = Vec::new();
        if !self.header_written {
            push_stream_header(&mut out, self.opts.block_size);
            self.header_written = true;
        }
        push_footer(&mut out, self.stream_crc, self.total_in);
        self.state = CompressorState::Finished;
        self.total_out += out.len() as u64;

        info!(
            "Finished stream: {} blocks, {} bytes in, {} bytes out, crc {:08x}.",
            self.blocks, self.total_in, self.total_out, self.stream_crc
        );
        Ok(out)
    }

    /// Encode and frame one block, writing the stream header first if it is still owed.
    fn emit_block(&mut self, block: &[u8], out: &mut Vec<u8>) {
        if !self.header_written {
            push_stream_header(out, self.opts.block_size);
            self.header_written = true;
        }
        let encoded = compress_block(block, self.opts.iterations);
        push_block(
            out,
            self.opts.block_size,
            encoded.original_len,
            &encoded.payload,
        );
        self.blocks += 1;
        info!(
            "Wrote block {}: {} bytes in, {} bytes of payload.",
            self.blocks,
            block.len(),
            encoded.payload.len()
        );
    }

    pub fn state(&self) -> CompressorState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == CompressorState::Finished
    }

    /// Input bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Compressed bytes handed back so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Blocks emitted so far.
    pub fn blocks(&self) -> u32 {
        self.blocks
    }

    /// Input bytes waiting for the next block boundary or for finish().
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn block_size(&self) -> BlockSize {
        self.opts.block_size
    }
}

/// Compress a whole buffer in one go.
pub fn compress(data: &[u8], block_size_class: u8) -> Result<Vec<u8>> {
    let mut compressor = new_compressor(block_size_class)?;
    let mut out = compressor.feed(data)?;
    out.extend(compressor.finish()?);
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::framing::{BLOCK_MAGIC, FOOTER_MAGIC};

    #[test]
    fn small_feed_buffers() {
        let mut c = new_compressor(1).unwrap();
        assert!(c.feed(b"hello").unwrap().is_empty());
        assert_eq!(c.pending(), 5);
        assert_eq!(c.total_in(), 5);
        let tail = c.finish().unwrap();
        assert_eq!(&tail[..4], b"BZi1");
        assert_eq!(&tail[4..10], &BLOCK_MAGIC);
        assert!(c.is_finished());
        assert_eq!(c.blocks(), 1);
        assert_eq!(c.total_out(), tail.len() as u64);
    }

    #[test]
    fn full_block_is_emitted() {
        let mut c = new_compressor(1).unwrap();
        let data = vec![b'x'; 100_000 + 10];
        let out = c.feed(&data).unwrap();
        assert!(!out.is_empty());
        assert_eq!(c.blocks(), 1);
        assert_eq!(c.pending(), 10);
    }

    #[test]
    fn buffer_never_holds_a_full_block() {
        let mut c = new_compressor(1).unwrap();
        let chunk = vec![7_u8; 33_333];
        for _ in 0..7 {
            c.feed(&chunk).unwrap();
            assert!(c.pending() < 100_000);
        }
        assert_eq!(c.blocks(), 2);
    }

    #[test]
    fn empty_stream() {
        let mut c = new_compressor(9).unwrap();
        let out = c.finish().unwrap();
        assert_eq!(&out[..4], b"BZi9");
        assert_eq!(&out[4..10], &FOOTER_MAGIC);
        assert_eq!(out.len(), 4 + 6 + 12);
    }

    #[test]
    fn misuse_after_finish() {
        let mut c = new_compressor(1).unwrap();
        c.finish().unwrap();
        assert!(matches!(c.feed(b"more"), Err(BzError::InvalidState(_))));
        assert!(matches!(c.finish(), Err(BzError::InvalidState(_))));
        assert_eq!(c.state(), CompressorState::Finished);
    }

    #[test]
    fn bad_class() {
        assert_eq!(
            new_compressor(0).unwrap_err(),
            BzError::UnsupportedBlockSize(0)
        );
        assert!(compress(b"x", 12).is_err());
    }
}
