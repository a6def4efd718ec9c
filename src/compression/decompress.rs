use log::{debug, error, info};

use super::compress_block::decompress_block;
use super::framing::{
    self, BlockHeader, Record, BLOCK_CRC_LEN, BLOCK_HEADER_LEN, FOOTER_LEN, RECORD_MAGIC_LEN,
    STREAM_HEADER_LEN,
};
use super::options::BlockSize;
use crate::error::{BzError, Result};
use crate::tools::crc::do_crc;

/*
    The decompressor is a resumable parser. Each state knows how many bytes its next field
    needs. Input is copied into `pending` until that field is complete, then the field is
    handled and the parser moves on. Nothing is ever parsed from a partial field, so the
    stream may arrive in chunks of any size, down to a single byte.
*/

/// Public view of where the parser is in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressorState {
    ExpectStreamHeader,
    ExpectBlockHeader,
    ExpectBlockBody,
    ExpectFooter,
    Done,
    Error,
}

/// Parser state, with whatever each state needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parse {
    StreamHeader,
    RecordMagic,
    BlockHeader,
    BlockBody(BlockHeader),
    Footer,
    Done,
    Failed,
}

/// Incremental decompression session.
#[derive(Debug)]
pub struct Decompressor {
    parse: Parse,
    pending: Vec<u8>,
    block_size: Option<BlockSize>,
    stream_crc: u32,
    total_in: u64,
    total_out: u64,
    blocks: u32,
    finished: bool,
}

pub fn new_decompressor() -> Decompressor {
    Decompressor::new()
}

impl Default for Decompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor {
    pub fn new() -> Self {
        Self {
            parse: Parse::StreamHeader,
            pending: Vec::new(),
            block_size: None,
            stream_crc: 0,
            total_in: 0,
            total_out: 0,
            blocks: 0,
            finished: false,
        }
    }

    /// Accept a chunk of the compressed stream and return any plaintext it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        if self.finished {
            return Err(BzError::InvalidState("feed called after finish"));
        }
        if self.parse == Parse::Failed {
            return Err(BzError::InvalidState("feed called after an error"));
        }
        self.total_in += chunk.len() as u64;

        let mut out = Vec::new();
        match self.parse_chunk(chunk, &mut out) {
            Ok(()) => {
                self.total_out += out.len() as u64;
                Ok(out)
            }
            Err(e) => {
                error!("Decompression failed after {} blocks: {}", self.blocks, e);
                self.parse = Parse::Failed;
                self.pending = Vec::new();
                Err(e)
            }
        }
    }

    /// End the session. Fails unless the whole stream, footer included, has been read.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Err(BzError::InvalidState("finish called twice"));
        }
        let result = match self.parse {
            Parse::Done => Ok(()),
            Parse::Failed => Err(BzError::InvalidState("finish called after an error")),
            Parse::StreamHeader => Err(BzError::TruncatedStream("expecting the stream header")),
            Parse::RecordMagic | Parse::BlockHeader => {
                Err(BzError::TruncatedStream("expecting a block header"))
            }
            Parse::BlockBody(_) => Err(BzError::TruncatedStream("inside a block")),
            Parse::Footer => Err(BzError::TruncatedStream("expecting the footer")),
        };
        match &result {
            Ok(()) => {
                self.finished = true;
                info!(
                    "Stream complete: {} blocks, {} bytes in, {} bytes out.",
                    self.blocks, self.total_in, self.total_out
                );
            }
            Err(BzError::TruncatedStream(_)) => self.parse = Parse::Failed,
            Err(_) => {}
        }
        result
    }

    /// Bytes the current state needs before it can be handled.
    fn field_len(&self) -> usize {
        match self.parse {
            Parse::StreamHeader => STREAM_HEADER_LEN,
            Parse::RecordMagic => RECORD_MAGIC_LEN,
            Parse::BlockHeader => BLOCK_HEADER_LEN,
            Parse::BlockBody(header) => header.payload_len as usize + BLOCK_CRC_LEN,
            Parse::Footer => FOOTER_LEN,
            Parse::Done | Parse::Failed => 0,
        }
    }

    fn parse_chunk(&mut self, chunk: &[u8], out: &mut Vec<u8>) -> Result<()> {
        let mut input = chunk;
        loop {
            if self.parse == Parse::Done {
                if !input.is_empty() {
                    return Err(BzError::corrupt(format!(
                        "{} bytes after the end of stream",
                        input.len()
                    )));
                }
                return Ok(());
            }

            let need = self.field_len();
            let take = (need - self.pending.len()).min(input.len());
            self.pending.extend_from_slice(&input[..take]);
            input = &input[take..];
            if self.pending.len() < need {
                return Ok(());
            }

            let field = std::mem::take(&mut self.pending);
            self.step(&field, out)?;
            self.pending = field;
            self.pending.clear();
        }
    }

    /// Handle one complete field and move to the next state.
    fn step(&mut self, field: &[u8], out: &mut Vec<u8>) -> Result<()> {
        self.parse = match self.parse {
            Parse::StreamHeader => {
                let block_size = framing::parse_stream_header(field)?;
                info!("Found a valid stream header, block size class {}.", block_size.class());
                self.block_size = Some(block_size);
                Parse::RecordMagic
            }
            Parse::RecordMagic => match framing::parse_record_magic(field)? {
                Record::Block => Parse::BlockHeader,
                Record::Footer => Parse::Footer,
            },
            Parse::BlockHeader => {
                let block_size = self
                    .block_size
                    .ok_or(BzError::InvalidState("block before stream header"))?;
                Parse::BlockBody(framing::parse_block_header(field, block_size)?)
            }
            Parse::BlockBody(header) => {
                let block_size = self
                    .block_size
                    .ok_or(BzError::InvalidState("block before stream header"))?;
                let payload = framing::verify_block(&header, block_size, field)?;
                let data = decompress_block(payload, header.original_len as usize)?;
                self.stream_crc = do_crc(self.stream_crc, &data);
                self.blocks += 1;
                debug!(
                    "Block {} decoded to {} bytes, stream crc now {:08x}.",
                    self.blocks,
                    data.len(),
                    self.stream_crc
                );
                out.extend_from_slice(&data);
                Parse::RecordMagic
            }
            Parse::Footer => {
                let footer = framing::parse_footer(field);
                let total = self.total_out + out.len() as u64;
                if footer.stream_crc != self.stream_crc {
                    return Err(BzError::corrupt(format!(
                        "stream crc {:08x} does not match {:08x}",
                        self.stream_crc, footer.stream_crc
                    )));
                }
                if footer.total != total {
                    return Err(BzError::corrupt(format!(
                        "stream holds {} bytes, footer says {}",
                        total, footer.total
                    )));
                }
                info!("Stream CRCs matched: {:08x}.", footer.stream_crc);
                Parse::Done
            }
            Parse::Done | Parse::Failed => {
                return Err(BzError::InvalidState("no field expected"));
            }
        };
        Ok(())
    }

    pub fn state(&self) -> DecompressorState {
        match self.parse {
            Parse::StreamHeader => DecompressorState::ExpectStreamHeader,
            Parse::RecordMagic | Parse::BlockHeader => DecompressorState::ExpectBlockHeader,
            Parse::BlockBody(_) => DecompressorState::ExpectBlockBody,
            Parse::Footer => DecompressorState::ExpectFooter,
            Parse::Done => DecompressorState::Done,
            Parse::Failed => DecompressorState::Error,
        }
    }

    /// Block size class from the stream header, once it has been read.
    pub fn block_size(&self) -> Option<BlockSize> {
        self.block_size
    }

    /// Compressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Plaintext bytes handed back so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    pub fn blocks(&self) -> u32 {
        self.blocks
    }
}

/// Decompress a whole stream in one go.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decompressor = new_decompressor();
    let out = decompressor.feed(data)?;
    decompressor.finish()?;
    Ok(out)
}
