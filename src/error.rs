//! Error taxonomy shared by the compressor and decompressor sessions.
//!
//! Every error is terminal for the session that produced it. The caller decides whether to
//! drop the session and start over.
use thiserror::Error;

/// Errors reported by the streaming engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BzError {
    /// The session was used after it finished or failed.
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),
    /// A magic number, CRC, length or encoded field did not check out.
    #[error("corrupt stream: {0}")]
    CorruptStream(String),
    /// `finish` was called before the stream footer was read.
    #[error("truncated stream: finished while {0}")]
    TruncatedStream(&'static str),
    /// The block size class is outside 1..=9.
    #[error("unsupported block size class {0}")]
    UnsupportedBlockSize(u8),
}

impl BzError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        BzError::CorruptStream(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, BzError>;
