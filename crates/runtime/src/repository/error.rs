//! Error types raised by repository implementations.

use thiserror::Error;

use battle_core::LogCodecError;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("battle log repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("log encoding failed: {0}")]
    Encode(#[from] LogCodecError),

    #[error("log at offset {offset} failed to decode: {source}")]
    Codec {
        offset: u64,
        #[source]
        source: LogCodecError,
    },

    #[error("encoded log of {0} bytes does not fit a frame")]
    FrameTooLarge(usize),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("log already exists: {0}")]
    LogAlreadyExists(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
