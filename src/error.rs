//! Error type for string pool decoding and re-encoding.

use thiserror::Error;

/// Failure modes of the string pool codec.
#[derive(Debug, Error)]
pub enum Error {
    #[error("expected string-pool chunk type, found {0:#010x}")]
    InvalidChunkType(u32),

    #[error("string pool payload size {0} is not a multiple of 4")]
    UnalignedPayload(u32),

    #[error("string pool style trailer size {0} is not a multiple of 4")]
    UnalignedStyles(u32),

    #[error("spec-name rewrite cannot be applied to a pool with {0} style(s)")]
    UnexpectedStyles(u32),

    #[error("name {0:?} (char count {1}) cannot be encoded with a short-form length prefix")]
    NameTooLongForShortPrefix(String, usize),

    #[error("name {0:?} has char count {1} which does not match its encoded byte length {2}")]
    EncodingLengthMismatch(String, usize, usize),

    #[error("duplicate name {0:?} in spec-name rewrite input")]
    DuplicateName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
