use std::io;
use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The bit stream ended before a structurally required read completed.
    #[error("stream truncated while reading {context}")]
    StreamTruncated { context: &'static str },

    /// A byte to compress has no path in the encoding table.
    #[error("byte 0x{byte:02x} has no code in the encoding table")]
    EncodingError { byte: u8 },

    /// The tree cannot drive a codec: too deep, too many leaves, a missing
    /// or repeated sentinel, or a repeated byte.
    #[error("malformed tree: {reason}")]
    MalformedTree { reason: String },

    /// Any other failure of the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Lifts an I/O error from a bit reader, treating end of stream as truncation.
    pub(crate) fn from_read(err: io::Error, context: &'static str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::StreamTruncated { context }
        } else {
            Error::Io(err)
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedTree {
            reason: reason.into(),
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::StreamTruncated { .. })
    }
}
