// Crate-wide error type.
//
// All errors are synchronous and raised at the point of violation; nothing
// is retried internally. An I/O fault during `send`/`receive` aborts the
// whole call and leaves the output stream truncated — callers must discard
// it. Weak-checksum collisions are never errors; they fall through to the
// next candidate during matching.

use thiserror::Error;

/// Errors produced by signature generation, delta matching, and the wire
/// codecs.
#[derive(Debug, Error)]
pub enum Error {
    /// A size, count, or option was outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// An operation was invoked before the object was ready for it.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// A window byte access outside `[0, window)`.
    #[error("index {index} out of range for window of {limit} bytes")]
    IndexOutOfRange { index: usize, limit: usize },

    /// A stream delivered fewer bytes than a declared length requires.
    #[error("short read: needed {expected} bytes, stream delivered {actual}")]
    ShortRead { expected: u64, actual: u64 },

    /// A seek was requested on a forward-only stream.
    #[error("stream not seekable: {0}")]
    NotSeekable(&'static str),

    /// The delta stream contained a record the receiver cannot interpret.
    #[error("corrupt delta stream: {0}")]
    CorruptDelta(String),

    /// An underlying I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
