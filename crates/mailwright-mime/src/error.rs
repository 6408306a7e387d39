//! Error types for MIME writing.

use std::io;

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
///
/// Header folding never fails; these come from the writer and from reading
/// typed values back out of a [`Header`](crate::Header).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from the underlying writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid MIME header.
    #[error("Invalid MIME header: {0}")]
    InvalidHeader(String),

    /// Invalid content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// A part was requested from a writer whose body is not multipart.
    #[error("Cannot create a part in a non-multipart body")]
    NotMultipart,
}
