//! # mailwright-mime
//!
//! Header folding and streaming MIME entity writing.
//!
//! ## Features
//!
//! - **Header folding**: RFC 5322 line folding at 76 columns, preferring
//!   whitespace and keeping pre-folded values intact
//! - **Ordered headers**: fields are written in insertion order
//! - **Streaming bodies**: Base64 and Quoted-Printable encoders over any
//!   [`std::io::Write`]
//! - **Multipart**: nested multipart entities with generated boundaries
//!
//! ## Quick Start
//!
//! ### Folding a Header Field
//!
//! ```
//! use mailwright_mime::format_header_field;
//!
//! let folded = format_header_field(
//!     "Subject",
//!     "This is a very long subject, much longer than just the 76 characters limit that applies to message header fields",
//! );
//! assert_eq!(
//!     folded,
//!     "Subject: This is a very long subject, much longer than just the 76\r\n characters limit that applies to message header fields\r\n",
//! );
//! ```
//!
//! ### Writing an Entity
//!
//! ```
//! use mailwright_mime::{Header, Writer, WriterConfig};
//! use std::io::Write;
//!
//! # fn main() -> mailwright_mime::Result<()> {
//! let mut header = Header::new();
//! header.set("Content-Type", "text/plain; charset=utf-8");
//! header.set("Content-Transfer-Encoding", "quoted-printable");
//!
//! let config = WriterConfig::builder().mime_version(false).build();
//! let mut out = Vec::new();
//! let mut writer = Writer::with_config(&mut out, header, &config)?;
//! writer.write_all("Grüße".as_bytes())?;
//! writer.close()?;
//!
//! assert!(out.ends_with(b"\r\n\r\nGr=C3=BC=C3=9Fe"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod content_type;
mod error;
mod fold;
mod header;
mod writer;

pub mod encoding;

pub use config::{DEFAULT_BOUNDARY_LENGTH, MAX_BOUNDARY_LENGTH, WriterConfig, WriterConfigBuilder};
pub use content_type::{ContentType, Disposition};
pub use encoding::TransferEncoding;
pub use error::{Error, Result};
pub use fold::{MAX_HEADER_LEN, format_header_field};
pub use header::Header;
pub use writer::Writer;
