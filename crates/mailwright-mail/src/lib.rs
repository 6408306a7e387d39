//! # mailwright-mail
//!
//! Composes mail messages made of text parts and attachments on top of
//! [`mailwright_mime`].
//!
//! ## Message Layout
//!
//! ```text
//! multipart/mixed
//! ├── multipart/alternative   (create_inline)
//! │   ├── text/plain
//! │   └── text/html
//! └── application/pdf          (create_attachment)
//! ```
//!
//! Inline parts default to `Content-Disposition: inline` and
//! Quoted-Printable for text (Base64 otherwise). Attachments default to
//! `Content-Disposition: attachment` and Base64. Every header field is folded
//! to 76 columns when written.
//!
//! ## Quick Start
//!
//! ```
//! use mailwright_mail::{Address, InlineHeader, MailHeader, MailWriter};
//! use std::io::Write;
//!
//! # fn main() -> mailwright_mail::Result<()> {
//! let mut header = MailHeader::new();
//! header.set_address_list("From", &[Address::with_name("Mitsuha Miyamizu", "mitsuha@example.org")]);
//! header.set_address_list("To", &[Address::new("taki@example.org")]);
//! header.set_subject("Have we met?");
//!
//! let mut out = Vec::new();
//! let mut mail = MailWriter::new(&mut out, header)?;
//!
//! let mut inline = mail.create_inline()?;
//!
//! let mut plain = InlineHeader::new();
//! plain.set("Content-Type", "text/plain; charset=utf-8");
//! let mut part = inline.create_part(plain)?;
//! part.write_all(b"I feel like I've been looking for someone.")?;
//! part.close()?;
//!
//! let mut html = InlineHeader::new();
//! html.set("Content-Type", "text/html; charset=utf-8");
//! let mut part = inline.create_part(html)?;
//! part.write_all(b"<p>I feel like I've been looking for someone.</p>")?;
//! part.close()?;
//!
//! inline.close()?;
//! mail.close()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod header;
mod writer;

pub use header::{Address, AttachmentHeader, InlineHeader, MailHeader};
pub use writer::{InlineWriter, MailWriter};

pub use mailwright_mime::{
    ContentType, Disposition, Error, Header, Result, TransferEncoding, Writer, WriterConfig,
    format_header_field,
};
