//! Mail message writer.

use crate::header::{AttachmentHeader, InlineHeader, MailHeader};
use mailwright_mime::{ContentType, Disposition, Header, Result, TransferEncoding, Writer, WriterConfig};
use std::io::Write;

/// Applies the inline part defaults.
///
/// The disposition is always `inline`. Without an explicit transfer encoding,
/// text is sent as Quoted-Printable and anything else as Base64. A part with no
/// `Content-Type` counts as text, so it gets Quoted-Printable rather than the
/// Base64 a strictly "non-text unless stated" reading would pick.
fn init_inline_header(header: &mut InlineHeader) {
    header.set_content_disposition(&Disposition::inline());

    if !header.has("Content-Transfer-Encoding") {
        let encoding = if is_text(header) {
            TransferEncoding::QuotedPrintable
        } else {
            TransferEncoding::Base64
        };
        header.set_transfer_encoding(encoding);
    }
}

/// Applies the attachment defaults.
fn init_attachment_header(header: &mut AttachmentHeader) {
    let is_attachment = header
        .content_disposition()
        .ok()
        .flatten()
        .is_some_and(|d| d.kind == "attachment");
    if !is_attachment {
        header.set("Content-Disposition", "attachment");
    }

    if !header.has("Content-Transfer-Encoding") {
        header.set_transfer_encoding(TransferEncoding::Base64);
    }
}

/// A part without `Content-Type` is `text/plain` (RFC 2045 section 5.2).
fn is_text(header: &Header) -> bool {
    match header.content_type() {
        Ok(content_type) => content_type.is_none_or(|ct| ct.is_text()),
        Err(_) => header
            .get("Content-Type")
            .is_some_and(|raw| raw.trim_start().to_ascii_lowercase().starts_with("text/")),
    }
}

/// Writes a mail message: one or more text parts followed by zero or more
/// attachments, framed as `multipart/mixed`.
///
/// ```
/// use mailwright_mail::{Address, AttachmentHeader, InlineHeader, MailHeader, MailWriter};
/// use std::io::Write;
///
/// # fn main() -> mailwright_mail::Result<()> {
/// let mut header = MailHeader::new();
/// header.set_address_list("From", &[Address::new("mitsuha@example.org")]);
/// header.set_subject("Photos");
///
/// let mut out = Vec::new();
/// let mut mail = MailWriter::new(&mut out, header)?;
///
/// let mut text = InlineHeader::new();
/// text.set("Content-Type", "text/plain; charset=utf-8");
/// let mut part = mail.create_single_inline(text)?;
/// part.write_all(b"See attached.")?;
/// part.close()?;
///
/// let mut photo = AttachmentHeader::new();
/// photo.set("Content-Type", "image/jpeg");
/// photo.set_filename("comet.jpg");
/// let mut part = mail.create_attachment(photo)?;
/// part.write_all(&[0xFF, 0xD8, 0xFF])?;
/// part.close()?;
///
/// mail.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MailWriter<W: Write> {
    inner: Writer<W>,
}

impl<W: Write> MailWriter<W> {
    /// Writes the message header to `w` and returns the message writer.
    ///
    /// `Content-Type` is replaced with `multipart/mixed` and a fresh boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the header fails.
    pub fn new(w: W, header: MailHeader) -> Result<Self> {
        Self::with_config(w, header, &WriterConfig::default())
    }

    /// Like [`MailWriter::new`], with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the header fails.
    pub fn with_config(w: W, mut header: MailHeader, config: &WriterConfig) -> Result<Self> {
        header.set_content_type(&ContentType::multipart_mixed());

        let inner = Writer::with_config(w, header.into(), config)?;
        tracing::debug!(boundary = inner.boundary(), "started mail message");
        Ok(Self { inner })
    }

    /// Returns the boundary separating the message's parts.
    #[must_use]
    pub fn boundary(&self) -> &str {
        self.inner.boundary().unwrap_or_default()
    }

    /// Creates an [`InlineWriter`] holding alternative versions of the text,
    /// such as plain text and HTML.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the part header fails.
    pub fn create_inline(&mut self) -> Result<InlineWriter<&mut W>> {
        let mut header = Header::new();
        header.set_content_type(&ContentType::multipart_alternative());

        Ok(InlineWriter {
            inner: self.inner.create_part(header)?,
        })
    }

    /// Creates a single text part. Use [`MailWriter::create_inline`] when there
    /// are several versions of the text.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the part header fails.
    pub fn create_single_inline(&mut self, mut header: InlineHeader) -> Result<Writer<&mut W>> {
        init_inline_header(&mut header);
        self.inner.create_part(header.into())
    }

    /// Creates an attachment part.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the part header fails.
    pub fn create_attachment(&mut self, mut header: AttachmentHeader) -> Result<Writer<&mut W>> {
        init_attachment_header(&mut header);
        tracing::debug!(disposition = header.get("Content-Disposition"), "creating attachment");
        self.inner.create_part(header.into())
    }

    /// Finishes the message.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn close(self) -> Result<()> {
        self.inner.close()
    }
}

/// Writes the alternative versions of a message's text.
#[derive(Debug)]
pub struct InlineWriter<W: Write> {
    inner: Writer<W>,
}

impl<W: Write> InlineWriter<W> {
    /// Creates a text part.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the part header fails.
    pub fn create_part(&mut self, mut header: InlineHeader) -> Result<Writer<&mut W>> {
        init_inline_header(&mut header);
        self.inner.create_part(header.into())
    }

    /// Returns the boundary separating the alternative parts.
    #[must_use]
    pub fn boundary(&self) -> &str {
        self.inner.boundary().unwrap_or_default()
    }

    /// Finishes the alternative parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn close(self) -> Result<()> {
        self.inner.close()
    }
}
