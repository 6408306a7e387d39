//! Streaming MIME entity writer.

use crate::config::WriterConfig;
use crate::encoding::{Base64Encoder, QuotedPrintableEncoder, TransferEncoding};
use crate::error::{Error, Result};
use crate::header::Header;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::io::{self, Write};

/// Body of an entity being written.
#[derive(Debug)]
enum Body<W: Write> {
    Multipart {
        inner: W,
        boundary: String,
        parts: usize,
    },
    Raw(W),
    Base64(Base64Encoder<W>),
    QuotedPrintable(QuotedPrintableEncoder<W>),
}

/// Writes a MIME entity: its header block, then either a body or a list of
/// parts.
///
/// A leaf entity accepts body bytes through [`Write`]; they go through the
/// encoder named by its `Content-Transfer-Encoding`. A `multipart/*` entity
/// only accepts parts from [`Writer::create_part`]. A part borrows its
/// parent, so only one part can be open at a time.
///
/// [`Writer::close`] finishes the entity. An entity that is dropped without
/// being closed is finished on drop, with failures logged instead of returned.
///
/// ```
/// use mailwright_mime::{Header, Writer};
/// use std::io::Write;
///
/// # fn main() -> mailwright_mime::Result<()> {
/// let mut header = Header::new();
/// header.set("Content-Type", "multipart/mixed; boundary=b1");
///
/// let mut out = Vec::new();
/// let mut writer = Writer::new(&mut out, header)?;
///
/// let mut part_header = Header::new();
/// part_header.set("Content-Type", "text/plain");
/// let mut part = writer.create_part(part_header)?;
/// part.write_all(b"Hello")?;
/// part.close()?;
///
/// writer.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Writer<W: Write> {
    body: Body<W>,
    rng: StdRng,
    boundary_length: usize,
    closed: bool,
}

impl<W: Write> Writer<W> {
    /// Writes `header` to `w` and returns a writer for the entity body.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the header fails.
    pub fn new(w: W, header: Header) -> Result<Self> {
        Self::with_config(w, header, &WriterConfig::default())
    }

    /// Like [`Writer::new`], with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the header fails.
    pub fn with_config(w: W, mut header: Header, config: &WriterConfig) -> Result<Self> {
        if config.mime_version && !header.has("MIME-Version") {
            header.set("MIME-Version", "1.0");
        }
        Self::create(w, header, config.rng(), config.clamped_boundary_length())
    }

    fn create(mut w: W, mut header: Header, mut rng: StdRng, boundary_length: usize) -> Result<Self> {
        // A malformed Content-Type is written as given and treated as a leaf.
        let content_type = header.content_type().ok().flatten();

        let body = match content_type {
            Some(content_type) if content_type.is_multipart() => {
                let existing = content_type
                    .boundary()
                    .filter(|b| !b.is_empty())
                    .map(str::to_owned);
                let boundary = if let Some(boundary) = existing {
                    boundary
                } else {
                    let boundary = random_boundary(&mut rng, boundary_length);
                    header.set_content_type(
                        &content_type.with_parameter("boundary", boundary.clone()),
                    );
                    boundary
                };
                header.remove("Content-Transfer-Encoding");
                header.write_to(&mut w)?;

                tracing::debug!(%boundary, "writing multipart entity");
                Body::Multipart {
                    inner: w,
                    boundary,
                    parts: 0,
                }
            }
            _ => {
                header.write_to(&mut w)?;

                let encoding = header.transfer_encoding();
                tracing::debug!(?encoding, "writing leaf entity");
                match encoding {
                    Some(TransferEncoding::Base64) => Body::Base64(Base64Encoder::new(w)),
                    Some(TransferEncoding::QuotedPrintable) => {
                        Body::QuotedPrintable(QuotedPrintableEncoder::new(w))
                    }
                    _ => Body::Raw(w),
                }
            }
        };

        Ok(Self {
            body,
            rng,
            boundary_length,
            closed: false,
        })
    }

    /// Returns true if this entity takes parts rather than body bytes.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self.body, Body::Multipart { .. })
    }

    /// Returns the multipart boundary, if this entity is multipart.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        match &self.body {
            Body::Multipart { boundary, .. } => Some(boundary),
            _ => None,
        }
    }

    /// Starts a new part and writes its header.
    ///
    /// The part must be closed (or dropped) before the next one is created,
    /// which the borrow on `self` enforces.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultipart`] if this entity is not multipart, or an
    /// I/O error if writing the delimiter or the header fails.
    pub fn create_part(&mut self, header: Header) -> Result<Writer<&mut W>> {
        let Body::Multipart {
            inner,
            boundary,
            parts,
        } = &mut self.body
        else {
            return Err(Error::NotMultipart);
        };

        if *parts == 0 {
            write!(inner, "--{boundary}\r\n")?;
        } else {
            write!(inner, "\r\n--{boundary}\r\n")?;
        }
        *parts += 1;
        tracing::trace!(%boundary, part = *parts, "creating part");

        let rng = StdRng::seed_from_u64(self.rng.next_u64());
        Writer::create(inner, header, rng, self.boundary_length)
    }

    /// Finishes the entity.
    ///
    /// Flushes the body encoder, or writes the closing delimiter of a
    /// multipart entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn close(mut self) -> Result<()> {
        self.finish().map_err(Into::into)
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match &mut self.body {
            Body::Multipart {
                inner, boundary, ..
            } => {
                write!(inner, "\r\n--{boundary}--\r\n")?;
                inner.flush()
            }
            Body::Raw(w) => w.flush(),
            Body::Base64(encoder) => encoder.finish(),
            Body::QuotedPrintable(encoder) => encoder.finish(),
        }
    }
}

impl<W: Write> Write for Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.body {
            Body::Multipart { .. } => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "multipart entities take parts, not body bytes",
            )),
            Body::Raw(w) => w.write(buf),
            Body::Base64(encoder) => encoder.write(buf),
            Body::QuotedPrintable(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.body {
            Body::Multipart { inner: w, .. } | Body::Raw(w) => w.flush(),
            Body::Base64(encoder) => encoder.flush(),
            Body::QuotedPrintable(encoder) => encoder.flush(),
        }
    }
}

impl<W: Write> Drop for Writer<W> {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            tracing::warn!(?e, "Failed to finish MIME entity on drop");
        }
    }
}

fn random_boundary(rng: &mut StdRng, length: usize) -> String {
    rng.sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    fn init_tracing() {
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")))
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    }

    fn seeded() -> WriterConfig {
        WriterConfig::builder().seed(1).build()
    }

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_leaf_raw() {
        let mut header = Header::new();
        header.set("Content-Type", "text/plain");

        let mut out = Vec::new();
        let mut writer = Writer::new(&mut out, header).unwrap();
        assert!(!writer.is_multipart());
        assert!(writer.boundary().is_none());
        writer.write_all(b"Hello").unwrap();
        writer.close().unwrap();

        assert_eq!(
            text(out),
            "Content-Type: text/plain\r\nMIME-Version: 1.0\r\n\r\nHello"
        );
    }

    #[test]
    fn test_existing_mime_version_kept() {
        let mut header = Header::new();
        header.set("Mime-Version", "1.0");

        let mut out = Vec::new();
        Writer::new(&mut out, header).unwrap().close().unwrap();
        assert_eq!(text(out), "Mime-Version: 1.0\r\n\r\n");
    }

    #[test]
    fn test_leaf_base64() {
        let mut header = Header::new();
        header.set("Content-Transfer-Encoding", "base64");
        let config = WriterConfig::builder().mime_version(false).build();

        let mut out = Vec::new();
        let mut writer = Writer::with_config(&mut out, header, &config).unwrap();
        writer.write_all(b"Hello, World!").unwrap();
        writer.close().unwrap();

        assert_eq!(
            text(out),
            "Content-Transfer-Encoding: base64\r\n\r\nSGVsbG8sIFdvcmxkIQ=="
        );
    }

    #[test]
    fn test_leaf_quoted_printable_finished_on_drop() {
        init_tracing();
        let mut header = Header::new();
        header.set("Content-Transfer-Encoding", "quoted-printable");
        let config = WriterConfig::builder().mime_version(false).build();

        let mut out = Vec::new();
        {
            let mut writer = Writer::with_config(&mut out, header, &config).unwrap();
            writer.write_all(b"caf\xC3\xA9 ").unwrap();
        }

        assert_eq!(
            text(out),
            "Content-Transfer-Encoding: quoted-printable\r\n\r\ncaf=C3=A9=20"
        );
    }

    #[test]
    fn test_multipart_with_explicit_boundary() {
        let mut header = Header::new();
        header.set("Content-Type", "multipart/mixed; boundary=XYZ");
        header.set("Content-Transfer-Encoding", "base64");
        let config = WriterConfig::builder().mime_version(false).build();

        let mut out = Vec::new();
        let mut writer = Writer::with_config(&mut out, header, &config).unwrap();
        assert_eq!(writer.boundary(), Some("XYZ"));

        for body in ["one", "two"] {
            let mut part = writer.create_part(Header::new()).unwrap();
            part.write_all(body.as_bytes()).unwrap();
            part.close().unwrap();
        }
        writer.close().unwrap();

        assert_eq!(
            text(out),
            "Content-Type: multipart/mixed; boundary=XYZ\r\n\r\n\
             --XYZ\r\n\r\none\
             \r\n--XYZ\r\n\r\ntwo\
             \r\n--XYZ--\r\n"
        );
    }

    #[test]
    fn test_multipart_generates_boundary() {
        let mut header = Header::new();
        header.set("Content-Type", "multipart/alternative");

        let mut out = Vec::new();
        let writer = Writer::with_config(&mut out, header, &seeded()).unwrap();
        let boundary = writer.boundary().unwrap().to_owned();
        writer.close().unwrap();

        assert_eq!(boundary.len(), 40);
        assert!(boundary.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(text(out).starts_with(&crate::format_header_field(
            "Content-Type",
            &format!("multipart/alternative; boundary={boundary}")
        )));
    }

    #[test]
    fn test_seeded_boundaries_are_reproducible() {
        let render = || {
            let mut header = Header::new();
            header.set("Content-Type", "multipart/mixed");
            let mut out = Vec::new();
            let mut writer = Writer::with_config(&mut out, header, &seeded()).unwrap();
            let mut nested = Header::new();
            nested.set("Content-Type", "multipart/alternative");
            writer.create_part(nested).unwrap().close().unwrap();
            writer.close().unwrap();
            out
        };

        assert_eq!(render(), render());
    }

    #[test]
    fn test_nested_boundaries_differ() {
        init_tracing();
        let mut header = Header::new();
        header.set("Content-Type", "multipart/mixed");

        let mut out = Vec::new();
        let mut writer = Writer::with_config(&mut out, header, &seeded()).unwrap();
        let outer = writer.boundary().unwrap().to_owned();

        let mut nested = Header::new();
        nested.set("Content-Type", "multipart/alternative");
        let part = writer.create_part(nested).unwrap();
        let inner = part.boundary().unwrap().to_owned();
        part.close().unwrap();
        writer.close().unwrap();

        assert_ne!(outer, inner);
    }

    #[test]
    fn test_create_part_on_leaf_fails() {
        let mut out = Vec::new();
        let mut writer = Writer::new(&mut out, Header::new()).unwrap();
        assert!(matches!(
            writer.create_part(Header::new()),
            Err(Error::NotMultipart)
        ));
    }

    #[test]
    fn test_write_to_multipart_fails() {
        let mut header = Header::new();
        header.set("Content-Type", "multipart/mixed; boundary=b");

        let mut out = Vec::new();
        let mut writer = Writer::new(&mut out, header).unwrap();
        let err = writer.write(b"preamble").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn test_empty_multipart_still_closes() {
        let mut header = Header::new();
        header.set("Content-Type", "multipart/mixed; boundary=b");
        let config = WriterConfig::builder().mime_version(false).build();

        let mut out = Vec::new();
        Writer::with_config(&mut out, header, &config)
            .unwrap()
            .close()
            .unwrap();
        assert_eq!(
            text(out),
            "Content-Type: multipart/mixed; boundary=b\r\n\r\n\r\n--b--\r\n"
        );
    }

    #[test]
    fn test_malformed_content_type_is_a_leaf() {
        let mut header = Header::new();
        header.set("Content-Type", "nonsense");

        let mut out = Vec::new();
        let writer = Writer::new(&mut out, header).unwrap();
        assert!(!writer.is_multipart());
    }

    #[derive(Debug)]
    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_io_errors_propagate() {
        let err = Writer::new(FailingWriter, Header::new()).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.to_string() == "disk full"));
    }

    /// Accepts writes but fails every flush.
    #[derive(Debug, Default)]
    struct FlushFails(Vec<u8>);

    impl Write for FlushFails {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("flush failed"))
        }
    }

    #[test]
    fn test_failed_finish_on_drop_is_logged() {
        init_tracing();

        let mut sink = FlushFails::default();
        {
            let mut writer = Writer::new(&mut sink, Header::new()).unwrap();
            writer.write_all(b"body").unwrap();
        }
        assert!(sink.0.ends_with(b"\r\n\r\nbody"));

        let writer = Writer::new(&mut sink, Header::new()).unwrap();
        assert!(matches!(writer.close(), Err(Error::Io(_))));
    }
}
