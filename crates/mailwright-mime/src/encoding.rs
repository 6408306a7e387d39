//! Content transfer encodings.
//!
//! Part bodies are streamed through [`Base64Encoder`] or
//! [`QuotedPrintableEncoder`], both of which wrap any [`io::Write`] and must be
//! finished explicitly so buffered input reaches the underlying writer.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::{self, Write as _};
use std::io::{self, Write};

/// Maximum length of an encoded body line, excluding the CRLF.
const MAX_LINE_LENGTH: usize = 76;

/// Input bytes per Base64 line (57 bytes encode to 76 characters).
const BASE64_LINE_BYTES: usize = MAX_LINE_LENGTH / 4 * 3;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit binary.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }

    /// Returns true if bodies are written through an encoder.
    #[must_use]
    pub const fn is_encoded(self) -> bool {
        matches!(self, Self::Base64 | Self::QuotedPrintable)
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// Encodes data as Base64, broken into 76-character lines.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    let mut encoder = Base64Encoder::new(io::sink());
    let mut out = encoder.encode_chunk(data);
    encoder.encode_tail(&mut out);
    out
}

/// Encodes data using Quoted-Printable encoding (RFC 2045).
#[must_use]
pub fn encode_quoted_printable(data: &[u8]) -> String {
    let mut encoder = QuotedPrintableEncoder::new(io::sink());
    let mut out = encoder.encode_chunk(data);
    encoder.encode_tail(&mut out);
    out
}

/// Streaming Base64 encoder writing CRLF-separated 76-character lines.
#[derive(Debug)]
pub struct Base64Encoder<W: Write> {
    inner: W,
    pending: Vec<u8>,
    lines: usize,
}

impl<W: Write> Base64Encoder<W> {
    /// Creates an encoder writing into `inner`.
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            lines: 0,
        }
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Encodes any buffered input and flushes the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn finish(&mut self) -> io::Result<()> {
        let saved = (self.pending.clone(), self.lines);
        let mut out = String::new();
        self.encode_tail(&mut out);
        if let Err(e) = self.inner.write_all(out.as_bytes()) {
            (self.pending, self.lines) = saved;
            return Err(e);
        }
        self.inner.flush()
    }

    fn encode_chunk(&mut self, buf: &[u8]) -> String {
        self.pending.extend_from_slice(buf);

        let full = self.pending.len() / BASE64_LINE_BYTES * BASE64_LINE_BYTES;
        let mut out = String::with_capacity(full / 3 * 4 + full / BASE64_LINE_BYTES * 2);
        for line in self.pending[..full].chunks(BASE64_LINE_BYTES) {
            if self.lines > 0 {
                out.push_str("\r\n");
            }
            STANDARD.encode_string(line, &mut out);
            self.lines += 1;
        }
        self.pending.drain(..full);

        out
    }

    fn encode_tail(&mut self, out: &mut String) {
        if self.pending.is_empty() {
            return;
        }
        if self.lines > 0 {
            out.push_str("\r\n");
        }
        STANDARD.encode_string(&self.pending, out);
        self.pending.clear();
        self.lines += 1;
    }
}

impl<W: Write> Write for Base64Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Less than one line is buffered between writes.
        let saved = (self.pending.clone(), self.lines);
        let out = self.encode_chunk(buf);
        if let Err(e) = self.inner.write_all(out.as_bytes()) {
            (self.pending, self.lines) = saved;
            return Err(e);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Streaming Quoted-Printable encoder (RFC 2045 section 6.7, text mode).
///
/// Line breaks in the input (CRLF, LF or CR) become CRLF hard breaks, and
/// whitespace at the end of a line is escaped.
#[derive(Debug)]
pub struct QuotedPrintableEncoder<W: Write> {
    inner: W,
    line_len: usize,
    pending_ws: Vec<u8>,
    last_cr: bool,
}

impl<W: Write> QuotedPrintableEncoder<W> {
    /// Creates an encoder writing into `inner`.
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            line_len: 0,
            pending_ws: Vec::new(),
            last_cr: false,
        }
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Writes out held-back whitespace and flushes the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn finish(&mut self) -> io::Result<()> {
        let saved = self.state();
        let mut out = String::new();
        self.encode_tail(&mut out);
        if let Err(e) = self.inner.write_all(out.as_bytes()) {
            self.restore(saved);
            return Err(e);
        }
        self.inner.flush()
    }

    fn state(&self) -> (usize, Vec<u8>, bool) {
        (self.line_len, self.pending_ws.clone(), self.last_cr)
    }

    fn restore(&mut self, (line_len, pending_ws, last_cr): (usize, Vec<u8>, bool)) {
        self.line_len = line_len;
        self.pending_ws = pending_ws;
        self.last_cr = last_cr;
    }

    fn encode_chunk(&mut self, buf: &[u8]) -> String {
        let mut out = String::with_capacity(buf.len() + buf.len() / 4);

        for &byte in buf {
            let after_cr = std::mem::replace(&mut self.last_cr, byte == b'\r');
            match byte {
                b'\n' if after_cr => {}
                b'\r' | b'\n' => self.hard_break(&mut out),
                // Held back until we know whether the line ends here.
                b' ' | b'\t' => self.pending_ws.push(byte),
                b'!'..=b'<' | b'>'..=b'~' => {
                    self.release_ws(&mut out);
                    self.push_literal(&mut out, byte);
                }
                _ => {
                    self.release_ws(&mut out);
                    self.push_escaped(&mut out, byte);
                }
            }
        }

        out
    }

    fn encode_tail(&mut self, out: &mut String) {
        self.escape_ws(out);
    }

    fn hard_break(&mut self, out: &mut String) {
        self.escape_ws(out);
        out.push_str("\r\n");
        self.line_len = 0;
    }

    fn release_ws(&mut self, out: &mut String) {
        for byte in std::mem::take(&mut self.pending_ws) {
            self.push_literal(out, byte);
        }
    }

    fn escape_ws(&mut self, out: &mut String) {
        for byte in std::mem::take(&mut self.pending_ws) {
            self.push_escaped(out, byte);
        }
    }

    fn push_literal(&mut self, out: &mut String, byte: u8) {
        self.reserve(out, 1);
        out.push(char::from(byte));
    }

    fn push_escaped(&mut self, out: &mut String, byte: u8) {
        self.reserve(out, 3);
        let _ = write!(out, "={byte:02X}");
    }

    /// Inserts a soft line break if `width` more characters would not fit
    /// before the trailing `=`.
    fn reserve(&mut self, out: &mut String, width: usize) {
        if self.line_len + width > MAX_LINE_LENGTH - 1 {
            out.push_str("=\r\n");
            self.line_len = 0;
        }
        self.line_len += width;
    }
}

impl<W: Write> Write for QuotedPrintableEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let saved = self.state();
        let out = self.encode_chunk(buf);
        if let Err(e) = self.inner.write_all(out.as_bytes()) {
            self.restore(saved);
            return Err(e);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
