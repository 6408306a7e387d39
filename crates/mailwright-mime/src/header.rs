//! MIME header handling.

use crate::content_type::{ContentType, Disposition};
use crate::encoding::TransferEncoding;
use crate::error::Result;
use crate::fold::format_header_field;
use std::fmt;
use std::io::{self, Write};

/// A single header field as it will be written.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    name: String,
    value: String,
}

/// Ordered collection of header fields.
///
/// Fields are written in insertion order with the name spelled as it was
/// first given. Lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: Vec<Field>,
}

impl Header {
    /// Creates a new empty header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header field, keeping existing ones with the same name.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Sets a header value, replacing any existing values.
    ///
    /// The field keeps the position of its first occurrence.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(at) => {
                self.fields[at].value = value;
                let mut index = 0;
                self.fields.retain(|field| {
                    let keep = index <= at || !field.name.eq_ignore_ascii_case(&name);
                    index += 1;
                    keep
                });
            }
            None => self.fields.push(Field { name, value }),
        }
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|at| self.fields[at].value.as_str())
    }

    /// Gets all values for a header.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.name.eq_ignore_ascii_case(name))
            .map(|field| field.value.as_str())
            .collect()
    }

    /// Checks whether at least one field with this name exists.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Removes all values for a header.
    pub fn remove(&mut self, name: &str) {
        self.fields
            .retain(|field| !field.name.eq_ignore_ascii_case(name));
    }

    /// Returns an iterator over all fields in write order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|field| (field.name.as_str(), field.value.as_str()))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Gets the parsed `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is present but malformed.
    pub fn content_type(&self) -> Result<Option<ContentType>> {
        self.get("Content-Type").map(ContentType::parse).transpose()
    }

    /// Sets `Content-Type`.
    pub fn set_content_type(&mut self, content_type: &ContentType) {
        self.set("Content-Type", content_type.to_string());
    }

    /// Gets the parsed `Content-Disposition`.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is present but malformed.
    pub fn content_disposition(&self) -> Result<Option<Disposition>> {
        self.get("Content-Disposition")
            .map(Disposition::parse)
            .transpose()
    }

    /// Sets `Content-Disposition`.
    pub fn set_content_disposition(&mut self, disposition: &Disposition) {
        self.set("Content-Disposition", disposition.to_string());
    }

    /// Gets the `Content-Transfer-Encoding`, if set.
    #[must_use]
    pub fn transfer_encoding(&self) -> Option<TransferEncoding> {
        self.get("Content-Transfer-Encoding")
            .map(TransferEncoding::parse)
    }

    /// Sets `Content-Transfer-Encoding`.
    pub fn set_transfer_encoding(&mut self, encoding: TransferEncoding) {
        self.set("Content-Transfer-Encoding", encoding.to_string());
    }

    /// Writes the header block, folding each field, followed by the empty line.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        for field in &self.fields {
            w.write_all(format_header_field(&field.name, &field.value).as_bytes())?;
        }
        w.write_all(b"\r\n")
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.name.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            f.write_str(&format_header_field(&field.name, &field.value))?;
        }
        f.write_str("\r\n")
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Header {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut header = Self::new();
        for (name, value) in iter {
            header.add(name, value);
        }
        header
    }
}
