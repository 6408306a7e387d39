//! Typed headers for mail messages, inline parts and attachments.

use chrono::{DateTime, FixedOffset, Utc};
use mailwright_mime::{Disposition, Error, Header, Result};
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// A mailbox address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Display name (e.g., "Mitsuha Miyamizu").
    pub name: Option<String>,
    /// Address (e.g., "mitsuha.miyamizu@example.org").
    pub address: String,
}

impl Address {
    /// Creates an address without a display name.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: address.into(),
        }
    }

    /// Creates an address with a display name.
    #[must_use]
    pub fn with_name(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            address: address.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let address = &self.address;
        match self.name.as_deref() {
            None | Some("") => write!(f, "<{address}>"),
            Some(name) if is_phrase(name) => write!(f, "{name} <{address}>"),
            Some(name) => {
                let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{escaped}\" <{address}>")
            }
        }
    }
}

/// Checks whether a display name can be written without quoting.
fn is_phrase(name: &str) -> bool {
    !name.starts_with(' ')
        && !name.ends_with(' ')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || " !#$%&'*+-/=?^_`{|}~".contains(c))
}

/// Header of a mail message.
///
/// Dereferences to [`Header`] for untyped access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailHeader {
    header: Header,
}

impl MailHeader {
    /// Creates an empty mail header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `Subject` field.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.header.set("Subject", subject);
    }

    /// Gets the `Subject` field.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.header.get("Subject")
    }

    /// Sets the `Date` field in RFC 5322 format.
    pub fn set_date(&mut self, date: DateTime<FixedOffset>) {
        self.header.set("Date", date.to_rfc2822());
    }

    /// Gets the parsed `Date` field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is present but not a valid RFC 5322 date.
    pub fn date(&self) -> Result<Option<DateTime<FixedOffset>>> {
        self.header
            .get("Date")
            .map(|value| {
                DateTime::parse_from_rfc2822(value.trim())
                    .map_err(|e| Error::InvalidHeader(format!("Invalid date {value:?}: {e}")))
            })
            .transpose()
    }

    /// Sets an address list field such as `From`, `To` or `Cc`.
    ///
    /// An empty list removes the field.
    pub fn set_address_list(&mut self, name: &str, addresses: &[Address]) {
        if addresses.is_empty() {
            self.header.remove(name);
            return;
        }

        let value = addresses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self.header.set(name, value);
    }

    /// Sets the `Message-Id` field. `id` is given without angle brackets.
    pub fn set_message_id(&mut self, id: &str) {
        self.header.set("Message-Id", format!("<{id}>"));
    }

    /// Gets the `Message-Id` field without angle brackets.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.header.get("Message-Id").map(|value| {
            let value = value.trim();
            value
                .strip_prefix('<')
                .and_then(|v| v.strip_suffix('>'))
                .unwrap_or(value)
        })
    }

    /// Generates a unique `Message-Id` under `domain`, sets it and returns it.
    pub fn generate_message_id(&mut self, domain: &str) -> String {
        let random: String = rand::thread_rng()
            .sample_iter(Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        let id = format!(
            "{}.{random}@{domain}",
            Utc::now().format("%Y%m%d%H%M%S")
        );
        self.set_message_id(&id);
        id
    }
}

/// Header of an inline text part.
///
/// The writer sets `Content-Disposition: inline` and picks a default
/// `Content-Transfer-Encoding` when none is given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineHeader {
    header: Header,
}

impl InlineHeader {
    /// Creates an empty inline part header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Header of an attachment part.
///
/// The writer forces the `attachment` disposition and defaults the
/// `Content-Transfer-Encoding` to Base64.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentHeader {
    header: Header,
}

impl AttachmentHeader {
    /// Creates an empty attachment header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `Content-Disposition: attachment` with the given filename.
    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.header
            .set_content_disposition(&Disposition::attachment().with_filename(filename));
    }

    /// Gets the filename parameter of the disposition.
    ///
    /// # Errors
    ///
    /// Returns an error if `Content-Disposition` is malformed.
    pub fn filename(&self) -> Result<Option<String>> {
        Ok(self
            .header
            .content_disposition()?
            .and_then(|d| d.filename().map(str::to_owned)))
    }
}

macro_rules! header_wrapper {
    ($($ty:ident),+) => {$(
        impl Deref for $ty {
            type Target = Header;

            fn deref(&self) -> &Header {
                &self.header
            }
        }

        impl DerefMut for $ty {
            fn deref_mut(&mut self) -> &mut Header {
                &mut self.header
            }
        }

        impl From<Header> for $ty {
            fn from(header: Header) -> Self {
                Self { header }
            }
        }

        impl From<$ty> for Header {
            fn from(wrapper: $ty) -> Self {
                wrapper.header
            }
        }
    )+};
}

header_wrapper!(MailHeader, InlineHeader, AttachmentHeader);
