//! MIME content type and content disposition values.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// MIME content type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "jpeg").
    pub sub_type: String,
    /// Parameters (e.g., charset=utf-8, boundary=xxx), keyed by lowercase name.
    pub parameters: BTreeMap<String, String>,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Creates a text/plain content type.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain").with_parameter("charset", "utf-8")
    }

    /// Creates a text/html content type.
    #[must_use]
    pub fn text_html() -> Self {
        Self::new("text", "html").with_parameter("charset", "utf-8")
    }

    /// Creates a multipart/mixed content type without a boundary.
    ///
    /// The writer generates one when the header is written.
    #[must_use]
    pub fn multipart_mixed() -> Self {
        Self::new("multipart", "mixed")
    }

    /// Creates a multipart/alternative content type without a boundary.
    #[must_use]
    pub fn multipart_alternative() -> Self {
        Self::new("multipart", "alternative")
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get("charset").map(String::as_str)
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameters.get("boundary").map(String::as_str)
    }

    /// Returns `type/subtype` without parameters.
    #[must_use]
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("multipart")
    }

    /// Checks if this is a text content type.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("text")
    }

    /// Parses a content type string.
    ///
    /// Format: `type/subtype; param1=value1; param2="value 2"`
    ///
    /// # Errors
    ///
    /// Returns an error if the type or subtype is missing.
    pub fn parse(s: &str) -> Result<Self> {
        let (essence, parameters) = split_value(s);

        let (main_type, sub_type) = essence
            .split_once('/')
            .ok_or_else(|| Error::InvalidContentType(format!("Missing subtype: {s}")))?;
        let main_type = main_type.trim().to_ascii_lowercase();
        let sub_type = sub_type.trim().to_ascii_lowercase();

        if main_type.is_empty() || sub_type.is_empty() {
            return Err(Error::InvalidContentType(format!("Empty type: {s}")));
        }

        Ok(Self {
            main_type,
            sub_type,
            parameters,
        })
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let main = &self.main_type;
        let sub = &self.sub_type;
        write!(f, "{main}/{sub}")?;
        write_parameters(f, &self.parameters)
    }
}

/// Content disposition with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    /// Disposition type, lowercase (e.g., "inline", "attachment").
    pub kind: String,
    /// Parameters (e.g., filename=report.pdf), keyed by lowercase name.
    pub parameters: BTreeMap<String, String>,
}

impl Disposition {
    /// Creates a new disposition of the given kind.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into().to_ascii_lowercase(),
            parameters: BTreeMap::new(),
        }
    }

    /// Creates an `inline` disposition.
    #[must_use]
    pub fn inline() -> Self {
        Self::new("inline")
    }

    /// Creates an `attachment` disposition.
    #[must_use]
    pub fn attachment() -> Self {
        Self::new("attachment")
    }

    /// Sets the filename parameter.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.parameters.insert("filename".to_string(), filename.into());
        self
    }

    /// Returns the filename parameter if present.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.parameters.get("filename").map(String::as_str)
    }

    /// Parses a content disposition string.
    ///
    /// # Errors
    ///
    /// Returns an error if the disposition type is empty.
    pub fn parse(s: &str) -> Result<Self> {
        let (kind, parameters) = split_value(s);
        let kind = kind.trim().to_ascii_lowercase();
        if kind.is_empty() {
            return Err(Error::InvalidHeader(format!(
                "Empty content disposition: {s}"
            )));
        }

        Ok(Self { kind, parameters })
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)?;
        write_parameters(f, &self.parameters)
    }
}

/// Splits `value; k=v; ...` into its leading token and parameter map.
///
/// Quoted values may contain `;` and backslash escapes, as written by
/// [`write_parameters`].
fn split_value(s: &str) -> (&str, BTreeMap<String, String>) {
    let (head, rest) = s.split_once(';').unwrap_or((s, ""));

    let mut parameters = BTreeMap::new();
    let mut chars = rest.chars().peekable();
    while chars.peek().is_some() {
        let mut key = String::new();
        let mut has_value = false;
        for c in chars.by_ref() {
            match c {
                '=' => {
                    has_value = true;
                    break;
                }
                ';' => break,
                _ => key.push(c),
            }
        }
        if !has_value {
            continue;
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut value = String::new();
        if chars.next_if_eq(&'"').is_some() {
            while let Some(c) = chars.next() {
                match c {
                    '"' => break,
                    '\\' => value.extend(chars.next()),
                    _ => value.push(c),
                }
            }
            // Anything between the closing quote and the separator is dropped.
            for c in chars.by_ref() {
                if c == ';' {
                    break;
                }
            }
        } else {
            for c in chars.by_ref() {
                if c == ';' {
                    break;
                }
                value.push(c);
            }
            value.truncate(value.trim_end().len());
        }

        let key = key.trim().to_ascii_lowercase();
        if !key.is_empty() {
            parameters.insert(key, value);
        }
    }

    (head.trim(), parameters)
}

fn write_parameters(f: &mut fmt::Formatter<'_>, parameters: &BTreeMap<String, String>) -> fmt::Result {
    for (key, value) in parameters {
        // Quote value if it contains special characters
        if value.is_empty()
            || value.contains(|c: char| c.is_whitespace() || "()<>@,;:\\\"/[]?=".contains(c))
        {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            write!(f, "; {key}=\"{escaped}\"")?;
        } else {
            write!(f, "; {key}={value}")?;
        }
    }

    Ok(())
}
