//! Header field folding (RFC 5322 section 2.2.3).

/// Maximum length of a header line, not counting the trailing CRLF.
pub const MAX_HEADER_LEN: usize = 76;

/// Formats a header field, folding the value so that no line is longer than
/// [`MAX_HEADER_LEN`] characters.
///
/// Folds happen at whitespace whenever possible, and the whitespace becomes the
/// first character of the continuation line. A word longer than the limit is
/// split and the continuation line gets an inserted space.
///
/// Line breaks already present in `value` are kept as they are, so a value
/// folded by its producer (a `DKIM-Signature`, for instance) is passed through
/// unchanged. The result always ends with exactly one CRLF.
///
/// ```
/// use mailwright_mime::format_header_field;
///
/// assert_eq!(format_header_field("To", "alice@example.org"), "To: alice@example.org\r\n");
/// ```
#[must_use]
pub fn format_header_field(name: &str, value: &str) -> String {
    let mut out = String::with_capacity(name.len() + value.len() + value.len() / 24 + 4);
    out.push_str(name);
    out.push_str(": ");

    if value.is_empty() {
        out.push_str("\r\n");
        return out;
    }

    let prefix_len = out.len();
    let mut rest = value;
    let mut first = true;

    while !rest.is_empty() {
        let max_len = if first {
            MAX_HEADER_LEN.saturating_sub(prefix_len)
        } else {
            MAX_HEADER_LEN
        };

        // Index we have to fold before.
        let fold_before = max_len + 1;
        if fold_before > rest.len() {
            out.push_str(rest);
            if !rest.ends_with('\n') {
                out.push_str("\r\n");
            }
            break;
        }

        let (fold_at, folding) = fold_point(rest, fold_before);
        out.push_str(&rest[..fold_at]);
        out.push_str(folding);
        rest = &rest[fold_at..];
        first = false;
    }

    tracing::trace!(field = name, len = out.len(), "formatted header field");
    out
}

/// Picks where to break `rest`, which is known to be longer than `fold_before`,
/// and what has to be inserted there.
fn fold_point(rest: &str, fold_before: usize) -> (usize, &'static str) {
    let bytes = rest.as_bytes();

    let fold_at = match bytes[..fold_before].iter().rposition(|&b| is_fold_char(b)) {
        // That's the leading whitespace of the previous fold.
        Some(0) => fold_before - 1,
        Some(at) => at,
        // No whitespace at all, the word gets split.
        None => fold_before.saturating_sub(2),
    };
    let fold_at = floor_char_boundary(rest, fold_at);

    let folding = match bytes.get(fold_at) {
        Some(b' ' | b'\t') if fold_at > 0 && bytes[fold_at - 1] == b'\n' => "",
        // The next line starts with this whitespace.
        Some(b' ' | b'\t') => "\r\n",
        Some(b'\n') => "",
        _ => "\r\n ",
    };

    (fold_at, folding)
}

const fn is_fold_char(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n')
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    (0..=index)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0)
}
