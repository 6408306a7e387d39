//! Property tests for header folding.

#![allow(clippy::unwrap_used)]

use mailwright_mime::{MAX_HEADER_LEN, format_header_field};
use proptest::prelude::*;

/// Splits folded output into its lines, without the trailing CRLF.
fn lines(folded: &str) -> Vec<&str> {
    folded
        .strip_suffix("\r\n")
        .unwrap()
        .split("\r\n")
        .collect()
}

/// Field bodies made of short words separated by single spaces.
fn words() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9<>@.,;=+/-]{1,20}", 0..40).prop_map(|w| w.join(" "))
}

proptest! {
    #[test]
    fn always_terminates_with_crlf(name in "[A-Za-z-]{1,120}", value in "[^\r\n]{0,300}") {
        let folded = format_header_field(&name, &value);
        let prefix = format!("{name}: ");
        prop_assert!(folded.starts_with(&prefix));
        prop_assert!(folded.ends_with("\r\n"));
    }

    #[test]
    fn word_values_fit_and_unfold(value in words()) {
        let folded = format_header_field("Subject", &value);

        for line in lines(&folded) {
            prop_assert!(line.len() <= MAX_HEADER_LEN, "line too long: {line:?}");
        }

        let unfolded = folded
            .strip_prefix("Subject: ")
            .unwrap()
            .strip_suffix("\r\n")
            .unwrap()
            .replace("\r\n", "");
        prop_assert_eq!(unfolded, value);
    }

    #[test]
    fn continuation_lines_start_with_whitespace(value in "[ -~\t]{0,400}") {
        let folded = format_header_field("X-Test", &value);
        let lines = lines(&folded);

        for line in &lines[1..] {
            prop_assert!(line.starts_with([' ', '\t']), "bad continuation: {line:?}");
            // An inserted space can push a line one column past the limit.
            prop_assert!(line.len() <= MAX_HEADER_LEN + 1);
        }
        prop_assert!(lines[0].len() <= MAX_HEADER_LEN);
    }

    #[test]
    fn unbroken_tokens_are_split_without_loss(value in "[A-Za-z0-9+/=]{1,600}") {
        let folded = format_header_field("DKIM-Signature", &value);
        let body = folded.strip_prefix("DKIM-Signature: ").unwrap();
        prop_assert_eq!(body.strip_suffix("\r\n").unwrap().replace("\r\n ", ""), value);
    }

    #[test]
    fn refolding_keeps_lines_within_limit(value in words()) {
        let folded = format_header_field("Subject", &value);
        let body = folded.strip_prefix("Subject: ").unwrap();

        let refolded = format_header_field("Subject", body);
        prop_assert!(refolded.ends_with("\r\n"));
        prop_assert!(!refolded.ends_with("\r\n\r\n") || value.is_empty());
        for line in lines(&refolded) {
            prop_assert!(line.len() <= MAX_HEADER_LEN, "line too long: {line:?}");
        }
    }
}

#[test]
fn prefolded_values_pass_through() {
    let value = "v=1; a=rsa-sha256; c=relaxed/relaxed; d=example.org;\r\n s=selector; t=1700000000;\r\n h=From:To:Subject;\r\n";
    assert_eq!(
        format_header_field("DKIM-Signature", value),
        format!("DKIM-Signature: {value}")
    );
}
