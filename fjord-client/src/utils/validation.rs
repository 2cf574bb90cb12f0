// Input validation utilities
//
// These mirror (but are not guaranteed to match) the server-side form validation. Keep the
// patterns in sync with the feedback API by policy.

use regex::Regex;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._\-+]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,6}$";
// Word characters are ASCII-only here; `\S` stays Unicode-aware.
const URL_PATTERN: &str = r"^((ftp|http|https)://)?((?-u:\w)+:?(?-u:\w)*@)?(\S+\.\S+)(:[0-9]+)?(/|/([0-9A-Za-z_#!:.?+=&%@!\-/]))?$";
const ABOUT_URL_PATTERN: &str = r"^about:";
const CHROME_URL_PATTERN: &str = r"^chrome://";

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::error!(
                "[PHASE: validation] [STEP: compile] Failed to compile pattern {}: {}",
                pattern,
                e
            );
            None
        }
    })
    .as_ref()
}

fn email_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&RE, EMAIL_PATTERN)
}

fn url_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&RE, URL_PATTERN)
}

fn about_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&RE, ABOUT_URL_PATTERN)
}

fn chrome_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&RE, CHROME_URL_PATTERN)
}

/// Validate an email address.
///
/// True iff the text is non-empty and email-shaped (local part, `@`, domain with a 2-6 letter
/// top-level label). No DNS or mailbox checks.
pub fn is_valid_email(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    email_re().map(|re| re.is_match(text)).unwrap_or(false)
}

/// Validate an optional URL field.
///
/// An empty string means "no URL provided" and is accepted.
pub fn is_valid_url(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }

    let matches = |re: Option<&'static Regex>| re.map(|re| re.is_match(text)).unwrap_or(false);
    matches(url_re()) || matches(about_re()) || matches(chrome_re())
}

/// True when the description has nothing but leading whitespace.
pub fn is_blank_description(text: &str) -> bool {
    text.trim_start().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_table() {
        let cases = [
            ("", false),
            ("abc", false),
            ("foo@", false),
            ("foo@example.com", true),
            ("foo.bar@baz.example.com", true),
            ("foo+tag@example.org", true),
            ("foo@example.c", false),
            ("foo@example.toolong", false),
            ("two@@example.com", false),
            ("spaces in@example.com", false),
        ];

        for (input, expected) in cases {
            assert_eq!(
                is_valid_email(input),
                expected,
                "is_valid_email({:?}) should be {}",
                input,
                expected
            );
        }
    }

    #[test]
    fn email_validation_is_total_for_odd_input() {
        assert!(!is_valid_email("   "));
        assert!(!is_valid_email("ünïcödé@exämple.com"));
        assert!(!is_valid_email("\n"));
    }

    #[test]
    fn url_validation_accepts_empty_and_known_schemes() {
        assert!(is_valid_url(""));
        assert!(is_valid_url("http://example.com"));
        assert!(is_valid_url("https://example.com/"));
        assert!(is_valid_url("ftp://files.example.com"));
        assert!(is_valid_url("example.com"));
        assert!(is_valid_url("about:config"));
        assert!(is_valid_url("chrome://browser/content"));
        assert!(is_valid_url("http://user:pw@example.com:8080/"));
    }

    #[test]
    fn url_validation_rejects_garbage() {
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("   "));
        assert!(!is_valid_url("localhost"));
        assert!(!is_valid_url("http://bücher"));
        assert!(!is_valid_url("ünï cödé.com"));
    }

    #[test]
    fn url_userinfo_is_ascii_only() {
        let re = url_re().expect("pattern compiles");
        let caps = re.captures("http://user:pw@example.com").expect("match");
        assert_eq!(caps.get(3).map(|m| m.as_str()), Some("user:pw@"));

        let caps = re.captures("http://üser:pw@example.com").expect("match");
        assert_eq!(caps.get(3), None, "non-ASCII userinfo falls through to the host part");
        assert!(is_valid_url("http://bücher.de"));
    }

    #[test]
    fn blank_description_ignores_leading_whitespace_only() {
        assert!(is_blank_description(""));
        assert!(is_blank_description("  \n\t"));
        assert!(!is_blank_description("  hi"));
    }
}
