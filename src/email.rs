use std::sync::OnceLock;

use regex::Regex;

/// Value sent to the backend when no address can be found in the escalation text.
pub const UNKNOWN_EMAIL: &str = "unknown";

/// Local part, `@`, a dotted domain, and a top-level label of at least two
/// ASCII letters. Deliberately loose: this is best-effort contact capture,
/// not address validation.
const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Returns the first email-looking substring of `text`, if any.
pub fn extract_email(text: &str) -> Option<&str> {
    email_regex().find(text).map(|m| m.as_str())
}

/// Like [`extract_email`] but substitutes [`UNKNOWN_EMAIL`] when nothing matches.
pub fn extract_email_or_unknown(text: &str) -> &str {
    extract_email(text).unwrap_or(UNKNOWN_EMAIL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_address_after_free_text() {
        assert_eq!(extract_email("Refund issue — a@b.co"), Some("a@b.co"));
        assert_eq!(
            extract_email("Refund not processed — mymail@example.com"),
            Some("mymail@example.com")
        );
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(
            extract_email("reach me at first@one.io or second@two.io"),
            Some("first@one.io")
        );
    }

    #[test]
    fn accepts_plus_tags_and_subdomains() {
        assert_eq!(
            extract_email("contact: jane.doe+support@mail.example.co.uk."),
            Some("jane.doe+support@mail.example.co.uk")
        );
    }

    #[test]
    fn rejects_single_letter_tld_and_bare_at() {
        assert_eq!(extract_email("a@b.c"), None);
        assert_eq!(extract_email("@example.com"), None);
        assert_eq!(extract_email("no email here"), None);
    }

    #[test]
    fn unknown_fallback() {
        assert_eq!(extract_email_or_unknown("no email here"), "unknown");
        assert_eq!(extract_email_or_unknown("x y@z.org"), "y@z.org");
    }
}
