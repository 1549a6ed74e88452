//! Wraps a user-supplied POSIX extended regular expression so it only
//! matches on word boundaries, and compiles it against raw paragraph bytes
//! rather than validated UTF-8.

use common::ErrorKind;
use regex::bytes::{Regex, RegexBuilder};

#[derive(Debug, thiserror::Error)]
#[error("invalid pattern: {0}")]
pub struct MatcherError(#[from] regex::Error);

impl MatcherError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Regex
    }
}

/// A compiled, boundary-wrapped pattern ready to test paragraphs against.
pub struct Matcher {
    inner: Regex,
}

impl Matcher {
    /// Compiles `pattern`, wrapping it so a match can only start and end on
    /// a non-word boundary (or the start/end of the paragraph), exactly as
    /// whole-word matching requires. The caller's pattern is otherwise
    /// passed through unmodified, so `.`, anchors, and character classes all
    /// behave as plain POSIX ERE inside it.
    pub fn compile(pattern: &str) -> Result<Self, MatcherError> {
        let wrapped = format!(r"(^|[^[:alnum:]_])({pattern})([^[:alnum:]_]|$)");
        let inner = RegexBuilder::new(&wrapped)
            .unicode(false)
            .build()
            .map_err(MatcherError)?;
        Ok(Self { inner })
    }

    /// Whether `text` contains a whole-word match anywhere.
    #[must_use]
    pub fn is_match(&self, text: &[u8]) -> bool {
        self.inner.is_match(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whole_word_only() {
        let matcher = Matcher::compile("cat").unwrap();
        assert!(matcher.is_match(b"the cat sat"));
        assert!(!matcher.is_match(b"category error"));
        assert!(!matcher.is_match(b"concatenate"));
    }

    #[test]
    fn matches_at_paragraph_start_and_end() {
        let matcher = Matcher::compile("cat").unwrap();
        assert!(matcher.is_match(b"cat"));
        assert!(matcher.is_match(b"cat sat on the mat"));
        assert!(matcher.is_match(b"a fine cat"));
    }

    #[test]
    fn supports_posix_character_classes() {
        let matcher = Matcher::compile(r"[[:digit:]]+").unwrap();
        assert!(matcher.is_match(b"order 42 shipped"));
        assert!(!matcher.is_match(b"no digits here"));
    }

    #[test]
    fn supports_alternation() {
        let matcher = Matcher::compile("cat|dog").unwrap();
        assert!(matcher.is_match(b"a dog barked"));
        assert!(matcher.is_match(b"a cat meowed"));
        assert!(!matcher.is_match(b"a fish swam"));
    }

    #[test]
    fn rejects_malformed_patterns() {
        let err = Matcher::compile("(unclosed").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Regex);
    }

    #[test]
    fn matches_on_non_alphanumeric_bytes_without_panicking() {
        let matcher = Matcher::compile("cat").unwrap();
        assert!(matcher.is_match(b"\xff\xfe cat \xff"));
    }
}
