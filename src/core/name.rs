//! Canonical attachment filenames.
//!
//! Wiki bodies refer to the same file in several spellings: entity-escaped
//! inside attributes, percent-encoded inside URLs, with stray whitespace or
//! different letter case. Every spelling is folded into one `CanonicalName`
//! so that a reference and an attachment title compare equal whenever they
//! name the same file.

use std::fmt;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use serde::{Serialize, Serializer};

/// Folded filename used as an index key.
///
/// Invariants:
/// - No percent-encoding left from a single encoding pass
/// - No leading or trailing whitespace
/// - Lowercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalName(Arc<str>);

impl CanonicalName {
    /// Fold a filename as written in an attribute or returned by the API.
    ///
    /// The input is expected to be free of markup escaping already (the
    /// scanner decodes attribute values once). One percent-decoding pass is
    /// applied so `a%20b.png` and `a b.png` fold together. Invalid UTF-8
    /// after decoding falls back to the raw text.
    pub fn new(raw: &str) -> Self {
        let decoded = percent_decode_str(raw)
            .decode_utf8()
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string());

        let folded = decoded
            .trim_matches(|c: char| c.is_whitespace())
            .to_lowercase();

        Self(Arc::from(folded))
    }

    /// Fold a filename taken from a URL path segment.
    ///
    /// The segment is percent-decoded once to recover the literal filename,
    /// then folded like any other name.
    pub fn from_url_segment(segment: &str) -> Self {
        let literal = percent_decode_str(segment).decode_utf8_lossy();
        Self::new(&literal)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CanonicalName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace_fold() {
        assert_eq!(CanonicalName::new("  Report.PDF "), CanonicalName::new("report.pdf"));
        assert_eq!(CanonicalName::new("Report.PDF").as_str(), "report.pdf");
    }

    #[test]
    fn test_percent_encoding_folds() {
        assert_eq!(CanonicalName::new("photo%201.jpg"), CanonicalName::new("photo 1.jpg"));
        assert_eq!(CanonicalName::new("Pr%C3%BCfung.pdf"), CanonicalName::new("prüfung.pdf"));
    }

    #[test]
    fn test_unicode_lowercase() {
        assert_eq!(CanonicalName::new("ÄRGER.txt").as_str(), "ärger.txt");
    }

    #[test]
    fn test_plus_is_literal() {
        assert_eq!(CanonicalName::new("c++.png").as_str(), "c++.png");
    }

    #[test]
    fn test_invalid_utf8_keeps_raw() {
        assert_eq!(CanonicalName::new("bad%FF.bin").as_str(), "bad%ff.bin");
    }

    #[test]
    fn test_url_segment_matches_title_with_literal_percent() {
        // title "50%25off.png" is served as ".../50%2525off.png"
        assert_eq!(
            CanonicalName::from_url_segment("50%2525off.png"),
            CanonicalName::new("50%25off.png")
        );
        assert_eq!(
            CanonicalName::from_url_segment("photo%201.jpg"),
            CanonicalName::new("photo 1.jpg")
        );
    }
}
