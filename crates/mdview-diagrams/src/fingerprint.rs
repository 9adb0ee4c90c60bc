//! Content fingerprints used as render cache keys.

use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 digest of a diagram block's literal source.
///
/// The digest covers the raw bytes only. No whitespace or encoding
/// normalization is applied, so two sources differing by a trailing space
/// have different fingerprints.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint of a block's literal content.
    #[must_use]
    pub fn of(content: &str) -> Self {
        Self::of_bytes(content.as_bytes())
    }

    /// Compute the fingerprint of raw bytes.
    #[must_use]
    pub fn of_bytes(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        let result = hasher.finalize();

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }

    /// The 32 digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_fingerprint_stable() {
        let source = "graph TD\n  A --> B\n";
        assert_eq!(Fingerprint::of(source), Fingerprint::of(source));
    }

    #[test]
    fn test_fingerprint_known_digest() {
        // sha256("")
        assert_eq!(
            Fingerprint::of("").to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fingerprint_no_normalization() {
        assert_ne!(Fingerprint::of("A --> B"), Fingerprint::of("A --> B "));
        assert_ne!(Fingerprint::of("A --> B\n"), Fingerprint::of("A --> B\r\n"));
    }

    #[test]
    fn test_fingerprint_str_and_bytes_agree() {
        assert_eq!(Fingerprint::of("abc"), Fingerprint::of_bytes(b"abc"));
    }

    #[test]
    fn test_fingerprint_no_collisions_in_corpus() {
        let corpus: Vec<String> = (0..500)
            .map(|i| format!("graph TD\n  N{i} --> N{}\n", i + 1))
            .chain(["", " ", "\n", "A", "a", "A --> B", "B --> A"].map(str::to_owned))
            .collect();

        let fingerprints: HashSet<Fingerprint> =
            corpus.iter().map(|s| Fingerprint::of(s)).collect();

        assert_eq!(fingerprints.len(), corpus.len());
    }

    #[test]
    fn test_fingerprint_display_is_hex() {
        let hex = Fingerprint::of("test source").to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(Fingerprint::of("test source").as_bytes().len(), 32);
    }
}
