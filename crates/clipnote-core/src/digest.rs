//! Content-addressed digest for dedup.

use sha2::{Digest, Sha256};

/// Compute the dedup digest of captured text: SHA-256 over the UTF-8 bytes,
/// lowercase hex.
pub fn content_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(content_digest("hello"), content_digest("hello"));
    }

    #[test]
    fn digest_differs_for_different_input() {
        assert_ne!(content_digest("hello"), content_digest("hello "));
    }

    #[test]
    fn digest_known_vector() {
        // SHA-256 of the empty string.
        assert_eq!(
            content_digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let d = content_digest("Clipboard text");
        assert_eq!(d.len(), 64);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn digest_handles_multibyte_text() {
        let d = content_digest("métadonnées 剪贴板");
        assert_eq!(d.len(), 64);
    }
}
