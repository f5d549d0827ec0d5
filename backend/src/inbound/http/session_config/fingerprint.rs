//! Session key fingerprint for logs.
//!
//! Operators compare fingerprints across replicas to confirm they share a
//! key without ever seeing key material.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 8;

/// First eight bytes of the SHA-256 of the signing key, lowercase hex.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use orderdesk::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn same_key_same_fingerprint() {
        let key = Key::derive_from(&[b'a'; 64]);
        assert_eq!(key_fingerprint(&key), key_fingerprint(&key));
    }

    #[rstest]
    fn fingerprint_is_sixteen_lowercase_hex_chars() {
        let fp = key_fingerprint(&Key::generate());
        assert_eq!(fp.len(), FINGERPRINT_BYTES * 2);
        assert!(fp.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[rstest]
    fn distinct_keys_are_distinguishable() {
        let first = Key::derive_from(&[b'a'; 64]);
        let second = Key::derive_from(&[b'b'; 64]);
        assert_ne!(key_fingerprint(&first), key_fingerprint(&second));
    }
}
