//! API key generation, hashing, and display formatting.
//!
//! Keys look like `sk-proj-<48 hex chars>`. The raw key is shown to the
//! user exactly once at creation; only the SHA-256 hash and a short
//! display prefix are stored.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Prefix of every issued key.
pub const API_KEY_PREFIX: &str = "sk-proj-";

/// Number of random bytes behind the hex portion of a key.
const API_KEY_BYTES: usize = 24;

/// Length of the hex portion (two chars per byte).
pub const API_KEY_HEX_LEN: usize = API_KEY_BYTES * 2;

/// Number of leading key characters kept in the display form.
const DISPLAY_PREFIX_LEN: usize = 12;

/// Generate a new raw API key.
pub fn generate() -> String {
    let mut bytes = [0u8; API_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", API_KEY_PREFIX, hex::encode(bytes))
}

/// SHA-256 hash of a raw key, hex-encoded. This is the stored and
/// compared form; the raw key never touches the database.
pub fn hash(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Truncated display form: first 12 characters plus an ellipsis marker.
pub fn display(key: &str) -> String {
    let prefix: String = key.chars().take(DISPLAY_PREFIX_LEN).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let key = generate();
        assert!(key.starts_with(API_KEY_PREFIX));

        let hex_part = &key[API_KEY_PREFIX.len()..];
        assert_eq!(hex_part.len(), API_KEY_HEX_LEN);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_unique() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_deterministic() {
        let key = "sk-proj-0123456789abcdef";
        assert_eq!(hash(key), hash(key));
    }

    #[test]
    fn test_hash_differs_for_different_keys() {
        assert_ne!(hash("sk-proj-aaaa"), hash("sk-proj-aaab"));
    }

    #[test]
    fn test_hash_is_sha256_hex() {
        let digest = hash("sk-proj-test");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_known_vector() {
        // echo -n "hello" | sha256sum
        assert_eq!(
            hash("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_display_is_fifteen_chars() {
        let key = generate();
        let shown = display(&key);
        assert_eq!(shown.len(), 15);
        assert!(shown.ends_with("..."));
        assert!(key.starts_with(&shown[..12]));
    }

    #[test]
    fn test_display_of_known_key() {
        let shown = display("sk-proj-0123456789abcdef0123456789abcdef0123456789abcdef");
        assert_eq!(shown, "sk-proj-0123...");
    }
}
