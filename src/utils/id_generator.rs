//! Content hashing and short identifier generation.
//!
//! Every stored entry is keyed twice: by a random short id that users see, and
//! by a SHA-256 digest of its normalized URL that the storage backends use to
//! deduplicate.

use sha2::{Digest, Sha256};
use tracing::warn;

/// Symbols a short id is drawn from.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of symbols in a generated short id.
pub const ID_LENGTH: usize = 6;

/// Largest byte value that maps onto the alphabet without modulo bias (62 * 4).
const UNBIASED_LIMIT: u8 = 248;

/// Computes the deduplication key for a normalized URL.
///
/// Returns the lowercase hex SHA-256 digest of the URL bytes (64 characters).
/// The function is deterministic: the same input always yields the same hash.
///
/// # Examples
///
/// ```ignore
/// let hash = hash_url("https://example.com");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, hash_url("https://example.com"));
/// ```
pub fn hash_url(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a random 6-character short id, e.g. `"f4b10g"`.
///
/// Each symbol is drawn from OS entropy via `getrandom`, using rejection
/// sampling so all 62 symbols are equally likely.
///
/// # Degraded mode
///
/// If the OS random source fails, the symbol at position `i` falls back to
/// `ALPHABET[i % 62]`, so a fully degraded id is `"abcdef"`. Creation keeps
/// working but ids become predictable and collide with each other; the storage
/// backends detect such collisions with their existence re-check. Every
/// fallback is logged.
pub fn generate_id() -> String {
    generate_id_with(|buf| getrandom::fill(buf).map_err(|e| e.to_string()))
}

/// Generates an id pulling entropy from `fill`.
///
/// Split out from [`generate_id`] so the fallback path can be exercised.
fn generate_id_with<F>(mut fill: F) -> String
where
    F: FnMut(&mut [u8]) -> Result<(), String>,
{
    let mut id = String::with_capacity(ID_LENGTH);

    for position in 0..ID_LENGTH {
        let symbol = match next_symbol(&mut fill) {
            Ok(symbol) => symbol,
            Err(reason) => {
                warn!(
                    position,
                    "Random source failed ({}); using deterministic fallback symbol", reason
                );
                ALPHABET[position % ALPHABET.len()]
            }
        };
        id.push(symbol as char);
    }

    id
}

/// Draws one unbiased alphabet symbol.
fn next_symbol<F>(fill: &mut F) -> Result<u8, String>
where
    F: FnMut(&mut [u8]) -> Result<(), String>,
{
    let mut buf = [0u8; 8];

    loop {
        fill(&mut buf)?;

        if let Some(byte) = buf.iter().copied().find(|b| *b < UNBIASED_LIMIT) {
            return Ok(ALPHABET[(byte % ALPHABET.len() as u8) as usize]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(
            hash_url("https://example.com"),
            hash_url("https://example.com")
        );
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = hash_url("https://example.com");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_hash_known_vector() {
        assert_eq!(
            hash_url(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_differs_for_different_urls() {
        assert_ne!(hash_url("https://a.com"), hash_url("https://b.com"));
    }

    #[test]
    fn test_generate_id_length_and_alphabet() {
        let id = generate_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_generate_id_mostly_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        // 62^6 ≈ 5.7e10 possible ids; a collision in 1000 draws is vanishingly rare.
        assert!(ids.len() >= 999);
    }

    #[test]
    fn test_generate_id_falls_back_when_random_source_fails() {
        let id = generate_id_with(|_| Err("entropy unavailable".to_string()));
        assert_eq!(id, "abcdef");
    }

    #[test]
    fn test_generate_id_rejects_biased_bytes() {
        // 255 is above the unbiased limit and must be skipped, 63 maps to 'b'.
        let id = generate_id_with(|buf| {
            buf.fill(255);
            buf[7] = 63;
            Ok(())
        });
        assert_eq!(id, "bbbbbb");
    }

    #[test]
    fn test_generate_id_partial_fallback() {
        let mut calls = 0;
        let id = generate_id_with(|buf| {
            calls += 1;
            if calls == 3 {
                return Err("transient".to_string());
            }
            buf.fill(0);
            Ok(())
        });
        assert_eq!(id, "aacaaa");
    }
}
