//! Identifier length handling
//!
//! Constraint names longer than the dialect allows are shortened to a
//! readable prefix followed by a hash of the full name. The hash keeps the
//! result stable across runs and keeps distinct long names apart.

use sha2::{Digest, Sha256};

/// Hex characters of the digest kept in a shortened name
pub const HASH_LEN: usize = 12;

/// Shorten `name` to at most `limit` bytes
///
/// Names that already fit are returned unchanged. Longer names become
/// `{prefix}_{hash}` where `hash` is the first [`HASH_LEN`] hex characters of
/// the SHA-256 digest of the full name.
pub fn truncate_identifier(name: &str, limit: usize) -> String {
    if name.len() <= limit {
        return name.to_string();
    }

    let hash = short_hash(name);
    let budget = limit.saturating_sub(HASH_LEN + 1);
    let prefix = floor_char_boundary(name, budget).trim_end_matches('_');

    if prefix.is_empty() {
        hash
    } else {
        format!("{prefix}_{hash}")
    }
}

/// Hex digest prefix for `name`
fn short_hash(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    let mut hex = String::with_capacity(HASH_LEN);
    for byte in digest.iter().take(HASH_LEN.div_ceil(2)) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex.truncate(HASH_LEN);
    hex
}

/// Longest prefix of `s` that is at most `max` bytes and ends on a char boundary
fn floor_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Tests
// ============================================================================
