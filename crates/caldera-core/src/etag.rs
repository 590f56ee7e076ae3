//! Entity tag generation.

use sha2::{Digest, Sha256};

/// ## Summary
/// Generates an entity tag from content bytes.
///
/// The tag is the hex-encoded SHA256 hash of the content, wrapped in quotes,
/// so it can be compared verbatim with an `If-Match` header value.
#[must_use]
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let hash = hasher.finalize();
    format!("\"{}\"", hex::encode(hash))
}
