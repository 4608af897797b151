use sha2::{Digest, Sha256};

/// SHA-256 of the image bytes as lowercase hex.
/// This is the dedup key stored in the record store.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
