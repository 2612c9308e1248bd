/// Admin key utilities
///
/// Operational endpoints (user listing, bulk user creation) are guarded by a
/// single shared secret, `ADMIN_API_KEY`, passed as the `key` query
/// parameter. The admin CLI can generate a fresh value.
///
/// # Security
///
/// - **Format**: `mnly_admin_{32_chars}` when generated here; any non-empty
///   configured value is accepted
/// - **Comparison**: both sides are hashed with SHA-256 and compared in
///   constant time, so neither length nor prefix leaks through timing
/// - **Unset secret**: every request is rejected
///
/// # Example
///
/// ```
/// use menuly_shared::auth::admin_key::{generate_admin_key, verify_admin_key};
///
/// let key = generate_admin_key();
/// assert!(key.starts_with("mnly_admin_"));
///
/// assert!(verify_admin_key(Some(&key), Some(&key)));
/// assert!(!verify_admin_key(Some("guess"), Some(&key)));
/// assert!(!verify_admin_key(Some(&key), None));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of a generated key
const KEY_RANDOM_LENGTH: usize = 32;

/// Generated key prefix
pub const ADMIN_KEY_PREFIX: &str = "mnly_admin_";

/// Total length of a generated key
pub const ADMIN_KEY_LENGTH: usize = ADMIN_KEY_PREFIX.len() + KEY_RANDOM_LENGTH;

/// Generates a new admin key
pub fn generate_admin_key() -> String {
    format!("{}{}", ADMIN_KEY_PREFIX, generate_random_string(KEY_RANDOM_LENGTH))
}

/// Generates a random alphanumeric string
///
/// Base62 (A-Z, a-z, 0-9), safe in URLs and `.env` files without quoting.
pub fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hex-encoded SHA-256 of a key
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Checks a provided key against the configured secret
///
/// # Arguments
///
/// * `provided` - Value from the request, if any
/// * `configured` - `ADMIN_API_KEY`, if set
///
/// # Returns
///
/// `true` only when both are present, non-empty and equal.
pub fn verify_admin_key(provided: Option<&str>, configured: Option<&str>) -> bool {
    let (Some(provided), Some(configured)) = (provided, configured) else {
        return false;
    };

    if provided.is_empty() || configured.is_empty() {
        return false;
    }

    constant_time_compare(&hash_key(provided), &hash_key(configured))
}

/// Constant-time string comparison
///
/// Always walks the full length of both inputs once lengths match.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
