use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of user-facing record ids (tokens, checks).
pub const RECORD_ID_LEN: usize = 20;

const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random lowercase-alphanumeric string of the given length.
pub fn random_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
        .collect()
}

/// Keyed SHA-256 digest of a password, hex-encoded. The secret comes from
/// the deployment, not the user.
pub fn hash_password(secret: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
