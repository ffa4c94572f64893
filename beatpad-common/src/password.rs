//! Salted password hashing
//!
//! Passwords are stored as hex SHA-256 of `salt || password` alongside the
//! random salt, mirroring the `password_hash`/`password_salt` columns of the
//! users table.

use rand::Rng;
use sha2::{Digest, Sha256};

const SALT_BYTES: usize = 16;

/// Fresh 128-bit random salt, hex encoded
pub fn generate_salt() -> String {
    let salt: u128 = rand::thread_rng().gen();
    format!("{:032x}", salt)
}

/// Hex SHA-256 of salt followed by password
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}
