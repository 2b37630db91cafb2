//! Password hashing for accounts
//!
//! Encoded form: `pbkdf2-sha256$<iterations>$<salt>$<hash>` with base64
//! (no padding) salt and hash. The iteration count travels with the hash so
//! the configured cost can change without invalidating stored passwords.

use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const DEFAULT_ITERATIONS: u32 = 600_000;
pub const SALT_LENGTH: usize = 16;
pub const HASH_LENGTH: usize = 32;

const SCHEME: &str = "pbkdf2-sha256";

/// PBKDF2-HMAC-SHA256 hasher with a fixed cost
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash with a fresh random salt
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = derive(password, &salt, self.iterations);
        format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            STANDARD_NO_PAD.encode(salt),
            STANDARD_NO_PAD.encode(digest)
        )
    }

    /// Check a password against an encoded hash. Malformed hashes never match.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        let mut parts = encoded.split('$');
        let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };
        if scheme != SCHEME {
            return false;
        }
        let Ok(iterations) = iterations.parse::<u32>() else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (
            STANDARD_NO_PAD.decode(salt),
            STANDARD_NO_PAD.decode(expected),
        ) else {
            return false;
        };
        if iterations == 0 || expected.len() != HASH_LENGTH {
            return false;
        }
        let actual = derive(password, &salt, iterations);
        bool::from(actual.as_slice().ct_eq(expected.as_slice()))
    }
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = PasswordHasher::new(10);
        let encoded = hasher.hash("parola!123");
        assert!(encoded.starts_with("pbkdf2-sha256$10$"));
        assert!(hasher.verify("parola!123", &encoded));
        assert!(!hasher.verify("parola!124", &encoded));
    }

    #[test]
    fn test_salt_differs_per_hash() {
        let hasher = PasswordHasher::new(10);
        assert_ne!(hasher.hash("same!pass"), hasher.hash("same!pass"));
    }

    #[test]
    fn test_verify_uses_stored_iterations() {
        let encoded = PasswordHasher::new(5).hash("parola!123");
        assert!(PasswordHasher::new(50).verify("parola!123", &encoded));
    }

    #[test]
    fn test_malformed_hash_rejected() {
        let hasher = PasswordHasher::new(10);
        assert!(!hasher.verify("x", ""));
        assert!(!hasher.verify("x", "plaintext"));
        assert!(!hasher.verify("x", "md5$10$YWJj$YWJj"));
        assert!(!hasher.verify("x", "pbkdf2-sha256$0$YWJj$YWJj"));
    }
}
