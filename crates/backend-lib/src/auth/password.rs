// ============================
// contacts-backend-lib/src/auth/password.rs
// ============================
//! Salted password hashing and verification.
use std::fmt;

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Salt size in bytes
pub const SALT_LEN: usize = 16;

/// Random per-credential salt, stored hex-encoded
#[derive(Clone, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Parse a stored hex salt; `None` if it is not exactly [`SALT_LEN`] bytes of hex
    pub fn from_hex(hex_salt: &str) -> Option<Self> {
        let bytes = hex::decode(hex_salt).ok()?;
        let bytes: [u8; SALT_LEN] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", self.to_hex())
    }
}

/// Generate a fresh salt from OS entropy
pub fn generate_salt() -> Salt {
    let mut bytes = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut bytes);
    Salt(bytes)
}

/// Hash a password with the given salt, or a fresh one when `salt` is `None`.
///
/// Returns `(hex digest, hex salt)`. The digest is SHA-256 over the UTF-8
/// password bytes followed by the raw salt bytes.
pub fn hash_password(plain: &str, salt: Option<&Salt>) -> (String, String) {
    let salt = salt.cloned().unwrap_or_else(generate_salt);
    let digest = digest(plain, &salt);
    (hex::encode(digest), salt.to_hex())
}

/// Hash a password and zeroize the caller's copy of the plain text
pub fn hash_password_secure(plain: &mut String) -> (String, String) {
    let hashed = hash_password(plain, None);
    plain.zeroize();
    hashed
}

/// Verify a candidate password against a stored hash and salt.
///
/// A malformed stored salt or hash never verifies.
pub fn verify_password(stored_hash: &str, stored_salt: &str, candidate: &str) -> bool {
    let Some(salt) = Salt::from_hex(stored_salt) else {
        return false;
    };
    let Ok(expected) = hex::decode(stored_hash) else {
        return false;
    };
    constant_time_eq(&digest(candidate, &salt), &expected)
}

/// Constant-time byte comparison; unequal lengths compare false
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

fn digest(plain: &str, salt: &Salt) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(plain.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let (hash, salt) = hash_password("pw1", None);
        assert!(verify_password(&hash, &salt, "pw1"));
        assert!(!verify_password(&hash, &salt, "pw2"));
        assert!(!verify_password(&hash, &salt, ""));
    }

    #[test]
    fn test_explicit_salt_is_deterministic() {
        let salt = generate_salt();
        let (a, salt_a) = hash_password("correct horse", Some(&salt));
        let (b, salt_b) = hash_password("correct horse", Some(&salt));
        assert_eq!(a, b);
        assert_eq!(salt_a, salt_b);
        assert_eq!(salt_a, salt.to_hex());
    }

    #[test]
    fn test_known_digest() {
        // sha256(b"pw" ++ [0u8; 16])
        let salt = Salt::from_hex(&"00".repeat(SALT_LEN)).unwrap();
        let (hash, _) = hash_password("pw", Some(&salt));
        let mut hasher = Sha256::new();
        hasher.update(b"pw");
        hasher.update([0u8; SALT_LEN]);
        assert_eq!(hash, hex::encode(hasher.finalize()));
    }

    #[test]
    fn test_fresh_salts_differ() {
        let (hash_a, salt_a) = hash_password("same", None);
        let (hash_b, salt_b) = hash_password("same", None);
        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_a, hash_b);
        assert_eq!(salt_a.len(), SALT_LEN * 2);
        assert_eq!(hash_a.len(), 64);
    }

    #[test]
    fn test_malformed_stored_values_never_verify() {
        let (hash, salt) = hash_password("pw", None);
        assert!(!verify_password(&hash, "not-hex", "pw"));
        assert!(!verify_password(&hash, "abcd", "pw"));
        assert!(!verify_password("zz", &salt, "pw"));
        assert!(!verify_password(&hash[..10], &salt, "pw"));
    }

    #[test]
    fn test_secure_hash_zeroizes_input() {
        let mut plain = String::from("secret-pw");
        let (hash, salt) = hash_password_secure(&mut plain);
        assert!(plain.is_empty());
        assert!(verify_password(&hash, &salt, "secret-pw"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"Secret"));
        assert!(!constant_time_eq(b"secret", b"secre"));
    }
}
