//! Credential hashing and temporary password generation.
//!
//! Passwords are hashed with bcrypt. [`CredentialHasher`] carries the cost
//! factor so callers (and tests) can pick a cheaper cost than
//! [`bcrypt::DEFAULT_COST`] without touching global state.

use bcrypt::{DEFAULT_COST, hash, verify};
use rand::RngCore;

use crate::errors::AppError;

/// Number of random bytes behind a temporary password (hex encoded, so the
/// plaintext is twice as long).
const TEMP_PASSWORD_BYTES: usize = 5;

/// One-way credential hasher backed by bcrypt.
#[derive(Clone, Copy, Debug)]
pub struct CredentialHasher {
    cost: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl CredentialHasher {
    /// Creates a hasher with an explicit bcrypt cost (4..=31).
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Reads `BCRYPT_COST` from the environment, falling back to the bcrypt default.
    pub fn from_env() -> Self {
        std::env::var("BCRYPT_COST")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Self::with_cost)
            .unwrap_or_default()
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        hash(plaintext, self.cost)
            .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
    }

    pub fn verify(&self, plaintext: &str, hashed: &str) -> Result<bool, AppError> {
        verify(plaintext, hashed)
            .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
    }

    /// Spends one bcrypt round at this hasher's cost and reports no match.
    /// Login paths call it for unknown accounts so they cost the same as a
    /// wrong password.
    pub fn verify_absent(&self, plaintext: &str) -> bool {
        let _ = hash(plaintext, self.cost);
        false
    }
}

/// Generates a random 10-character hex password for newly enrolled students.
pub fn generate_temporary_password() -> String {
    let mut bytes = [0u8; TEMP_PASSWORD_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_password_shape() {
        let password = generate_temporary_password();
        assert_eq!(password.len(), TEMP_PASSWORD_BYTES * 2);
        assert!(password.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_temporary_passwords_differ() {
        assert_ne!(generate_temporary_password(), generate_temporary_password());
    }

    #[test]
    fn test_hasher_round_trip_with_low_cost() {
        let hasher = CredentialHasher::with_cost(4);
        let hashed = hasher.hash("s3cret").unwrap();
        assert_ne!(hashed, "s3cret");
        assert!(hasher.verify("s3cret", &hashed).unwrap());
        assert!(!hasher.verify("wrong", &hashed).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        let hasher = CredentialHasher::with_cost(4);
        assert!(hasher.verify("anything", "not_a_bcrypt_hash").is_err());
    }

    #[test]
    fn test_verify_absent_never_matches() {
        let hasher = CredentialHasher::with_cost(4);
        assert!(!hasher.verify_absent("s3cret"));
        assert!(!hasher.verify_absent(""));
    }

    #[test]
    fn test_default_cost() {
        assert_eq!(CredentialHasher::default().cost(), DEFAULT_COST);
    }
}
