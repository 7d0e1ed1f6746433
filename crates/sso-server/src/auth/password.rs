//! Password hashing and verification using bcrypt.

/// bcrypt only looks at the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password exceeds {MAX_PASSWORD_BYTES} bytes")]
    TooLong,

    #[error("hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Hash a password with bcrypt at the given cost and a random salt.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::TooLong);
    }
    Ok(bcrypt::hash(password, cost)?)
}

/// Verify a password against a stored bcrypt hash.
///
/// A malformed hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const COST: u32 = 4;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("mysecret1", COST).unwrap();
        assert!(verify_password("mysecret1", &hash));
        assert!(!verify_password("wrongpassword", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        let h1 = hash_password("password1", COST).unwrap();
        let h2 = hash_password("password1", COST).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn rejects_password_over_limit() {
        let long = "a".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(matches!(
            hash_password(&long, COST),
            Err(PasswordError::TooLong)
        ));
        let exact = "a".repeat(MAX_PASSWORD_BYTES);
        assert!(hash_password(&exact, COST).is_ok());
    }

    #[test]
    fn malformed_hash_is_mismatch() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
