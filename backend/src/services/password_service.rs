use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::errors::AppError;

/// Hash `password` with Argon2id and a fresh random salt.
///
/// Returns the PHC string (`$argon2id$v=19$...`) which carries the salt and
/// cost parameters, so verification needs nothing else.
pub fn hash(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut rand_core::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing error: {}", e)))
}

/// Check `password` against a stored PHC string. A digest that cannot be
/// parsed never verifies.
pub fn verify(password: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// [`hash`] on the blocking pool; Argon2 is deliberately slow.
pub async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(&password)).await?
}

/// [`verify`] on the blocking pool.
pub async fn verify_blocking(password: String, digest: String) -> Result<bool, AppError> {
    Ok(tokio::task::spawn_blocking(move || verify(&password, &digest)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies() {
        let digest = hash("secret1").unwrap();
        assert!(digest.starts_with("$argon2"));
        assert!(verify("secret1", &digest));
    }

    #[test]
    fn test_single_character_mutations_fail() {
        let digest = hash("secret1").unwrap();
        for wrong in ["secret2", "Secret1", "secret", "secret1 ", "xecret1"] {
            assert!(!verify(wrong, &digest), "{} should not verify", wrong);
        }
    }

    #[test]
    fn test_salts_differ() {
        let a = hash("same").unwrap();
        let b = hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_digest_does_not_verify() {
        assert!(!verify("secret1", "not-a-hash"));
        assert!(!verify("secret1", ""));
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let digest = hash_blocking("pw".to_string()).await.unwrap();
        assert!(verify_blocking("pw".to_string(), digest.clone()).await.unwrap());
        assert!(!verify_blocking("pW".to_string(), digest).await.unwrap());
    }
}
