//! Password hashing with Argon2id.
//!
//! Hash and verify are CPU-bound and run on the blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::AuthError;

/// Argon2id hasher producing PHC strings (`$argon2id$...`).
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a throwaway password with `params`, built on first use.
    dummy: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    /// OWASP minimums: 19 MiB memory, 2 iterations, 1 lane.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
            dummy: Arc::new(OnceCell::new()),
        }
    }

    /// Cheaper parameters for tests.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::Internal(format!("invalid Argon2 parameters: {e}")))?;
        Ok(Self {
            params,
            dummy: Arc::new(OnceCell::new()),
        })
    }

    pub async fn hash(&self, password: String) -> Result<String, AuthError> {
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
        })
        .await
        .map_err(|e| {
            tracing::error!("Password hash task failed: {e}");
            AuthError::Internal("password hashing failed".into())
        })?
        .map_err(|e| {
            tracing::error!("Failed to hash password: {e}");
            AuthError::Internal("password hashing failed".into())
        })
    }

    /// `Ok(false)` on mismatch or on a stored hash that cannot be parsed.
    pub async fn verify(&self, password: String, hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || match PasswordHash::new(&hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::error!("Stored password hash is not a valid PHC string: {e}");
                false
            }
        })
        .await
        .map_err(|e| {
            tracing::error!("Password verify task failed: {e}");
            AuthError::Internal("password verification failed".into())
        })
    }

    /// Spend the same Argon2 work as [`verify`](Self::verify) for a login
    /// that has no stored hash to check. Always `Ok(false)`.
    pub async fn verify_dummy(&self, password: String) -> Result<bool, AuthError> {
        let dummy = self
            .dummy
            .get_or_try_init(|| self.hash("arquetipo-sin-usuario".into()))
            .await?
            .clone();
        self.verify(password, dummy).await?;
        Ok(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_params(4096, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let h = hasher();
        let hash = h.hash("secreto123".into()).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(h.verify("secreto123".into(), hash.clone()).await.unwrap());
        assert!(!h.verify("otra".into(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let h = hasher();
        let a = h.hash("igual".into()).await.unwrap();
        let b = h.hash("igual".into()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn dummy_verify_never_matches_and_hash_is_reused() {
        let h = hasher();
        assert!(!h.verify_dummy("arquetipo-sin-usuario".into()).await.unwrap());
        let first = h.dummy.get().cloned().unwrap();
        assert!(first.starts_with("$argon2id$v=19$m=4096,t=1,p=1$"));

        let clone = h.clone();
        assert!(!clone.verify_dummy("otra".into()).await.unwrap());
        assert_eq!(clone.dummy.get(), Some(&first));
    }

    #[tokio::test]
    async fn garbage_hash_does_not_verify() {
        assert!(!hasher().verify("x".into(), "no-es-phc".into()).await.unwrap());
    }
}
