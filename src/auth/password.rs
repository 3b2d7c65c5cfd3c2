use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::error;

/// Hash a password with a fresh random salt (Argon2id, default parameters).
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Check `plain` against a stored hash. Comparison is the algorithm's own
/// constant-time verify. A malformed stored hash counts as a mismatch
/// rather than an error the caller has to handle.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

// Hashing takes on the order of 100ms of CPU; run it on the blocking pool
// so one registration never stalls the async workers.

pub async fn hash_password_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain)).await?
}

pub async fn verify_password_blocking(plain: String, hash: String) -> anyhow::Result<bool> {
    Ok(tokio::task::spawn_blocking(move || verify_password(&plain, &hash)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn malformed_hash_is_a_mismatch_not_an_error() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        let a = hash_password("password123").expect("hash");
        let b = hash_password("password123").expect("hash");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn blocking_wrappers_roundtrip() {
        let hash = hash_password_blocking("password123".into())
            .await
            .expect("hash");
        assert!(verify_password_blocking("password123".into(), hash)
            .await
            .expect("verify"));
    }
}
