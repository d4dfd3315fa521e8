use crate::errors::ApiError;

pub const BCRYPT_COST: u32 = 10;

// bcrypt is CPU-bound; keep it off the async workers.
pub async fn hash(password: &str) -> Result<String, ApiError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

/// A malformed stored hash counts as a mismatch, not a server error.
pub async fn verify(password: &str, hashed: &str) -> Result<bool, ApiError> {
    let password = password.to_owned();
    let hashed = hashed.to_owned();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(matches.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_verifies_only_the_original_password() {
        let hashed = hash("p").await.unwrap();
        assert_ne!(hashed, "p");
        assert!(hashed.starts_with("$2b$10$"));
        assert!(verify("p", &hashed).await.unwrap());
        assert!(!verify("wrong", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_hash_is_a_mismatch() {
        assert!(!verify("p", "not-a-hash").await.unwrap());
    }
}
