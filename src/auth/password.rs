use crate::error::AppError;
use bcrypt::{hash, verify};

/// Salted bcrypt hashing with a configurable work factor.
///
/// Both operations run on tokio's blocking pool so a slow hash never stalls the
/// worker that is serving other requests.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let cost = self.cost;
        let password = password.to_owned();
        let digest = tokio::task::spawn_blocking(move || hash(password, cost)).await??;
        Ok(digest)
    }

    /// Returns `Ok(false)` for a wrong password. Errors only when `digest` is not a
    /// bcrypt hash at all, which means the stored record is corrupt.
    pub async fn verify(&self, password: &str, digest: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let digest = digest.to_owned();
        let matches = tokio::task::spawn_blocking(move || verify(password, &digest)).await??;
        Ok(matches)
    }
}
