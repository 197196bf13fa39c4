//! bcrypt password hashing off the async executor.

use tokio::task::JoinError;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("bcrypt: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task: {0}")]
    Join(#[from] JoinError),
}

/// bcrypt hashing, run off the async executor.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let plain = plain.to_owned();
        let cost = self.cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost)).await??)
    }

    /// False for a wrong password; an unparsable stored hash also counts as a mismatch.
    pub async fn verify(&self, plain: &str, hashed: &str) -> Result<bool, PasswordError> {
        let plain = plain.to_owned();
        let hashed = hashed.to_owned();
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hashed)).await?;
        match outcome {
            Ok(ok) => Ok(ok),
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is unusable");
                Ok(false)
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
