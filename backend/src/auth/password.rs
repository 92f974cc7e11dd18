//! Password hashing using bcrypt
//!
//! Provides salted one-way password hashing and verification with a
//! fixed work factor. Hashing happens exactly once, when the plaintext
//! password is first set; persistence writes never re-hash.

use anyhow::Result;

/// bcrypt work factor. Raising it slows brute-force attacks at the cost
/// of login latency.
const HASH_COST: u32 = 12;

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Hash a password with bcrypt at cost 12 (blocking operation)
    ///
    /// # Performance Note
    /// This is CPU-intensive. For async contexts, use `hash_async`.
    pub fn hash(password: &str) -> Result<String> {
        let hash = bcrypt::hash(password, HASH_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash)
    }

    /// Hash a password asynchronously (non-blocking)
    ///
    /// Spawns the CPU-intensive work on a blocking thread pool,
    /// preventing it from blocking the async runtime.
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a hash (blocking operation)
    ///
    /// A mismatch returns `Ok(false)`, never an error; the comparison is
    /// bcrypt's own constant-time-safe routine.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        let matches = bcrypt::verify(password, hash)
            .map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
        Ok(matches)
    }

    /// Verify a password asynchronously (non-blocking)
    ///
    /// Spawns the CPU-intensive work on a blocking thread pool.
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}
