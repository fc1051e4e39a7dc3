//! Durable storage for rotated OAuth2 tokens.

use crate::error::Result;

/// Persists the token pair after a successful refresh.
///
/// Writes must be atomic: a crash mid-write leaves the previous state
/// readable.
pub trait CredentialPersistence: Send + Sync {
    /// Store the current access token and refresh token.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the backing store could not be written.
    fn save(&self, access_token: &str, refresh_token: &str) -> Result<()>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}
