//! OAuth2 client credentials and tokens.

use std::fmt;

use crate::error::ConfigError;

/// Client credentials plus the current token pair.
///
/// Tokens are opaque strings; nothing is assumed about their structure.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl Credentials {
    /// Check that everything needed for a refresh-token grant is present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first empty field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "UPWORK_API_KEY",
            });
        }
        if self.client_secret.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "UPWORK_API_SECRET",
            });
        }
        if self.refresh_token.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "UPWORK_ACCESS_TOKEN_REFRESH",
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}
