//! Session token handling.
//!
//! The token is issued by the authentication service and is opaque to this
//! crate. It is only ever exposed when building the `Authorization` header.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Opaque credential identifying an authenticated user to the backend.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Value for the `Authorization` header.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"[REDACTED]").finish()
    }
}

impl From<SecretString> for SessionToken {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}
