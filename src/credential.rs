//! The API key authorizing a feed connection.

use secrecy::{ExposeSecret, SecretString};

/// An opaque, non-empty API key.
///
/// The key is never validated locally; the feed service accepts or rejects it
/// when the connection opens. `Debug` output is redacted.
pub struct Credential(SecretString);

impl Credential {
    /// Build a credential from user input.
    ///
    /// Returns `None` when the trimmed input is empty.
    pub fn from_input(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(SecretString::from(trimmed.to_string())))
    }

    /// The raw key, for the connection handshake and the header line.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self(SecretString::from(self.expose().to_string()))
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for Credential {}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}
