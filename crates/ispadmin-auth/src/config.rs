//! Session configuration.

use serde::Deserialize;

/// Configuration for the session store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Persistence key holding the bearer token.
    pub token_key: String,
    /// Persistence key holding the JSON identity snapshot.
    pub identity_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: "ispadmin.token".into(),
            identity_key: "ispadmin.identity".into(),
        }
    }
}
