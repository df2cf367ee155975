//! Identity domain model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::permission::PermissionSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(pub i64);

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The authenticated actor of the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub display_name: String,
    /// Human-readable role name (e.g., `Administrador`, `Cajero`).
    pub role_label: String,
    #[serde(default)]
    pub permissions: PermissionSet,
}

/// Successful response of the authentication collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token for subsequent remote calls.
    pub token: String,
    pub identity: Identity,
}
