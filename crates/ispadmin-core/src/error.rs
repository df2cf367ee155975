//! Error types for the admin console core.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdminError {
    /// No session, or the session token was rejected.
    #[error("not authenticated")]
    Unauthenticated,

    /// Authenticated, but the identity lacks the required permission.
    #[error("permission denied: {permission} is required")]
    Forbidden { permission: String },

    #[error("authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("invalid permission token `{token}`: {reason}")]
    InvalidPermission { token: String, reason: String },

    /// Network or server failure on a remote data operation.
    #[error("remote service failure: {0}")]
    RemoteFailure(String),

    #[error("session persistence error: {0}")]
    Persistence(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AdminError {
    /// Whether the caller should send the user back to the login screen.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            AdminError::Unauthenticated | AdminError::AuthenticationFailed { .. }
        )
    }
}

pub type AdminResult<T> = Result<T, AdminError>;
