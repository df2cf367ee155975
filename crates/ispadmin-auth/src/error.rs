//! Authentication and authorization error types.

use ispadmin_core::error::AdminError;
use ispadmin_core::models::permission::PermissionToken;
use thiserror::Error;

/// Failures of the login and session-restore flows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unknown user")]
    UnknownUser,

    #[error("account is inactive or suspended")]
    AccountInactive,

    #[error("session has expired")]
    SessionExpired,

    #[error(transparent)]
    Remote(#[from] AdminError),
}

impl From<AuthError> for AdminError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::UnknownUser
            | AuthError::AccountInactive => AdminError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::SessionExpired => AdminError::Unauthenticated,
            AuthError::Remote(inner) => inner,
        }
    }
}

/// Denial returned by every guarded action. The display text is the
/// message shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("you must sign in to perform this action")]
    Unauthenticated,

    #[error("you do not have permission to perform this action (requires {})", join(.required))]
    Forbidden { required: Vec<PermissionToken> },
}

fn join(tokens: &[PermissionToken]) -> String {
    tokens
        .iter()
        .map(PermissionToken::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

impl From<AuthorizationError> for AdminError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Unauthenticated => AdminError::Unauthenticated,
            AuthorizationError::Forbidden { required } => AdminError::Forbidden {
                permission: join(&required),
            },
        }
    }
}
