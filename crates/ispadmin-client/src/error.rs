use ispadmin_core::error::AdminError;
use reqwest::StatusCode;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{path} returned HTTP {status}: {body}")]
    Status {
        status: StatusCode,
        path: String,
        body: String,
    },

    #[error("failed to decode response from {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl From<ClientError> for AdminError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, path, body } => match status {
                StatusCode::UNAUTHORIZED => AdminError::Unauthenticated,
                StatusCode::FORBIDDEN => AdminError::Forbidden {
                    permission: if body.is_empty() { path } else { body },
                },
                StatusCode::NOT_FOUND => AdminError::NotFound {
                    entity: "resource".into(),
                    id: path,
                },
                StatusCode::CONFLICT => AdminError::AlreadyExists {
                    entity: if body.is_empty() { path } else { body },
                },
                _ => AdminError::RemoteFailure(format!("{path} returned HTTP {status}: {body}")),
            },
            ClientError::InvalidConfig(msg) => AdminError::Internal(msg),
            other => AdminError::RemoteFailure(other.to_string()),
        }
    }
}
