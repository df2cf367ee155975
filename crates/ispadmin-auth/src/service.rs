//! Authentication service: login, session restore and logout
//! orchestration.

use std::sync::Arc;

use ispadmin_core::error::AdminError;
use ispadmin_core::models::identity::Identity;
use ispadmin_core::repository::AuthGateway;
use tracing::{info, warn};

use crate::error::AuthError;
use crate::session::SessionStore;

/// Authentication service.
///
/// Generic over the gateway implementation so that the auth layer has no
/// dependency on the transport crate.
pub struct AuthService<G: AuthGateway> {
    gateway: G,
    session: SessionStore,
}

impl<G: AuthGateway> AuthService<G> {
    pub fn new(gateway: G, session: SessionStore) -> Self {
        Self { gateway, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Authenticate with username + password and install the session.
    ///
    /// On failure the previous session (if any) is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<Arc<Identity>, AuthError> {
        let response = self
            .gateway
            .login(username, password)
            .await
            .map_err(|e| match e {
                AdminError::Unauthenticated | AdminError::AuthenticationFailed { .. } => {
                    AuthError::InvalidCredentials
                }
                AdminError::NotFound { .. } => AuthError::UnknownUser,
                AdminError::Forbidden { .. } => AuthError::AccountInactive,
                other => AuthError::Remote(other),
            })
            .inspect_err(|e| warn!(username, error = %e, "Login failed"))?;

        info!(username, identity_id = %response.identity.id, "Login succeeded");
        self.session.set_session(response.token, response.identity);
        self.session
            .identity()
            .ok_or_else(|| AuthError::Remote(AdminError::Internal("session vanished".into())))
    }

    /// Re-establish a session from persisted state after a reload.
    ///
    /// The persisted token is verified with the backend and the verified
    /// identity replaces the snapshot. Any failure clears the session.
    /// Returns `Ok(None)` when there was nothing to restore.
    pub async fn restore_session(&self) -> Result<Option<Arc<Identity>>, AuthError> {
        let Some(persisted) = self.session.restore_snapshot() else {
            self.session.clear_identity();
            return Ok(None);
        };

        match self.gateway.verify_session(&persisted.token).await {
            Ok(identity) => {
                if let Some(snapshot) = &persisted.identity {
                    if snapshot.permissions != identity.permissions {
                        info!(
                            identity_id = %identity.id,
                            "Permissions changed since the session was saved"
                        );
                    }
                }
                self.session.set_session(persisted.token, identity);
                Ok(self.session.identity())
            }
            Err(e) => {
                warn!(error = %e, "Session verification failed, clearing session");
                self.session.clear_identity();
                Err(match e {
                    AdminError::Unauthenticated | AdminError::AuthenticationFailed { .. } => {
                        AuthError::SessionExpired
                    }
                    other => AuthError::Remote(other),
                })
            }
        }
    }

    /// End the session and wipe persisted state.
    pub fn logout(&self) {
        if let Some(identity) = self.session.identity() {
            info!(identity_id = %identity.id, "Logout");
        }
        self.session.clear_identity();
    }
}
