//! Inline authorization for privileged actions.
//!
//! Every create, update, delete, export, assign, revoke and purge calls
//! [`ActionGuard`] immediately before touching a remote collaborator,
//! regardless of whether the surrounding view passed its route or render
//! gate. The check is synchronous and reads the session at call time.

use ispadmin_core::models::permission::PermissionToken;
use tracing::warn;

use crate::error::AuthorizationError;
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct ActionGuard {
    session: SessionStore,
}

impl ActionGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Require a single permission.
    pub fn authorize(&self, required: &PermissionToken) -> Result<(), AuthorizationError> {
        self.authorize_any(std::slice::from_ref(required))
    }

    /// Require at least one of `required`. An empty list is always denied.
    pub fn authorize_any(&self, required: &[PermissionToken]) -> Result<(), AuthorizationError> {
        let state = self.session.state();
        let Some(identity) = state.identity() else {
            warn!(required = ?tokens_str(required), "Action denied: no session");
            return Err(AuthorizationError::Unauthenticated);
        };
        if ispadmin_core::evaluator::has_any_permission(state.permissions(), required) {
            return Ok(());
        }
        warn!(
            identity_id = %identity.id,
            required = ?tokens_str(required),
            "Action denied: missing permission"
        );
        Err(AuthorizationError::Forbidden {
            required: required.to_vec(),
        })
    }

    /// Require every one of `required`.
    pub fn authorize_all(&self, required: &[PermissionToken]) -> Result<(), AuthorizationError> {
        let state = self.session.state();
        let Some(identity) = state.identity() else {
            warn!(required = ?tokens_str(required), "Action denied: no session");
            return Err(AuthorizationError::Unauthenticated);
        };
        let missing: Vec<PermissionToken> = required
            .iter()
            .filter(|t| !state.permissions().contains(t))
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        warn!(
            identity_id = %identity.id,
            missing = ?tokens_str(&missing),
            "Action denied: missing permissions"
        );
        Err(AuthorizationError::Forbidden { required: missing })
    }
}

fn tokens_str(tokens: &[PermissionToken]) -> Vec<&str> {
    tokens.iter().map(PermissionToken::as_str).collect()
}
