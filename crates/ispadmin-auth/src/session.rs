//! Session store: the single owner of the authenticated identity.
//!
//! Readers either pull the current state at decision time
//! ([`SessionStore::has_permission`] and friends) or subscribe to change
//! notifications ([`SessionStore::subscribe`]). Every identity change bumps
//! a generation counter so in-flight remote results computed under an
//! older identity can be recognized and discarded.

use std::sync::Arc;

use ispadmin_core::evaluator;
use ispadmin_core::models::identity::Identity;
use ispadmin_core::models::permission::{PermissionSet, PermissionToken};
use ispadmin_core::repository::SessionPersistence;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;

static NO_PERMISSIONS: PermissionSet = PermissionSet::new();

/// Point-in-time view of the session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    identity: Option<Arc<Identity>>,
    token: Option<String>,
    generation: u64,
}

impl SessionState {
    pub fn identity(&self) -> Option<&Arc<Identity>> {
        self.identity.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Held permissions, or the empty set when unauthenticated.
    pub fn permissions(&self) -> &PermissionSet {
        self.identity
            .as_ref()
            .map_or(&NO_PERMISSIONS, |identity| &identity.permissions)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// What [`SessionStore::restore_snapshot`] found in persistence.
#[derive(Debug, Clone)]
pub struct PersistedSession {
    pub token: String,
    /// `None` if no snapshot was stored or it could not be decoded.
    pub identity: Option<Identity>,
}

struct Inner {
    state: watch::Sender<SessionState>,
    persistence: Option<Arc<dyn SessionPersistence>>,
    config: SessionConfig,
}

/// Shared handle to the session. Cloning is cheap; all clones observe the
/// same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// A store without persistence (state is lost on reload).
    pub fn new(config: SessionConfig) -> Self {
        Self::build(config, None)
    }

    pub fn with_persistence(config: SessionConfig, persistence: Arc<dyn SessionPersistence>) -> Self {
        Self::build(config, Some(persistence))
    }

    fn build(config: SessionConfig, persistence: Option<Arc<dyn SessionPersistence>>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner {
                state,
                persistence,
                config,
            }),
        }
    }

    /// Replace the held identity, keeping the current token.
    pub fn set_identity(&self, identity: Identity) {
        let identity = Arc::new(identity);
        debug!(identity_id = %identity.id, "Replacing session identity");
        self.inner.state.send_modify(|state| {
            state.identity = Some(identity.clone());
            state.generation += 1;
        });
        self.persist_identity(&identity);
    }

    /// Install a freshly authenticated session (token + identity).
    pub fn set_session(&self, token: String, identity: Identity) {
        let identity = Arc::new(identity);
        info!(
            identity_id = %identity.id,
            permissions = identity.permissions.len(),
            "Session established"
        );
        self.persist_token(&token);
        self.inner.state.send_modify(|state| {
            state.identity = Some(identity.clone());
            state.token = Some(token);
            state.generation += 1;
        });
        self.persist_identity(&identity);
    }

    /// Drop the identity and token, and wipe persisted session state.
    pub fn clear_identity(&self) {
        let was_authenticated = self.is_authenticated();
        self.inner.state.send_modify(|state| {
            state.identity = None;
            state.token = None;
            state.generation += 1;
        });
        if let Some(persistence) = &self.inner.persistence {
            if let Err(e) = persistence.clear() {
                warn!(error = %e, "Failed to clear persisted session");
            }
        }
        if was_authenticated {
            info!("Session cleared");
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Arc<Identity>> {
        self.inner.state.borrow().identity.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    /// Held permissions, or the empty set when unauthenticated. Never fails.
    pub fn permissions(&self) -> PermissionSet {
        self.inner.state.borrow().permissions().clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.state.borrow().generation
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn has_permission(&self, token: &PermissionToken) -> bool {
        evaluator::has_permission(self.inner.state.borrow().permissions(), token)
    }

    pub fn has_any_permission(&self, tokens: &[PermissionToken]) -> bool {
        evaluator::has_any_permission(self.inner.state.borrow().permissions(), tokens)
    }

    pub fn has_all_permissions(&self, tokens: &[PermissionToken]) -> bool {
        evaluator::has_all_permissions(self.inner.state.borrow().permissions(), tokens)
    }

    /// Receiver notified on every identity change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Read the persisted token and identity snapshot without applying
    /// them. Returns `None` when no token was persisted.
    pub fn restore_snapshot(&self) -> Option<PersistedSession> {
        let persistence = self.inner.persistence.as_ref()?;
        let token = match persistence.get(&self.inner.config.token_key) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session token");
                return None;
            }
        };

        let identity = match persistence.get(&self.inner.config.identity_key) {
            Ok(Some(raw)) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    warn!(error = %e, "Discarding undecodable identity snapshot");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted identity snapshot");
                None
            }
        };

        Some(PersistedSession { token, identity })
    }

    fn persist_token(&self, token: &str) {
        if let Some(persistence) = &self.inner.persistence {
            if let Err(e) = persistence.set(&self.inner.config.token_key, token) {
                warn!(error = %e, "Failed to persist session token");
            }
        }
    }

    fn persist_identity(&self, identity: &Identity) {
        let Some(persistence) = &self.inner.persistence else {
            return;
        };
        let snapshot = match serde_json::to_string(identity) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Failed to encode identity snapshot");
                return;
            }
        };
        if let Err(e) = persistence.set(&self.inner.config.identity_key, &snapshot) {
            warn!(error = %e, "Failed to persist identity snapshot");
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SessionStore")
            .field("identity", &state.identity.as_ref().map(|i| i.id))
            .field("generation", &state.generation)
            .field("persistent", &self.inner.persistence.is_some())
            .finish()
    }
}
