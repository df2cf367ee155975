//! Conditional render gate.
//!
//! Decides whether a UI fragment exists at all. The gate follows the
//! session: when a permission is granted or revoked mid-session, the next
//! [`RenderGate::changed`] yields a [`GateTransition`] and the host mounts
//! or unmounts the fragment without a reload. Revocation takes effect
//! immediately, even for a fragment that is already open.

use ispadmin_core::evaluator;
use ispadmin_core::models::permission::PermissionToken;
use tokio::sync::watch;
use tracing::debug;

use crate::session::{SessionState, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTransition {
    Mount,
    Unmount,
}

#[derive(Debug)]
pub struct RenderGate {
    required: Vec<PermissionToken>,
    session: watch::Receiver<SessionState>,
    mounted: bool,
}

impl RenderGate {
    /// Gate requiring any one of `required`.
    pub fn new(store: &SessionStore, required: impl IntoIterator<Item = PermissionToken>) -> Self {
        let mut session = store.subscribe();
        let required: Vec<PermissionToken> = required.into_iter().collect();
        let mounted =
            evaluator::has_any_permission(session.borrow_and_update().permissions(), &required);
        Self {
            required,
            session,
            mounted,
        }
    }

    /// Whether the fragment may exist right now. Always reflects the latest
    /// session state, even if [`RenderGate::changed`] has not been polled.
    pub fn is_mounted(&self) -> bool {
        evaluator::has_any_permission(self.session.borrow().permissions(), &self.required)
    }

    /// Build the fragment only when access holds.
    pub fn render<T>(&self, build: impl FnOnce() -> T) -> Option<T> {
        self.is_mounted().then(build)
    }

    /// Re-evaluate against the latest state and report a flip, if any.
    pub fn refresh(&mut self) -> Option<GateTransition> {
        let now = evaluator::has_any_permission(
            self.session.borrow_and_update().permissions(),
            &self.required,
        );
        if now == self.mounted {
            return None;
        }
        self.mounted = now;
        let transition = if now {
            GateTransition::Mount
        } else {
            GateTransition::Unmount
        };
        debug!(?transition, required = ?self.required, "Render gate flipped");
        Some(transition)
    }

    /// Wait for the next session change that flips this gate. Returns
    /// `None` once the session store is gone.
    pub async fn changed(&mut self) -> Option<GateTransition> {
        loop {
            self.session.changed().await.ok()?;
            if let Some(transition) = self.refresh() {
                return Some(transition);
            }
        }
    }
}
