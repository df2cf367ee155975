//! Route access guard.
//!
//! Each navigation attempt is evaluated against the route's required
//! permissions (OR semantics). A denied navigation never just fails: the
//! guard redirects to the first route the identity can open, or ends the
//! session and sends the user to login when there is none.

use ispadmin_core::evaluator;
use ispadmin_core::models::permission::{PermissionSet, PermissionToken};
use tracing::{debug, info, warn};

use crate::session::SessionStore;

/// A protected (or public) view of the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub path: String,
    /// Any one of these grants access. Empty means public.
    pub required: Vec<PermissionToken>,
}

impl Route {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        required: impl IntoIterator<Item = PermissionToken>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            required: required.into_iter().collect(),
        }
    }

    pub fn public(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, path, Vec::new())
    }

    pub fn is_public(&self) -> bool {
        self.required.is_empty()
    }

    pub fn is_accessible(&self, permissions: &PermissionSet) -> bool {
        self.is_public() || evaluator::has_any_permission(permissions, &self.required)
    }
}

/// Ordered route registry. Order decides which route is the fallback.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn find(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path)
    }

    /// First route, in table order, that the identity reaches through a
    /// permission it actually holds. Public routes are not candidates.
    pub fn first_available(&self, permissions: &PermissionSet) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| !r.is_public() && evaluator::has_any_permission(permissions, &r.required))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allowed,
    Denied,
}

/// Outcome of a navigation attempt after the guard has acted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allowed { path: String },
    /// Access denied; the user lands on `to` instead.
    Redirected { from: String, to: String },
    /// Access denied and nothing else is reachable; the session was ended.
    LoginRequired { from: String, login_path: String },
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    table: RouteTable,
    session: SessionStore,
    login_path: String,
}

impl RouteGuard {
    pub fn new(table: RouteTable, session: SessionStore) -> Self {
        Self {
            table,
            session,
            login_path: "/login".into(),
        }
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Pure decision for `path` against the current session. Unknown
    /// paths are denied.
    pub fn decide(&self, path: &str) -> RouteDecision {
        let state = self.session.state();
        match self.table.find(path) {
            Some(route) if route.is_accessible(state.permissions()) => RouteDecision::Allowed,
            _ => RouteDecision::Denied,
        }
    }

    /// Evaluate a navigation and apply the denial policy.
    pub fn navigate(&self, path: &str) -> Navigation {
        if self.decide(path) == RouteDecision::Allowed {
            debug!(path, "Navigation allowed");
            return Navigation::Allowed {
                path: path.to_string(),
            };
        }

        let state = self.session.state();
        if let Some(fallback) = self.table.first_available(state.permissions()) {
            warn!(from = path, to = %fallback.path, "Navigation denied, redirecting");
            return Navigation::Redirected {
                from: path.to_string(),
                to: fallback.path.clone(),
            };
        }

        if state.is_authenticated() {
            info!(
                from = path,
                "No reachable route for this identity, ending session"
            );
        }
        self.session.clear_identity();
        Navigation::LoginRequired {
            from: path.to_string(),
            login_path: self.login_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use ispadmin_core::models::identity::{Identity, IdentityId};
    use ispadmin_core::models::permission::tokens;

    use super::*;

    fn table() -> RouteTable {
        RouteTable::new(vec![
            Route::public("perfil", "/perfil"),
            Route::new("usuarios", "/usuarios", [tokens::USERS_READ]),
            Route::new(
                "bitacora",
                "/bitacora",
                [tokens::AUDIT_READ, tokens::AUDIT_EXPORT],
            ),
            Route::new("permisos", "/permisos", [tokens::PERMISSIONS_READ]),
        ])
    }

    fn guard_with(perms: Option<&[&str]>) -> RouteGuard {
        let store = SessionStore::default();
        if let Some(perms) = perms {
            store.set_session(
                "tok".into(),
                Identity {
                    id: IdentityId(1),
                    display_name: "Luis".into(),
                    role_label: "Cajero".into(),
                    permissions: PermissionSet::parse_all(perms).unwrap(),
                },
            );
        }
        RouteGuard::new(table(), store)
    }

    #[test]
    fn public_route_allowed_without_identity() {
        let guard = guard_with(None);
        assert_eq!(guard.decide("/perfil"), RouteDecision::Allowed);
        assert_eq!(
            guard.navigate("/perfil"),
            Navigation::Allowed {
                path: "/perfil".into()
            }
        );
    }

    #[test]
    fn any_required_permission_suffices() {
        let guard = guard_with(Some(&["bitacora.exportar"]));
        assert_eq!(guard.decide("/bitacora"), RouteDecision::Allowed);
    }

    #[test]
    fn denied_navigation_redirects_to_first_available() {
        let guard = guard_with(Some(&["permisos.leer", "bitacora.leer"]));
        assert_eq!(
            guard.navigate("/usuarios"),
            Navigation::Redirected {
                from: "/usuarios".into(),
                to: "/bitacora".into()
            }
        );
        assert!(guard.session.is_authenticated());
    }

    #[test]
    fn no_fallback_ends_session() {
        let guard = guard_with(Some(&["tarifas.leer"]));
        assert_eq!(
            guard.navigate("/usuarios"),
            Navigation::LoginRequired {
                from: "/usuarios".into(),
                login_path: "/login".into()
            }
        );
        assert!(!guard.session.is_authenticated());
    }

    #[test]
    fn unknown_path_is_denied() {
        let guard = guard_with(Some(&["usuarios.leer"]));
        assert_eq!(guard.decide("/nope"), RouteDecision::Denied);
        assert_eq!(
            guard.navigate("/nope"),
            Navigation::Redirected {
                from: "/nope".into(),
                to: "/usuarios".into()
            }
        );
    }

    #[test]
    fn decision_tracks_identity_changes() {
        let guard = guard_with(Some(&["usuarios.leer"]));
        assert_eq!(guard.decide("/usuarios"), RouteDecision::Allowed);

        guard.session.clear_identity();
        assert_eq!(guard.decide("/usuarios"), RouteDecision::Denied);
    }
}
