//! ISP Admin Auth: session state, login/restore/logout, and the
//! permission guards every view and privileged action goes through.

pub mod action;
pub mod admin;
pub mod config;
pub mod error;
pub mod persistence;
pub mod render;
pub mod route;
pub mod service;
pub mod session;

pub use action::ActionGuard;
pub use admin::{PermissionAdmin, ToggleOutcome};
pub use config::SessionConfig;
pub use error::{AuthError, AuthorizationError};
pub use persistence::MemorySessionPersistence;
pub use render::{GateTransition, RenderGate};
pub use route::{Navigation, Route, RouteDecision, RouteGuard, RouteTable};
pub use service::AuthService;
pub use session::{SessionState, SessionStore};
