//! ISP Admin Core: shared domain types for the administrative console.
//!
//! This crate provides:
//! - The error taxonomy every other crate converts into ([`error::AdminError`])
//! - Domain models for identities, permissions and audit entries ([`models`])
//! - Pure permission evaluation ([`evaluator`])
//! - Collaborator traits for the remote backend and session persistence
//!   ([`repository`])

pub mod error;
pub mod evaluator;
pub mod models;
pub mod repository;

pub use error::{AdminError, AdminResult};
pub use models::permission::{KnownPermissions, PermissionSet, PermissionToken};
