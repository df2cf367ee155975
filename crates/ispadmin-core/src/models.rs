//! Domain models for the admin console.
//!
//! These are the core types shared across all crates.

pub mod audit;
pub mod identity;
pub mod permission;
