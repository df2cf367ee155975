//! Pure permission decisions over a [`PermissionSet`].
//!
//! No side effects and no I/O. Empty token lists have fixed semantics:
//! `has_all_permissions(p, [])` is `true` (vacuous truth) and
//! `has_any_permission(p, [])` is `false`.

use crate::models::permission::{PermissionSet, PermissionToken};

/// Exact membership test.
pub fn has_permission(permissions: &PermissionSet, token: &PermissionToken) -> bool {
    permissions.contains(token)
}

/// `true` iff at least one of `tokens` is held.
pub fn has_any_permission(permissions: &PermissionSet, tokens: &[PermissionToken]) -> bool {
    tokens.iter().any(|t| permissions.contains(t))
}

/// `true` iff every one of `tokens` is held.
pub fn has_all_permissions(permissions: &PermissionSet, tokens: &[PermissionToken]) -> bool {
    tokens.iter().all(|t| permissions.contains(t))
}
