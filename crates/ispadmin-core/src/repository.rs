//! Collaborator trait definitions for remote data access and session
//! persistence.
//!
//! All remote operations are async; each call is a suspension point of the
//! console. Session persistence is a synchronous key-value store.

use crate::error::AdminResult;
use crate::models::{
    audit::{AuditCriteria, AuditFilter, AuditPage, AuditStatistics, PurgeOutcome},
    identity::{Identity, IdentityId, LoginResponse},
    permission::{
        AssignmentId, CreatePermission, PermissionAssignment, PermissionCatalogEntry,
        PermissionId, UpdatePermission,
    },
};

/// Offset pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

impl Pagination {
    /// Pagination for the 1-based `page`: `offset = (page - 1) * limit`.
    pub fn page(page: u64, limit: u64) -> Self {
        Self {
            offset: page.saturating_sub(1) * limit,
            limit,
        }
    }

    /// The 1-based page this offset falls on.
    pub fn page_number(&self) -> u64 {
        if self.limit == 0 {
            1
        } else {
            self.offset / self.limit + 1
        }
    }
}

/// `ceil(total / limit)`; zero when there is nothing to page through.
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        0
    } else {
        total.div_ceil(limit)
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

pub trait AuthGateway: Send + Sync {
    /// Fails with `AuthenticationFailed`/`Unauthenticated` (bad
    /// credentials), `NotFound` (unknown user) or `Forbidden` (inactive
    /// account).
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = AdminResult<LoginResponse>> + Send;

    /// Fails with `Unauthenticated` if the token is invalid or expired.
    fn verify_session(&self, token: &str) -> impl Future<Output = AdminResult<Identity>> + Send;
}

// ---------------------------------------------------------------------------
// Permission catalog & assignments
// ---------------------------------------------------------------------------

pub trait PermissionCatalogRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = AdminResult<PermissionCatalogEntry>> + Send;
    fn get_by_id(
        &self,
        id: PermissionId,
    ) -> impl Future<Output = AdminResult<PermissionCatalogEntry>> + Send;
    fn update(
        &self,
        id: PermissionId,
        input: UpdatePermission,
    ) -> impl Future<Output = AdminResult<PermissionCatalogEntry>> + Send;
    fn delete(&self, id: PermissionId) -> impl Future<Output = AdminResult<()>> + Send;
    fn list(&self) -> impl Future<Output = AdminResult<Vec<PermissionCatalogEntry>>> + Send;

    /// Grant a catalog permission to an identity.
    fn assign(
        &self,
        identity_id: IdentityId,
        permission_id: PermissionId,
    ) -> impl Future<Output = AdminResult<PermissionAssignment>> + Send;

    /// Remove one assignment by its own id.
    fn revoke(&self, assignment_id: AssignmentId) -> impl Future<Output = AdminResult<()>> + Send;

    /// Remove the assignment of `permission_id` to `identity_id`.
    fn revoke_for_identity(
        &self,
        identity_id: IdentityId,
        permission_id: PermissionId,
    ) -> impl Future<Output = AdminResult<()>> + Send;

    fn list_by_identity(
        &self,
        identity_id: IdentityId,
    ) -> impl Future<Output = AdminResult<Vec<PermissionAssignment>>> + Send;

    fn list_identities_by_permission(
        &self,
        permission_id: PermissionId,
    ) -> impl Future<Output = AdminResult<Vec<IdentityId>>> + Send;
}

// ---------------------------------------------------------------------------
// Audit (read-only from the console's point of view)
// ---------------------------------------------------------------------------

pub trait AuditLogRepository: Send + Sync {
    fn query(&self, filter: AuditFilter) -> impl Future<Output = AdminResult<AuditPage>> + Send;
    fn list_modules(&self) -> impl Future<Output = AdminResult<Vec<String>>> + Send;
    fn list_actions(&self) -> impl Future<Output = AdminResult<Vec<String>>> + Send;
    /// Full matching set as an opaque spreadsheet payload.
    fn export(&self, criteria: AuditCriteria)
    -> impl Future<Output = AdminResult<Vec<u8>>> + Send;
    fn statistics(
        &self,
        criteria: AuditCriteria,
    ) -> impl Future<Output = AdminResult<AuditStatistics>> + Send;
    fn purge_older_than(&self, days: u32)
    -> impl Future<Output = AdminResult<PurgeOutcome>> + Send;
}

// ---------------------------------------------------------------------------
// Session persistence (survives reloads)
// ---------------------------------------------------------------------------

pub trait SessionPersistence: Send + Sync {
    fn get(&self, key: &str) -> AdminResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AdminResult<()>;
    /// Remove every key this store holds.
    fn clear(&self) -> AdminResult<()>;
}
