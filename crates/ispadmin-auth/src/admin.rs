//! Permission administration: catalog maintenance and per-identity
//! assignment, every operation behind an [`ActionGuard`] check.
//!
//! [`PermissionAdmin::known`] follows every catalog write made through
//! this service: created and renamed tokens become valid, deleted and
//! renamed-away tokens stop being valid.

use std::collections::HashMap;

use ispadmin_core::error::{AdminError, AdminResult};
use ispadmin_core::models::identity::IdentityId;
use ispadmin_core::models::permission::{
    AssignmentId, CreatePermission, KnownPermissions, PermissionAssignment,
    PermissionCatalogEntry, PermissionId, PermissionToken, UpdatePermission, tokens,
};
use ispadmin_core::repository::PermissionCatalogRepository;
use tracing::{info, warn};

use crate::action::ActionGuard;

/// What a toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Assigned(PermissionAssignment),
    Revoked,
}

pub struct PermissionAdmin<C: PermissionCatalogRepository> {
    catalog: C,
    guard: ActionGuard,
    known: KnownPermissions,
    tokens_by_id: HashMap<PermissionId, PermissionToken>,
}

impl<C: PermissionCatalogRepository> PermissionAdmin<C> {
    pub fn new(catalog: C, guard: ActionGuard) -> Self {
        Self {
            catalog,
            guard,
            known: KnownPermissions::default(),
            tokens_by_id: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Tokens known from the last catalog load.
    pub fn known(&self) -> &KnownPermissions {
        &self.known
    }

    /// List the catalog and refresh [`PermissionAdmin::known`].
    pub async fn load_catalog(&mut self) -> AdminResult<Vec<PermissionCatalogEntry>> {
        self.guard.authorize(&tokens::PERMISSIONS_READ)?;
        let entries = self.catalog.list().await?;
        self.known = KnownPermissions::from_catalog(&entries);
        self.tokens_by_id.clear();
        for entry in &entries {
            match entry.token() {
                Ok(token) => {
                    self.tokens_by_id.insert(entry.id, token);
                }
                Err(e) => warn!(
                    permission_id = %entry.id,
                    name = %entry.name,
                    error = %e,
                    "Skipping malformed catalog entry"
                ),
            }
        }
        info!(
            count = entries.len(),
            known = self.known.len(),
            "Permission catalog loaded"
        );
        Ok(entries)
    }

    pub async fn get(&self, id: PermissionId) -> AdminResult<PermissionCatalogEntry> {
        self.guard.authorize(&tokens::PERMISSIONS_READ)?;
        self.catalog.get_by_id(id).await
    }

    pub async fn create(&mut self, input: CreatePermission) -> AdminResult<PermissionCatalogEntry> {
        self.guard.authorize(&tokens::PERMISSIONS_CREATE)?;
        let entry = self.catalog.create(input).await?;
        info!(permission_id = %entry.id, name = %entry.name, "Permission created");
        self.track(&entry);
        Ok(entry)
    }

    pub async fn update(
        &mut self,
        id: PermissionId,
        input: UpdatePermission,
    ) -> AdminResult<PermissionCatalogEntry> {
        self.guard.authorize(&tokens::PERMISSIONS_UPDATE)?;
        let entry = self.catalog.update(id, input).await?;
        info!(permission_id = %entry.id, "Permission updated");
        self.forget(entry.id);
        self.track(&entry);
        Ok(entry)
    }

    pub async fn delete(&mut self, id: PermissionId) -> AdminResult<()> {
        self.guard.authorize(&tokens::PERMISSIONS_DELETE)?;
        self.catalog.delete(id).await?;
        info!(permission_id = %id, "Permission deleted");
        self.forget(id);
        Ok(())
    }

    /// Current assignments of `identity_id`.
    pub async fn permissions_of(
        &self,
        identity_id: IdentityId,
    ) -> AdminResult<Vec<PermissionAssignment>> {
        self.guard.authorize(&tokens::PERMISSIONS_READ)?;
        self.catalog.list_by_identity(identity_id).await
    }

    /// Identities currently holding `permission_id`.
    pub async fn identities_with(&self, permission_id: PermissionId) -> AdminResult<Vec<IdentityId>> {
        self.guard.authorize(&tokens::PERMISSIONS_READ)?;
        self.catalog
            .list_identities_by_permission(permission_id)
            .await
    }

    /// Grant `permission_id` to `identity_id`. An existing assignment for
    /// the same pair is rejected without writing.
    pub async fn assign(
        &self,
        identity_id: IdentityId,
        permission_id: PermissionId,
    ) -> AdminResult<PermissionAssignment> {
        self.guard.authorize(&tokens::PERMISSIONS_ASSIGN)?;
        let current = self.catalog.list_by_identity(identity_id).await?;
        if current.iter().any(|a| a.permission_id == permission_id) {
            return Err(AdminError::AlreadyExists {
                entity: format!("assignment of permission {permission_id} to identity {identity_id}"),
            });
        }
        self.write_assign(identity_id, permission_id).await
    }

    /// Remove one assignment by its id.
    pub async fn revoke(&self, assignment_id: AssignmentId) -> AdminResult<()> {
        self.guard.authorize(&tokens::PERMISSIONS_REVOKE)?;
        self.catalog.revoke(assignment_id).await?;
        info!(assignment_id = %assignment_id, "Permission assignment revoked");
        Ok(())
    }

    /// Flip the assignment of `permission_id` for `identity_id`: assign if
    /// absent, revoke if present. Exactly one remote write per call.
    pub async fn toggle(
        &self,
        identity_id: IdentityId,
        permission_id: PermissionId,
    ) -> AdminResult<ToggleOutcome> {
        self.guard
            .authorize_any(&[tokens::PERMISSIONS_ASSIGN, tokens::PERMISSIONS_REVOKE])?;

        let current = self.catalog.list_by_identity(identity_id).await?;
        let assigned = current.iter().any(|a| a.permission_id == permission_id);

        if assigned {
            self.guard.authorize(&tokens::PERMISSIONS_REVOKE)?;
            self.catalog
                .revoke_for_identity(identity_id, permission_id)
                .await?;
            info!(
                identity_id = %identity_id,
                permission_id = %permission_id,
                "Permission revoked"
            );
            Ok(ToggleOutcome::Revoked)
        } else {
            self.guard.authorize(&tokens::PERMISSIONS_ASSIGN)?;
            self.write_assign(identity_id, permission_id)
                .await
                .map(ToggleOutcome::Assigned)
        }
    }

    async fn write_assign(
        &self,
        identity_id: IdentityId,
        permission_id: PermissionId,
    ) -> AdminResult<PermissionAssignment> {
        let assignment = self.catalog.assign(identity_id, permission_id).await?;
        info!(
            identity_id = %identity_id,
            permission_id = %permission_id,
            assignment_id = %assignment.id,
            "Permission assigned"
        );
        Ok(assignment)
    }

    fn track(&mut self, entry: &PermissionCatalogEntry) {
        match entry.token() {
            Ok(token) => {
                self.known.insert(token.clone());
                self.tokens_by_id.insert(entry.id, token);
            }
            Err(e) => warn!(
                permission_id = %entry.id,
                error = %e,
                "Backend returned a malformed permission name"
            ),
        }
    }

    fn forget(&mut self, id: PermissionId) {
        if let Some(token) = self.tokens_by_id.remove(&id) {
            self.known.remove(&token);
        }
    }
}
