//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use ispadmin_core::error::{AdminError, AdminResult};
use ispadmin_core::models::identity::{Identity, IdentityId, LoginResponse};
use ispadmin_core::models::permission::{
    AssignmentId, CreatePermission, PermissionAssignment, PermissionCatalogEntry, PermissionId,
    PermissionSet, UpdatePermission,
};
use ispadmin_core::repository::{AuthGateway, PermissionCatalogRepository};

pub fn identity(id: i64, perms: &[&str]) -> Identity {
    Identity {
        id: IdentityId(id),
        display_name: format!("user-{id}"),
        role_label: "Administrador".into(),
        permissions: PermissionSet::parse_all(perms).unwrap(),
    }
}

// ---------------------------------------------------------------------------
// Auth gateway
// ---------------------------------------------------------------------------

pub struct FakeAccount {
    pub password: String,
    pub active: bool,
    pub identity: Identity,
}

#[derive(Default)]
pub struct FakeGateway {
    pub accounts: HashMap<String, FakeAccount>,
    /// token -> identity
    pub sessions: Mutex<HashMap<String, Identity>>,
    pub verify_failure: Option<AdminError>,
}

impl FakeGateway {
    pub fn with_account(mut self, username: &str, password: &str, identity: Identity) -> Self {
        self.accounts.insert(
            username.into(),
            FakeAccount {
                password: password.into(),
                active: true,
                identity,
            },
        );
        self
    }

    pub fn deactivate(mut self, username: &str) -> Self {
        if let Some(account) = self.accounts.get_mut(username) {
            account.active = false;
        }
        self
    }

    pub fn with_session(self, token: &str, identity: Identity) -> Self {
        self.sessions
            .lock()
            .unwrap()
            .insert(token.into(), identity);
        self
    }
}

impl AuthGateway for FakeGateway {
    async fn login(&self, username: &str, password: &str) -> AdminResult<LoginResponse> {
        let account = self.accounts.get(username).ok_or(AdminError::NotFound {
            entity: "usuario".into(),
            id: username.into(),
        })?;
        if account.password != password {
            return Err(AdminError::Unauthenticated);
        }
        if !account.active {
            return Err(AdminError::Forbidden {
                permission: "cuenta activa".into(),
            });
        }
        let token = format!("token-{username}");
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), account.identity.clone());
        Ok(LoginResponse {
            token,
            identity: account.identity.clone(),
        })
    }

    async fn verify_session(&self, token: &str) -> AdminResult<Identity> {
        if let Some(err) = &self.verify_failure {
            return Err(err.clone());
        }
        self.sessions
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AdminError::Unauthenticated)
    }
}

// ---------------------------------------------------------------------------
// Permission catalog
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct CatalogState {
    pub entries: Vec<PermissionCatalogEntry>,
    pub assignments: Vec<PermissionAssignment>,
    pub next_id: i64,
    /// Names of the remote operations invoked, in order.
    pub calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeCatalog {
    pub state: Mutex<CatalogState>,
}

impl FakeCatalog {
    pub fn seeded(names: &[&str]) -> Self {
        let catalog = Self::default();
        {
            let mut state = catalog.state.lock().unwrap();
            for name in names {
                state.next_id += 1;
                let id = PermissionId(state.next_id);
                state.entries.push(PermissionCatalogEntry {
                    id,
                    name: (*name).into(),
                    description: format!("Permiso {name}"),
                });
            }
        }
        catalog
    }

    pub fn with_assignment(self, identity: i64, permission: i64) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let id = AssignmentId(state.next_id);
            state.assignments.push(PermissionAssignment {
                id,
                identity_id: IdentityId(identity),
                permission_id: PermissionId(permission),
            });
        }
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("list") && !c.starts_with("get"))
            .collect()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl PermissionCatalogRepository for FakeCatalog {
    async fn create(&self, input: CreatePermission) -> AdminResult<PermissionCatalogEntry> {
        self.record(format!("create({})", input.name));
        let mut state = self.state.lock().unwrap();
        if state.entries.iter().any(|e| e.name == input.name.as_str()) {
            return Err(AdminError::AlreadyExists {
                entity: "permiso".into(),
            });
        }
        state.next_id += 1;
        let entry = PermissionCatalogEntry {
            id: PermissionId(state.next_id),
            name: input.name.to_string(),
            description: input.description,
        };
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn get_by_id(&self, id: PermissionId) -> AdminResult<PermissionCatalogEntry> {
        self.record(format!("get_by_id({id})"));
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(AdminError::NotFound {
                entity: "permiso".into(),
                id: id.to_string(),
            })
    }

    async fn update(
        &self,
        id: PermissionId,
        input: UpdatePermission,
    ) -> AdminResult<PermissionCatalogEntry> {
        self.record(format!("update({id})"));
        let mut state = self.state.lock().unwrap();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(AdminError::NotFound {
                entity: "permiso".into(),
                id: id.to_string(),
            })?;
        if let Some(name) = input.name {
            entry.name = name.to_string();
        }
        if let Some(description) = input.description {
            entry.description = description;
        }
        Ok(entry.clone())
    }

    async fn delete(&self, id: PermissionId) -> AdminResult<()> {
        self.record(format!("delete({id})"));
        let mut state = self.state.lock().unwrap();
        state.entries.retain(|e| e.id != id);
        state.assignments.retain(|a| a.permission_id != id);
        Ok(())
    }

    async fn list(&self) -> AdminResult<Vec<PermissionCatalogEntry>> {
        self.record("list".into());
        Ok(self.state.lock().unwrap().entries.clone())
    }

    async fn assign(
        &self,
        identity_id: IdentityId,
        permission_id: PermissionId,
    ) -> AdminResult<PermissionAssignment> {
        self.record(format!("assign({identity_id}, {permission_id})"));
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let assignment = PermissionAssignment {
            id: AssignmentId(state.next_id),
            identity_id,
            permission_id,
        };
        state.assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn revoke(&self, assignment_id: AssignmentId) -> AdminResult<()> {
        self.record(format!("revoke({assignment_id})"));
        self.state
            .lock()
            .unwrap()
            .assignments
            .retain(|a| a.id != assignment_id);
        Ok(())
    }

    async fn revoke_for_identity(
        &self,
        identity_id: IdentityId,
        permission_id: PermissionId,
    ) -> AdminResult<()> {
        self.record(format!("revoke_for_identity({identity_id}, {permission_id})"));
        self.state
            .lock()
            .unwrap()
            .assignments
            .retain(|a| !(a.identity_id == identity_id && a.permission_id == permission_id));
        Ok(())
    }

    async fn list_by_identity(
        &self,
        identity_id: IdentityId,
    ) -> AdminResult<Vec<PermissionAssignment>> {
        self.record(format!("list_by_identity({identity_id})"));
        Ok(self
            .state
            .lock()
            .unwrap()
            .assignments
            .iter()
            .filter(|a| a.identity_id == identity_id)
            .cloned()
            .collect())
    }

    async fn list_identities_by_permission(
        &self,
        permission_id: PermissionId,
    ) -> AdminResult<Vec<IdentityId>> {
        self.record(format!("list_identities_by_permission({permission_id})"));
        Ok(self
            .state
            .lock()
            .unwrap()
            .assignments
            .iter()
            .filter(|a| a.permission_id == permission_id)
            .map(|a| a.identity_id)
            .collect())
    }
}
