//! HTTP backend for the console's remote collaborators.
//!
//! One `reqwest::Client` serves authentication, the permission catalog and
//! the audit trail. When attached to a [`SessionStore`], every request
//! carries the current session token as a bearer credential, read at send
//! time.

use ispadmin_auth::SessionStore;
use ispadmin_core::error::AdminResult;
use ispadmin_core::models::audit::{
    AuditCriteria, AuditFilter, AuditPage, AuditStatistics, PurgeOutcome,
};
use ispadmin_core::models::identity::{Identity, IdentityId, LoginResponse};
use ispadmin_core::models::permission::{
    AssignmentId, CreatePermission, PermissionAssignment, PermissionCatalogEntry, PermissionId,
    UpdatePermission,
};
use ispadmin_core::repository::{AuditLogRepository, AuthGateway, PermissionCatalogRepository};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct AssignRequest {
    identity_id: IdentityId,
    permission_id: PermissionId,
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    http_client: Client,
    session: Option<SessionStore>,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(&config.base_url, http_client))
    }

    /// Use a pre-built `reqwest::Client` (tests, custom TLS).
    pub fn with_http_client(base_url: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            session: None,
        }
    }

    /// Authenticate requests with the token held by `session`.
    pub fn with_session(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Request plumbing ─────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "Backend request");
        let builder = self
            .http_client
            .request(method, format!("{}{path}", self.base_url));
        match self.session.as_ref().and_then(SessionStore::token) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> ClientResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(path, status = status.as_u16(), "Backend returned an error");
        Err(ClientError::Status {
            status,
            path: path.to_string(),
            body,
        })
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder, path: &str) -> ClientResult<T> {
        let response = self.send(builder, path).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.json(self.request(Method::GET, path), path).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let mut builder = self.request(Method::GET, path);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        self.json(builder, path).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.json(self.request(Method::POST, path).json(body), path)
            .await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.json(self.request(Method::PUT, path).json(body), path)
            .await
    }

    async fn delete_path(&self, path: &str) -> ClientResult<()> {
        self.send(self.request(Method::DELETE, path), path).await?;
        Ok(())
    }
}

impl AuthGateway for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> AdminResult<LoginResponse> {
        let body = LoginRequest { username, password };
        Ok(self.post("/auth/login", &body).await?)
    }

    async fn verify_session(&self, token: &str) -> AdminResult<Identity> {
        let builder = self
            .http_client
            .get(format!("{}/auth/verify", self.base_url))
            .bearer_auth(token);
        Ok(self.json(builder, "/auth/verify").await?)
    }
}

impl PermissionCatalogRepository for HttpBackend {
    async fn create(&self, input: CreatePermission) -> AdminResult<PermissionCatalogEntry> {
        Ok(self.post("/permisos", &input).await?)
    }

    async fn get_by_id(&self, id: PermissionId) -> AdminResult<PermissionCatalogEntry> {
        Ok(self.get(&format!("/permisos/{id}")).await?)
    }

    async fn update(
        &self,
        id: PermissionId,
        input: UpdatePermission,
    ) -> AdminResult<PermissionCatalogEntry> {
        Ok(self.put(&format!("/permisos/{id}"), &input).await?)
    }

    async fn delete(&self, id: PermissionId) -> AdminResult<()> {
        Ok(self.delete_path(&format!("/permisos/{id}")).await?)
    }

    async fn list(&self) -> AdminResult<Vec<PermissionCatalogEntry>> {
        Ok(self.get("/permisos").await?)
    }

    async fn assign(
        &self,
        identity_id: IdentityId,
        permission_id: PermissionId,
    ) -> AdminResult<PermissionAssignment> {
        let body = AssignRequest {
            identity_id,
            permission_id,
        };
        Ok(self.post("/permisos/asignar", &body).await?)
    }

    async fn revoke(&self, assignment_id: AssignmentId) -> AdminResult<()> {
        Ok(self.delete_path(&format!("/permisos/asignaciones/{assignment_id}")).await?)
    }

    async fn revoke_for_identity(
        &self,
        identity_id: IdentityId,
        permission_id: PermissionId,
    ) -> AdminResult<()> {
        let path = format!("/permisos/usuario/{identity_id}/permiso/{permission_id}");
        Ok(self.delete_path(&path).await?)
    }

    async fn list_by_identity(
        &self,
        identity_id: IdentityId,
    ) -> AdminResult<Vec<PermissionAssignment>> {
        Ok(self.get(&format!("/permisos/usuario/{identity_id}")).await?)
    }

    async fn list_identities_by_permission(
        &self,
        permission_id: PermissionId,
    ) -> AdminResult<Vec<IdentityId>> {
        Ok(self.get(&format!("/permisos/{permission_id}/usuarios")).await?)
    }
}

impl AuditLogRepository for HttpBackend {
    async fn query(&self, filter: AuditFilter) -> AdminResult<AuditPage> {
        Ok(self
            .get_with_query("/bitacora", &filter.query_pairs())
            .await?)
    }

    async fn list_modules(&self) -> AdminResult<Vec<String>> {
        Ok(self.get("/bitacora/modulos").await?)
    }

    async fn list_actions(&self) -> AdminResult<Vec<String>> {
        Ok(self.get("/bitacora/acciones").await?)
    }

    async fn export(&self, criteria: AuditCriteria) -> AdminResult<Vec<u8>> {
        let path = "/bitacora/exportar";
        let query = criteria.query_pairs();
        let mut builder = self.request(Method::GET, path);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        let response = self.send(builder, path).await?;
        let bytes = response.bytes().await.map_err(ClientError::from)?;
        Ok(bytes.to_vec())
    }

    async fn statistics(&self, criteria: AuditCriteria) -> AdminResult<AuditStatistics> {
        Ok(self
            .get_with_query("/bitacora/estadisticas", &criteria.query_pairs())
            .await?)
    }

    async fn purge_older_than(&self, days: u32) -> AdminResult<PurgeOutcome> {
        let path = "/bitacora/limpiar";
        let builder = self
            .request(Method::DELETE, path)
            .query(&[("dias", days.to_string())]);
        Ok(self.json(builder, path).await?)
    }
}
