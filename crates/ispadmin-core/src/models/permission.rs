//! Permission domain model.
//!
//! Permissions are namespaced `<resource>.<action>` tokens such as
//! `usuarios.leer` or `bitacora.exportar`. A [`PermissionToken`] can only
//! be built from a well-formed string, so typos surface at construction
//! instead of as a silently failing membership check.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::identity::IdentityId;
use crate::error::{AdminError, AdminResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionToken(Cow<'static, str>);

impl PermissionToken {
    /// Build a token from a string literal without validation.
    ///
    /// Only for compile-time constants; every constant in [`tokens`] is
    /// checked by a unit test.
    pub const fn from_static(raw: &'static str) -> Self {
        Self(Cow::Borrowed(raw))
    }

    /// Parse and validate a `<resource>.<action>` token.
    pub fn parse(raw: &str) -> AdminResult<Self> {
        let invalid = |reason: &str| AdminError::InvalidPermission {
            token: raw.to_string(),
            reason: reason.to_string(),
        };

        let (resource, action) = raw
            .split_once('.')
            .ok_or_else(|| invalid("expected `<resource>.<action>`"))?;
        if resource.is_empty() || action.is_empty() {
            return Err(invalid("resource and action must be non-empty"));
        }
        if action.contains('.') {
            return Err(invalid("exactly one `.` separator is allowed"));
        }
        if !is_valid_segment(resource) || !is_valid_segment(action) {
            return Err(invalid(
                "only lowercase ASCII letters, digits and `_` are allowed",
            ));
        }

        Ok(Self(Cow::Owned(raw.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace part (`usuarios` in `usuarios.leer`).
    pub fn resource(&self) -> &str {
        self.as_str()
            .split_once('.')
            .map_or(self.as_str(), |(r, _)| r)
    }

    /// The action part (`leer` in `usuarios.leer`).
    pub fn action(&self) -> &str {
        self.as_str().split_once('.').map_or("", |(_, a)| a)
    }
}

fn is_valid_segment(segment: &str) -> bool {
    segment
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

impl fmt::Display for PermissionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PermissionToken {
    type Error = AdminError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PermissionToken> for String {
    fn from(token: PermissionToken) -> Self {
        token.0.into_owned()
    }
}

impl std::str::FromStr for PermissionToken {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Tokens the console itself checks before privileged operations.
pub mod tokens {
    use super::PermissionToken;

    pub const AUDIT_READ: PermissionToken = PermissionToken::from_static("bitacora.leer");
    pub const AUDIT_EXPORT: PermissionToken = PermissionToken::from_static("bitacora.exportar");
    pub const AUDIT_STATISTICS: PermissionToken =
        PermissionToken::from_static("bitacora.estadisticas");
    pub const AUDIT_PURGE: PermissionToken = PermissionToken::from_static("bitacora.eliminar");

    pub const PERMISSIONS_READ: PermissionToken = PermissionToken::from_static("permisos.leer");
    pub const PERMISSIONS_CREATE: PermissionToken = PermissionToken::from_static("permisos.crear");
    pub const PERMISSIONS_UPDATE: PermissionToken =
        PermissionToken::from_static("permisos.editar");
    pub const PERMISSIONS_DELETE: PermissionToken =
        PermissionToken::from_static("permisos.eliminar");
    pub const PERMISSIONS_ASSIGN: PermissionToken =
        PermissionToken::from_static("permisos.asignar");
    pub const PERMISSIONS_REVOKE: PermissionToken =
        PermissionToken::from_static("permisos.revocar");

    pub const USERS_READ: PermissionToken = PermissionToken::from_static("usuarios.leer");

    /// Every constant above, for catalog seeding and validation.
    pub const ALL: &[PermissionToken] = &[
        AUDIT_READ,
        AUDIT_EXPORT,
        AUDIT_STATISTICS,
        AUDIT_PURGE,
        PERMISSIONS_READ,
        PERMISSIONS_CREATE,
        PERMISSIONS_UPDATE,
        PERMISSIONS_DELETE,
        PERMISSIONS_ASSIGN,
        PERMISSIONS_REVOKE,
        USERS_READ,
    ];
}

/// The permission set held by an identity. Order is irrelevant and each
/// token appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<PermissionToken>);

impl PermissionSet {
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, token: &PermissionToken) -> bool {
        self.0.contains(token)
    }

    /// Returns `false` if the token was already present.
    pub fn insert(&mut self, token: PermissionToken) -> bool {
        self.0.insert(token)
    }

    pub fn remove(&mut self, token: &PermissionToken) -> bool {
        self.0.remove(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PermissionToken> {
        self.0.iter()
    }

    /// Parse every raw string into a token, failing on the first invalid one.
    pub fn parse_all<I, S>(raw: I) -> AdminResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter()
            .map(|s| PermissionToken::parse(s.as_ref()))
            .collect()
    }
}

impl FromIterator<PermissionToken> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = PermissionToken>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a PermissionToken;
    type IntoIter = std::collections::btree_set::Iter<'a, PermissionToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(pub i64);

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(pub i64);

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, described capability managed by privileged users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCatalogEntry {
    pub id: PermissionId,
    /// The token this entry grants (e.g., `usuarios.leer`).
    pub name: String,
    pub description: String,
}

impl PermissionCatalogEntry {
    pub fn token(&self) -> AdminResult<PermissionToken> {
        PermissionToken::parse(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub name: PermissionToken,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePermission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<PermissionToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Grants one identity one catalog permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionAssignment {
    pub id: AssignmentId,
    pub identity_id: IdentityId,
    pub permission_id: PermissionId,
}

/// The set of tokens that exist in the permission catalog.
///
/// Loaded once after login; used to reject well-formed tokens that do not
/// name a real catalog entry.
#[derive(Debug, Clone, Default)]
pub struct KnownPermissions(BTreeSet<PermissionToken>);

impl KnownPermissions {
    /// Tokens of every well-formed entry. Entries whose name is not a
    /// valid token are left out.
    pub fn from_catalog(entries: &[PermissionCatalogEntry]) -> Self {
        Self(entries.iter().filter_map(|e| e.token().ok()).collect())
    }

    pub fn contains(&self, token: &PermissionToken) -> bool {
        self.0.contains(token)
    }

    pub fn insert(&mut self, token: PermissionToken) -> bool {
        self.0.insert(token)
    }

    pub fn remove(&mut self, token: &PermissionToken) -> bool {
        self.0.remove(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse `raw` and confirm the catalog knows it.
    pub fn validate(&self, raw: &str) -> AdminResult<PermissionToken> {
        let token = PermissionToken::parse(raw)?;
        if !self.contains(&token) {
            return Err(AdminError::InvalidPermission {
                token: raw.to_string(),
                reason: "not present in the permission catalog".into(),
            });
        }
        Ok(token)
    }
}
