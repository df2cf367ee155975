//! Audit trail (bitácora) domain model.
//!
//! Entries are written by the backend as a side effect of privileged
//! actions. The console only reads, filters and exports them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::identity::IdentityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditEntryId(pub i64);

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    #[serde(rename = "usuario_id")]
    pub actor_identity_id: IdentityId,
    #[serde(rename = "usuario_nombre", default)]
    pub actor_name: Option<String>,
    #[serde(rename = "modulo")]
    pub module: String,
    #[serde(rename = "accion")]
    pub action: String,
    #[serde(rename = "fecha")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "detalle", default)]
    pub detail: Option<String>,
}

/// Optional constraints of an audit query. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCriteria {
    #[serde(rename = "usuario_id", skip_serializing_if = "Option::is_none")]
    pub actor_identity_id: Option<IdentityId>,
    #[serde(rename = "modulo", skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(rename = "accion", skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(rename = "fecha_inicio", skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(rename = "fecha_fin", skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(rename = "busqueda", skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
}

impl AuditCriteria {
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_actor(mut self, actor: IdentityId) -> Self {
        self.actor_identity_id = Some(actor);
        self
    }

    pub fn with_date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// Trim text fields and turn blank ones into `None`, so that an empty
    /// form input never reaches the backend as an empty-string constraint.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            actor_identity_id: self.actor_identity_id,
            module: clean(self.module),
            action: clean(self.action),
            date_from: self.date_from,
            date_to: self.date_to,
            search_text: clean(self.search_text),
        }
    }

    /// Query-string pairs for the constraints that are present.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(actor) = self.actor_identity_id {
            pairs.push(("usuario_id", actor.to_string()));
        }
        if let Some(module) = &self.module {
            pairs.push(("modulo", module.clone()));
        }
        if let Some(action) = &self.action {
            pairs.push(("accion", action.clone()));
        }
        if let Some(from) = self.date_from {
            pairs.push(("fecha_inicio", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.date_to {
            pairs.push(("fecha_fin", to.format("%Y-%m-%d").to_string()));
        }
        if let Some(text) = &self.search_text {
            pairs.push(("busqueda", text.clone()));
        }
        pairs
    }

    /// Whether `entry` satisfies every present constraint.
    ///
    /// Mirrors the backend's matching rules: exact module/action/actor,
    /// inclusive calendar-day range, case-insensitive substring search over
    /// detail, module and action.
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if self
            .actor_identity_id
            .is_some_and(|actor| actor != entry.actor_identity_id)
        {
            return false;
        }
        if self.module.as_ref().is_some_and(|m| *m != entry.module) {
            return false;
        }
        if self.action.as_ref().is_some_and(|a| *a != entry.action) {
            return false;
        }
        let day = entry.timestamp.date_naive();
        if self.date_from.is_some_and(|from| day < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| day > to) {
            return false;
        }
        if let Some(text) = &self.search_text {
            let needle = text.to_lowercase();
            let haystacks = [
                entry.detail.as_deref().unwrap_or_default(),
                entry.module.as_str(),
                entry.action.as_str(),
            ];
            if !haystacks
                .iter()
                .any(|h| h.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

/// Criteria plus offset pagination for one page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFilter {
    #[serde(flatten)]
    pub criteria: AuditCriteria,
    pub limit: u64,
    pub offset: u64,
}

impl AuditFilter {
    /// Filter for the 1-based `page` of size `limit`.
    pub fn for_page(criteria: AuditCriteria, page: u64, limit: u64) -> Self {
        Self {
            criteria,
            limit,
            offset: page.saturating_sub(1) * limit,
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.criteria.query_pairs();
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs
    }
}

/// One page of audit entries and the total number of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditPage {
    pub entries: Vec<AuditEntry>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountByKey {
    pub key: String,
    pub count: u64,
}

/// Aggregate counts for the audit dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStatistics {
    pub total_entries: u64,
    #[serde(default)]
    pub by_module: Vec<CountByKey>,
    #[serde(default)]
    pub by_action: Vec<CountByKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeOutcome {
    #[serde(rename = "eliminados")]
    pub deleted_count: u64,
}
