//! In-memory audit trail shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use ispadmin_auth::{ActionGuard, SessionStore};
use ispadmin_core::error::{AdminError, AdminResult};
use ispadmin_core::models::audit::{
    AuditCriteria, AuditEntry, AuditEntryId, AuditFilter, AuditPage, AuditStatistics, CountByKey,
    PurgeOutcome,
};
use ispadmin_core::models::identity::{Identity, IdentityId};
use ispadmin_core::models::permission::PermissionSet;
use ispadmin_core::repository::AuditLogRepository;

pub fn identity(id: i64, perms: &[&str]) -> Identity {
    Identity {
        id: IdentityId(id),
        display_name: format!("user-{id}"),
        role_label: "Auditor".into(),
        permissions: PermissionSet::parse_all(perms).unwrap(),
    }
}

pub fn guard_with(perms: &[&str]) -> ActionGuard {
    let store = SessionStore::default();
    store.set_session("tok".into(), identity(7, perms));
    ActionGuard::new(store)
}

pub fn entry(id: i64, module: &str, action: &str, year: i32, month: u32, day: u32) -> AuditEntry {
    AuditEntry {
        id: AuditEntryId(id),
        actor_identity_id: IdentityId(1 + id % 3),
        actor_name: None,
        module: module.into(),
        action: action.into(),
        timestamp: Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap(),
        detail: Some(format!("registro {id}")),
    }
}

type Hook = Box<dyn FnOnce() + Send>;

#[derive(Default)]
pub struct AuditState {
    pub entries: Vec<AuditEntry>,
    pub calls: Vec<String>,
    pub failure: Option<AdminError>,
    pub export_payload: Vec<u8>,
    pub exported_with: Option<AuditCriteria>,
    /// Runs once, while the next `query` is "in flight".
    pub on_query: Option<Hook>,
    pub on_statistics: Option<Hook>,
}

#[derive(Clone, Default)]
pub struct FakeAuditLog {
    pub state: Arc<Mutex<AuditState>>,
}

impl FakeAuditLog {
    pub fn with_entries(entries: Vec<AuditEntry>) -> Self {
        let log = Self::default();
        log.state.lock().unwrap().entries = entries;
        log
    }

    /// `n` entries spread over January 2024, module `CLIENTES`.
    pub fn generated(n: i64) -> Self {
        Self::with_entries(
            (1..=n)
                .map(|i| entry(i, "CLIENTES", "CREAR", 2024, 1, 1 + (i % 28) as u32))
                .collect(),
        )
    }

    pub fn with_export_payload(self, payload: &[u8]) -> Self {
        self.state.lock().unwrap().export_payload = payload.to_vec();
        self
    }

    pub fn fail_with(&self, error: AdminError) {
        self.state.lock().unwrap().failure = Some(error);
    }

    pub fn recover(&self) {
        self.state.lock().unwrap().failure = None;
    }

    pub fn on_next_query(&self, hook: impl FnOnce() + Send + 'static) {
        self.state.lock().unwrap().on_query = Some(Box::new(hook));
    }

    pub fn on_next_statistics(&self, hook: impl FnOnce() + Send + 'static) {
        self.state.lock().unwrap().on_statistics = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn exported_with(&self) -> Option<AuditCriteria> {
        self.state.lock().unwrap().exported_with.clone()
    }

    fn begin(&self, call: String) -> AdminResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match &state.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn distinct(&self, key: impl Fn(&AuditEntry) -> &str) -> Vec<String> {
        let mut values: Vec<String> = self
            .state
            .lock()
            .unwrap()
            .entries
            .iter()
            .map(|e| key(e).to_string())
            .collect();
        values.sort();
        values.dedup();
        values
    }
}

fn counts(entries: &[&AuditEntry], key: impl Fn(&AuditEntry) -> &str) -> Vec<CountByKey> {
    let mut map = BTreeMap::<String, u64>::new();
    for entry in entries {
        *map.entry(key(entry).to_string()).or_default() += 1;
    }
    map.into_iter()
        .map(|(key, count)| CountByKey { key, count })
        .collect()
}

impl AuditLogRepository for FakeAuditLog {
    async fn query(&self, filter: AuditFilter) -> AdminResult<AuditPage> {
        let hook = self.state.lock().unwrap().on_query.take();
        if let Some(hook) = hook {
            hook();
        }
        self.begin(format!("query(limit={}, offset={})", filter.limit, filter.offset))?;

        let state = self.state.lock().unwrap();
        let matching: Vec<&AuditEntry> = state
            .entries
            .iter()
            .filter(|e| filter.criteria.matches(e))
            .collect();
        Ok(AuditPage {
            total: matching.len() as u64,
            entries: matching
                .into_iter()
                .skip(filter.offset as usize)
                .take(filter.limit as usize)
                .cloned()
                .collect(),
        })
    }

    async fn list_modules(&self) -> AdminResult<Vec<String>> {
        self.begin("list_modules".into())?;
        Ok(self.distinct(|e| e.module.as_str()))
    }

    async fn list_actions(&self) -> AdminResult<Vec<String>> {
        self.begin("list_actions".into())?;
        Ok(self.distinct(|e| e.action.as_str()))
    }

    async fn export(&self, criteria: AuditCriteria) -> AdminResult<Vec<u8>> {
        self.begin("export".into())?;
        let mut state = self.state.lock().unwrap();
        state.exported_with = Some(criteria);
        Ok(state.export_payload.clone())
    }

    async fn statistics(&self, criteria: AuditCriteria) -> AdminResult<AuditStatistics> {
        let hook = self.state.lock().unwrap().on_statistics.take();
        if let Some(hook) = hook {
            hook();
        }
        self.begin("statistics".into())?;
        let state = self.state.lock().unwrap();
        let matching: Vec<&AuditEntry> =
            state.entries.iter().filter(|e| criteria.matches(e)).collect();
        Ok(AuditStatistics {
            total_entries: matching.len() as u64,
            by_module: counts(&matching, |e| e.module.as_str()),
            by_action: counts(&matching, |e| e.action.as_str()),
        })
    }

    async fn purge_older_than(&self, days: u32) -> AdminResult<PurgeOutcome> {
        self.begin(format!("purge_older_than({days})"))?;
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        let mut state = self.state.lock().unwrap();
        let before = state.entries.len();
        state.entries.retain(|e| e.timestamp >= cutoff);
        Ok(PurgeOutcome {
            deleted_count: (before - state.entries.len()) as u64,
        })
    }
}
