//! In-memory [`SessionPersistence`] implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use ispadmin_core::error::{AdminError, AdminResult};
use ispadmin_core::repository::SessionPersistence;

/// Process-local key-value store. State is lost on drop; useful for
/// embedding hosts without durable storage and for tests.
#[derive(Debug, Default)]
pub struct MemorySessionPersistence {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AdminResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| AdminError::Persistence("session storage lock poisoned".into()))
    }
}

impl SessionPersistence for MemorySessionPersistence {
    fn get(&self, key: &str) -> AdminResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AdminResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> AdminResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear() {
        let store = MemorySessionPersistence::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.clear().unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
