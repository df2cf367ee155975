//! Audit view configuration.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Entries per page (default: 50).
    pub page_size: u64,
    /// How long success/error notices stay visible, in milliseconds
    /// (default: 3000).
    pub notice_ttl_ms: u64,
    /// Export filename prefix (default: `bitacora`).
    pub export_file_prefix: String,
    /// Export filename extension, without the dot (default: `xlsx`).
    pub export_file_extension: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            notice_ttl_ms: 3_000,
            export_file_prefix: "bitacora".into(),
            export_file_extension: "xlsx".into(),
        }
    }
}

impl AuditConfig {
    pub fn notice_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.notice_ttl_ms)
    }
}
