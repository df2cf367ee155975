//! Transient user feedback.
//!
//! A notice disappears on its own once its time-to-live has elapsed; the
//! user never has to dismiss it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub expires_at: Instant,
}

/// Holds at most one notice; posting replaces the previous one.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    current: Arc<Mutex<Option<Notice>>>,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            ttl,
        }
    }

    pub fn post(&self, kind: NoticeKind, message: impl Into<String>) {
        let notice = Notice {
            kind,
            message: message.into(),
            expires_at: Instant::now() + self.ttl,
        };
        if let Ok(mut current) = self.current.lock() {
            *current = Some(notice);
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.post(NoticeKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.post(NoticeKind::Error, message);
    }

    /// The visible notice, if it has not expired yet.
    pub fn current(&self) -> Option<Notice> {
        let mut current = self.current.lock().ok()?;
        if current
            .as_ref()
            .is_some_and(|n| n.expires_at <= Instant::now())
        {
            *current = None;
        }
        current.clone()
    }

    pub fn dismiss(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }

    /// Resolve once the visible notice (if any) has expired.
    pub async fn expired(&self) {
        let deadline = match self.current.lock() {
            Ok(current) => current.as_ref().map(|n| n.expires_at),
            Err(_) => None,
        };
        if let Some(deadline) = deadline {
            tokio::time::sleep_until(deadline).await;
        }
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}
