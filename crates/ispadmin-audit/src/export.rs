//! Audit export.
//!
//! The backend renders the full matching set as a spreadsheet; the console
//! treats it as opaque bytes and hands it to a [`FileSink`].

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use ispadmin_auth::ActionGuard;
use ispadmin_core::error::{AdminError, AdminResult};
use ispadmin_core::models::audit::AuditCriteria;
use ispadmin_core::models::permission::tokens;
use ispadmin_core::repository::AuditLogRepository;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::config::AuditConfig;
use crate::notice::NoticeBoard;

/// Destination for a finished export.
pub trait FileSink: Send + Sync {
    /// Store `bytes` under `filename` and return where it landed. Either
    /// the whole file is delivered or nothing is.
    fn deliver(&self, filename: &str, bytes: &[u8]) -> AdminResult<PathBuf>;
}

/// Writes exports into a directory via a temp file and an atomic rename.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> AdminResult<PathBuf> {
        let export_err = |e: std::io::Error| AdminError::Export(e.to_string());

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(export_err)?;
        tmp.write_all(bytes).map_err(export_err)?;
        tmp.as_file().sync_all().map_err(export_err)?;

        let target = self.dir.join(filename);
        tmp.persist(&target)
            .map_err(|e| AdminError::Export(e.error.to_string()))?;
        Ok(target)
    }
}

/// A delivered export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
    /// Hex SHA-256 of the payload.
    pub sha256: String,
}

pub struct AuditExporter<A: AuditLogRepository, S: FileSink> {
    repo: A,
    guard: ActionGuard,
    sink: S,
    notices: NoticeBoard,
    file_prefix: String,
    file_extension: String,
}

impl<A: AuditLogRepository, S: FileSink> AuditExporter<A, S> {
    pub fn new(repo: A, guard: ActionGuard, sink: S, config: &AuditConfig) -> Self {
        Self {
            repo,
            guard,
            sink,
            notices: NoticeBoard::new(config.notice_ttl()),
            file_prefix: config.export_file_prefix.clone(),
            file_extension: config.export_file_extension.clone(),
        }
    }

    pub fn with_notices(mut self, notices: NoticeBoard) -> Self {
        self.notices = notices;
        self
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// `<prefix>_<YYYY-MM-DD>.<ext>`
    pub fn filename_for(&self, date: NaiveDate) -> String {
        format!(
            "{}_{}.{}",
            self.file_prefix,
            date.format("%Y-%m-%d"),
            self.file_extension
        )
    }

    /// Export every entry matching `criteria`, dated today (local time).
    pub async fn export(&self, criteria: &AuditCriteria) -> AdminResult<ExportedFile> {
        self.export_dated(criteria, chrono::Local::now().date_naive())
            .await
    }

    /// Export every entry matching `criteria` with `date` in the filename.
    pub async fn export_dated(
        &self,
        criteria: &AuditCriteria,
        date: NaiveDate,
    ) -> AdminResult<ExportedFile> {
        self.guard.authorize(&tokens::AUDIT_EXPORT).map_err(|denied| {
            self.notices.error(denied.to_string());
            AdminError::from(denied)
        })?;

        match self.fetch_and_deliver(criteria, date).await {
            Ok(file) => {
                info!(
                    filename = %file.filename,
                    size = file.size,
                    sha256 = %file.sha256,
                    "Audit export delivered"
                );
                self.notices
                    .success(format!("Bitácora exportada: {}", file.filename));
                Ok(file)
            }
            Err(e) => {
                warn!(error = %e, "Audit export failed");
                self.notices.error(format!("Error al exportar: {e}"));
                Err(e)
            }
        }
    }

    async fn fetch_and_deliver(
        &self,
        criteria: &AuditCriteria,
        date: NaiveDate,
    ) -> AdminResult<ExportedFile> {
        let bytes = self.repo.export(criteria.clone().normalized()).await?;
        if bytes.is_empty() {
            return Err(AdminError::Export("export payload is empty".into()));
        }

        let filename = self.filename_for(date);
        let path = self.sink.deliver(&filename, &bytes)?;
        Ok(ExportedFile {
            filename,
            path,
            size: bytes.len() as u64,
            sha256: hex::encode(Sha256::digest(&bytes)),
        })
    }
}
