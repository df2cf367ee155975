//! Audit query engine.
//!
//! Holds the filter criteria and page the audit view is showing, and the
//! last successfully fetched page. A read that fails leaves the previous
//! page in place (fail-soft); a read that completes after the session
//! identity changed is discarded. Denied actions post their message to
//! the notice board.

use ispadmin_auth::ActionGuard;
use ispadmin_core::error::{AdminError, AdminResult};
use ispadmin_core::models::audit::{
    AuditCriteria, AuditEntry, AuditFilter, AuditPage, AuditStatistics, PurgeOutcome,
};
use ispadmin_core::models::permission::{PermissionToken, tokens};
use ispadmin_core::repository::{self, AuditLogRepository, Pagination};
use tracing::{debug, info, warn};

use crate::config::AuditConfig;
use crate::notice::NoticeBoard;

/// What happened to a fetch that was authorized and valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was replaced.
    Applied,
    /// The session changed while the request was in flight; the result
    /// was dropped.
    Discarded,
    /// Out-of-range page; nothing was requested.
    Skipped,
}

pub struct AuditQueryEngine<A: AuditLogRepository> {
    repo: A,
    guard: ActionGuard,
    notices: NoticeBoard,
    criteria: AuditCriteria,
    pagination: Pagination,
    page: AuditPage,
    last_error: Option<AdminError>,
    modules: Vec<String>,
    actions: Vec<String>,
    statistics: Option<AuditStatistics>,
}

impl<A: AuditLogRepository> AuditQueryEngine<A> {
    pub fn new(repo: A, guard: ActionGuard, config: &AuditConfig) -> Self {
        Self {
            repo,
            guard,
            notices: NoticeBoard::new(config.notice_ttl()),
            criteria: AuditCriteria::default(),
            pagination: Pagination::page(1, config.page_size),
            page: AuditPage::default(),
            last_error: None,
            modules: Vec::new(),
            actions: Vec::new(),
            statistics: None,
        }
    }

    /// Share a notice board with other views (e.g. the exporter).
    pub fn with_notices(mut self, notices: NoticeBoard) -> Self {
        self.notices = notices;
        self
    }

    pub fn repository(&self) -> &A {
        &self.repo
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn criteria(&self) -> &AuditCriteria {
        &self.criteria
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.page.entries
    }

    pub fn total(&self) -> u64 {
        self.page.total
    }

    pub fn limit(&self) -> u64 {
        self.pagination.limit
    }

    pub fn offset(&self) -> u64 {
        self.pagination.offset
    }

    pub fn page_number(&self) -> u64 {
        self.pagination.page_number()
    }

    pub fn total_pages(&self) -> u64 {
        repository::total_pages(self.page.total, self.pagination.limit)
    }

    /// Error of the most recent failed read, cleared by the next success.
    pub fn last_error(&self) -> Option<&AdminError> {
        self.last_error.as_ref()
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn statistics(&self) -> Option<&AuditStatistics> {
        self.statistics.as_ref()
    }

    /// Replace the criteria and restart at page 1.
    pub async fn apply_filters(&mut self, criteria: AuditCriteria) -> AdminResult<FetchOutcome> {
        let pagination = Pagination::page(1, self.pagination.limit);
        self.fetch_with(criteria.normalized(), pagination).await
    }

    /// Jump to the 1-based page `page`. Out-of-range pages are ignored.
    pub async fn go_to_page(&mut self, page: u64) -> AdminResult<FetchOutcome> {
        if page < 1 || page > self.total_pages() {
            debug!(page, total_pages = self.total_pages(), "Page out of range");
            return Ok(FetchOutcome::Skipped);
        }
        let pagination = Pagination::page(page, self.pagination.limit);
        self.fetch_with(self.criteria.clone(), pagination).await
    }

    pub async fn next_page(&mut self) -> AdminResult<FetchOutcome> {
        self.go_to_page(self.page_number() + 1).await
    }

    pub async fn previous_page(&mut self) -> AdminResult<FetchOutcome> {
        self.go_to_page(self.page_number().saturating_sub(1)).await
    }

    /// Change the page size and restart at page 1.
    pub async fn set_page_size(&mut self, limit: u64) -> AdminResult<FetchOutcome> {
        if limit == 0 {
            return Err(AdminError::Validation {
                message: "page size must be at least 1".into(),
            });
        }
        self.fetch_with(self.criteria.clone(), Pagination::page(1, limit))
            .await
    }

    /// Re-read the current page.
    pub async fn fetch(&mut self) -> AdminResult<FetchOutcome> {
        self.fetch_with(self.criteria.clone(), self.pagination).await
    }

    /// Load the distinct modules and actions offered as filter options.
    pub async fn load_filter_options(&mut self) -> AdminResult<()> {
        self.authorize(&tokens::AUDIT_READ)?;
        let generation = self.guard.session().generation();

        let result = async {
            let modules = self.repo.list_modules().await?;
            let actions = self.repo.list_actions().await?;
            Ok::<_, AdminError>((modules, actions))
        }
        .await;

        if self.guard.session().generation() != generation {
            debug!("Session changed during filter option load, discarding");
            return Ok(());
        }
        match result {
            Ok((modules, actions)) => {
                self.modules = modules;
                self.actions = actions;
                Ok(())
            }
            Err(e) => Err(self.record_read_failure(e)),
        }
    }

    /// Aggregate counts for the current criteria.
    ///
    /// `Ok(None)` means the session changed while the request was in
    /// flight; the stored statistics are left as they were.
    pub async fn load_statistics(&mut self) -> AdminResult<Option<AuditStatistics>> {
        self.authorize(&tokens::AUDIT_STATISTICS)?;
        let generation = self.guard.session().generation();

        let result = self.repo.statistics(self.criteria.clone()).await;

        if self.guard.session().generation() != generation {
            debug!("Session changed during statistics load, discarding");
            return Ok(None);
        }
        match result {
            Ok(stats) => {
                self.statistics = Some(stats.clone());
                Ok(Some(stats))
            }
            Err(e) => Err(self.record_read_failure(e)),
        }
    }

    /// Delete entries older than `days` days, then reload from page 1.
    ///
    /// A failed purge changes nothing. A failed reload after a successful
    /// purge is reported through [`AuditQueryEngine::last_error`] only.
    pub async fn purge_older_than(&mut self, days: u32) -> AdminResult<PurgeOutcome> {
        self.authorize(&tokens::AUDIT_PURGE)?;
        if days == 0 {
            return Err(AdminError::Validation {
                message: "retention must be at least one day".into(),
            });
        }

        let outcome = self
            .repo
            .purge_older_than(days)
            .await
            .inspect_err(|e| {
                warn!(days, error = %e, "Audit purge failed");
                self.notices.error(e.to_string());
            })?;

        info!(days, deleted = outcome.deleted_count, "Audit entries purged");
        self.notices
            .success(format!("{} registros eliminados", outcome.deleted_count));

        let pagination = Pagination::page(1, self.pagination.limit);
        if let Err(e) = self.fetch_with(self.criteria.clone(), pagination).await {
            debug!(error = %e, "Reload after purge failed");
        }
        Ok(outcome)
    }

    async fn fetch_with(
        &mut self,
        criteria: AuditCriteria,
        pagination: Pagination,
    ) -> AdminResult<FetchOutcome> {
        self.authorize(&tokens::AUDIT_READ)?;
        let generation = self.guard.session().generation();

        let filter = AuditFilter {
            criteria: criteria.clone(),
            limit: pagination.limit,
            offset: pagination.offset,
        };
        debug!(?filter, "Fetching audit page");
        let result = self.repo.query(filter).await;

        if self.guard.session().generation() != generation {
            debug!("Session changed during audit fetch, discarding result");
            return Ok(FetchOutcome::Discarded);
        }

        match result {
            Ok(page) => {
                debug!(
                    returned = page.entries.len(),
                    total = page.total,
                    "Audit page loaded"
                );
                self.criteria = criteria;
                self.pagination = pagination;
                self.page = page;
                self.last_error = None;
                Ok(FetchOutcome::Applied)
            }
            Err(e) => Err(self.record_read_failure(e)),
        }
    }

    fn authorize(&self, permission: &PermissionToken) -> AdminResult<()> {
        self.guard.authorize(permission).map_err(|denied| {
            self.notices.error(denied.to_string());
            AdminError::from(denied)
        })
    }

    fn record_read_failure(&mut self, error: AdminError) -> AdminError {
        warn!(error = %error, "Audit read failed, keeping previous data");
        self.notices.error(error.to_string());
        self.last_error = Some(error.clone());
        error
    }
}
