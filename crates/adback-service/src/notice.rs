//! Notice board service.
//!
//! Notices are readable by every authenticated role and managed only by
//! masters. Non-edit reads bump the view counter.

use adback_core::error::{AdbackError, AdbackResult};
use adback_core::models::identity::Identity;
use adback_core::models::notice::{CreateNotice, Notice, UpdateNotice};
use adback_core::policy;
use adback_core::repository::{NoticeRepository, PaginatedResult, Pagination};
use uuid::Uuid;

/// Notices per listing page.
pub const NOTICE_PAGE_SIZE: u64 = 20;

/// Notice board service.
pub struct NoticeService<N: NoticeRepository> {
    notices: N,
}

impl<N: NoticeRepository> NoticeService<N> {
    pub fn new(notices: N) -> Self {
        Self { notices }
    }

    /// Newest-first page of notices. Any authenticated role.
    pub async fn list(
        &self,
        _identity: &Identity,
        page: u64,
    ) -> AdbackResult<PaginatedResult<Notice>> {
        let page = page.max(1);
        self.notices
            .list(Pagination {
                offset: (page - 1) * NOTICE_PAGE_SIZE,
                limit: NOTICE_PAGE_SIZE,
            })
            .await
    }

    /// Read a notice, incrementing its view count. Any authenticated role.
    pub async fn read(&self, _identity: &Identity, id: Uuid) -> AdbackResult<Notice> {
        self.notices.read_and_increment(id).await
    }

    /// Read a notice for editing, without a view-count side effect.
    /// Master-only.
    pub async fn read_for_edit(&self, identity: &Identity, id: Uuid) -> AdbackResult<Notice> {
        policy::authorize_notice_management(identity)?;
        self.notices.get_by_id(id).await
    }

    pub async fn create(
        &self,
        identity: &Identity,
        title: &str,
        content: &str,
    ) -> AdbackResult<Notice> {
        policy::authorize_notice_management(identity)?;

        let title = title.trim();
        if title.is_empty() {
            return Err(AdbackError::validation("title is required"));
        }
        if content.trim().is_empty() {
            return Err(AdbackError::validation("content is required"));
        }

        self.notices
            .create(CreateNotice {
                title: title.to_string(),
                content: content.to_string(),
            })
            .await
    }

    pub async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        input: UpdateNotice,
    ) -> AdbackResult<Notice> {
        policy::authorize_notice_management(identity)?;

        if input.title.is_none() && input.content.is_none() {
            return Err(AdbackError::validation("no fields to update"));
        }
        if let Some(title) = &input.title {
            if title.trim().is_empty() {
                return Err(AdbackError::validation("title cannot be empty"));
            }
        }

        self.notices.update(id, input).await
    }

    pub async fn delete(&self, identity: &Identity, id: Uuid) -> AdbackResult<()> {
        policy::authorize_notice_management(identity)?;
        self.notices.delete(id).await
    }
}
