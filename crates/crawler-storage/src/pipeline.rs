use crate::error::StorageError;
use crate::object_store::ObjectStore;
use crate::repository::ContentRepository;
use crawler_types::{ContentRecord, Item};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// `process_item` -> true if newly stored, false if duplicate or failed.
/// Write ordering is the cross-store invariant this pipeline exists to
/// enforce: object PUT before DB insert, with rollback + best-effort object
/// delete if the DB insert fails after the object write succeeded.
pub struct StoragePipeline {
    objects: Arc<dyn ObjectStore>,
    repository: Arc<dyn ContentRepository>,
}

impl StoragePipeline {
    pub fn new(objects: Arc<dyn ObjectStore>, repository: Arc<dyn ContentRepository>) -> Self {
        Self { objects, repository }
    }

    #[instrument(skip(self, item), fields(url = %item.url, source = %item.source))]
    pub async fn process_item(&self, item: &Item) -> anyhow::Result<bool> {
        if self.repository.find_by_url(&item.url).await?.is_some() {
            debug!("url already stored, skipping");
            return Ok(false);
        }

        let content_uuid = Uuid::new_v4();
        let body_ref = ContentRecord::body_ref_for(&item.source, &content_uuid);

        if let Err(err) = self.objects.put(&body_ref, item.body.clone().into_bytes()).await {
            warn!(%err, body_ref, "object store write failed, no row will be created");
            return Ok(false);
        }

        match self
            .repository
            .insert(
                content_uuid,
                &item.source,
                &item.url,
                &item.title,
                item.author.as_deref(),
                item.published_at,
                &body_ref,
            )
            .await
        {
            Ok(_) => {
                crawler_types::metrics().items_stored_total.inc();
                Ok(true)
            }
            Err(StorageError::DuplicateUrl) => {
                debug!(body_ref, "lost the race on url uniqueness, rolling back object");
                if let Err(err) = self.objects.delete(&body_ref).await {
                    warn!(%err, body_ref, "best-effort rollback delete failed");
                }
                Ok(false)
            }
            Err(StorageError::Database(err)) => {
                warn!(%err, body_ref, "database insert failed, rolling back object");
                if let Err(rollback_err) = self.objects.delete(&body_ref).await {
                    warn!(%rollback_err, body_ref, "best-effort rollback delete failed");
                }
                Ok(false)
            }
            Err(StorageError::ObjectPut(_)) => unreachable!("insert() never returns ObjectPut"),
        }
    }

    /// Returns the count of items newly stored.
    pub async fn process_items(&self, items: &[Item]) -> anyhow::Result<usize> {
        let mut stored = 0;
        for item in items {
            if self.process_item(item).await? {
                stored += 1;
            }
        }
        Ok(stored)
    }

    /// Same write ordering as `process_item`, but surfaces the created row
    /// or the specific failure reason instead of collapsing every non-store
    /// outcome into `false`. Used by the direct content-creation endpoint,
    /// which must distinguish "duplicate" (409) from "internal failure" (500).
    #[instrument(skip(self, item), fields(url = %item.url, source = %item.source))]
    pub async fn create_one(&self, item: &Item) -> Result<ContentRecord, StorageError> {
        if self
            .repository
            .find_by_url(&item.url)
            .await
            .map_err(|err| StorageError::Database(err.to_string()))?
            .is_some()
        {
            return Err(StorageError::DuplicateUrl);
        }

        let content_uuid = Uuid::new_v4();
        let body_ref = ContentRecord::body_ref_for(&item.source, &content_uuid);

        self.objects
            .put(&body_ref, item.body.clone().into_bytes())
            .await
            .map_err(|err| StorageError::ObjectPut(err.to_string()))?;

        match self
            .repository
            .insert(
                content_uuid,
                &item.source,
                &item.url,
                &item.title,
                item.author.as_deref(),
                item.published_at,
                &body_ref,
            )
            .await
        {
            Ok(record) => {
                crawler_types::metrics().items_stored_total.inc();
                Ok(record)
            }
            Err(err) => {
                warn!(body_ref, "insert failed after object write, rolling back object");
                if let Err(rollback_err) = self.objects.delete(&body_ref).await {
                    warn!(%rollback_err, body_ref, "best-effort rollback delete failed");
                }
                Err(err)
            }
        }
    }
}
