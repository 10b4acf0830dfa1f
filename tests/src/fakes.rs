use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crawler_storage::{ContentRepository, ObjectStore, StorageError};
use crawler_types::ContentRecord;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory stand-in for the object store, keyed by `body_ref`.
#[derive(Default)]
pub struct FakeObjectStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put(&self, key: &str, body: Vec<u8>) -> anyhow::Result<()> {
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.objects.lock().unwrap().get(key).cloned())
    }
}

/// In-memory stand-in for the relational store, enforcing the same
/// url-uniqueness constraint a real Postgres unique index would.
#[derive(Default)]
pub struct FakeContentRepository {
    pub rows: Mutex<Vec<ContentRecord>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl ContentRepository for FakeContentRepository {
    async fn find_by_url(&self, url: &str) -> anyhow::Result<Option<ContentRecord>> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.url == url).cloned())
    }

    async fn insert(
        &self,
        content_uuid: Uuid,
        source: &str,
        url: &str,
        title: &str,
        author: Option<&str>,
        published_at: Option<DateTime<Utc>>,
        body_ref: &str,
    ) -> Result<ContentRecord, StorageError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.url == url) {
            return Err(StorageError::DuplicateUrl);
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let record = ContentRecord {
            id: *next_id,
            content_uuid,
            source: source.to_string(),
            url: url.to_string(),
            title: title.to_string(),
            author: author.map(str::to_string),
            published_at,
            created_at: Utc::now(),
            body_ref: body_ref.to_string(),
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<ContentRecord>> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, _skip: i64, _limit: i64, _source: Option<&str>) -> anyhow::Result<Vec<ContentRecord>> {
        Ok(self.rows.lock().unwrap().clone())
    }
}
