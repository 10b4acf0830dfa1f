use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted content row. `content_uuid` names the object-store blob via
/// `body_ref = "<source>/<content_uuid>.txt"`; `url` is unique across the
/// whole table and is the dedup primary signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: i64,
    pub content_uuid: Uuid,
    pub source: String,
    pub url: String,
    pub title: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub body_ref: String,
}

impl ContentRecord {
    pub fn body_ref_for(source: &str, content_uuid: &Uuid) -> String {
        format!("{source}/{content_uuid}.txt")
    }
}
