//! Dedup + two-store (object + relational) write pipeline.
//!
//! Grounded on `riptide-persistence::adapters::postgres_repository`
//! (sqlx::PgPool, #[instrument]+tracing style, thiserror-wrapped DB errors)
//! for the relational side. The object store has no teacher analogue — it
//! is grounded on the `aws-sdk-s3`+`aws-config` pairing found in the
//! example pack, matching the original's MinIO (S3-compatible) usage.

mod error;
mod object_store;
mod pipeline;
mod repository;

pub use error::StorageError;
pub use object_store::{ObjectStore, S3ObjectStore};
pub use pipeline::StoragePipeline;
pub use repository::{ContentRepository, PostgresContentRepository};
