use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// URL already present in the relational store.
    #[error("duplicate url")]
    DuplicateUrl,
    /// Object-store PUT failed; no DB row is created.
    #[error("object store write failed: {0}")]
    ObjectPut(String),
    /// DB insert failed after the object was written; caller rolls back
    /// the object (best-effort).
    #[error("database error: {0}")]
    Database(String),
}
