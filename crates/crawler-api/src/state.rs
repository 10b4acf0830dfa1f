use crawler_scheduler::Scheduler;
use crawler_storage::{ContentRepository, StoragePipeline};
use std::sync::Arc;

/// Shared application state injected into every handler via `State`.
/// `pipeline` is used for writes (enforces the object-then-row ordering);
/// `content_repository` backs read-only listing/lookup.
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<Scheduler>,
    pub pipeline: Arc<StoragePipeline>,
    pub content_repository: Arc<dyn ContentRepository>,
}

impl AppState {
    pub fn new(scheduler: Arc<Scheduler>, pipeline: Arc<StoragePipeline>, content_repository: Arc<dyn ContentRepository>) -> Self {
        Self {
            scheduler,
            pipeline,
            content_repository,
        }
    }
}
