use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("site not found: {0}")]
    SiteNotFound(String),
    #[error("job already running: {0}")]
    AlreadyRunning(String),
    #[error("job not found: {0}")]
    JobNotFound(String),
    #[error("scheduler not started")]
    SchedulerUnavailable,
    #[error(transparent)]
    Invalid(#[from] anyhow::Error),
}
