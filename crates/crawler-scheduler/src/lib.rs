//! Cron/manual dispatch of per-site crawl runs, with a running-flag
//! registry that prevents overlapping runs of the same site.
//!
//! Grounded on `riptide-workers::scheduler::JobScheduler` for the
//! DashMap-backed registry and check-interval poll loop, and on the
//! original `running_tasks: dict[str, bool]` wrapper pattern for the
//! entry/exit running-flag semantics.

mod error;
mod job;
mod scheduler;

pub use error::SchedulerError;
pub use job::{JobRun, JobStatus, ScheduledJob, Trigger};
pub use scheduler::{Scheduler, SchedulerConfig, SiteEntry};
