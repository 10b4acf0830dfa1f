//! Value types exchanged between crawler stages: requests, responses, items,
//! site configuration, and the persisted content/job records.

pub mod config;
pub mod content;
pub mod metrics;
pub mod request;

pub use config::SiteConfig;
pub use content::ContentRecord;
pub use metrics::metrics;
pub use request::{Item, Request, Response};
