pub mod contents;
pub mod jobs;
pub mod metrics;
pub mod sites;
