use chrono::{DateTime, Utc};

/// How a scheduled job is triggered. Mirrors the three trigger kinds the
/// management API accepts.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Standard 5-field cron expression (minute hour day-of-month month day-of-week).
    Cron(String),
    /// One-shot at a specific wall-clock time.
    Date(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// A registered job: a site bound to a trigger. `next_run` is recomputed
/// after every execution for cron triggers; a `Date` trigger fires once
/// and is then removed by the scheduler loop.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub id: String,
    pub site: String,
    pub trigger: Trigger,
    pub next_run: Option<DateTime<Utc>>,
}

impl ScheduledJob {
    pub fn new_cron(id: impl Into<String>, site: impl Into<String>, cron_expression: impl Into<String>) -> anyhow::Result<Self> {
        let cron_expression = cron_expression.into();
        let next_run = next_cron_run(&cron_expression)?;
        Ok(Self {
            id: id.into(),
            site: site.into(),
            trigger: Trigger::Cron(cron_expression),
            next_run,
        })
    }

    pub fn new_date(id: impl Into<String>, site: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            site: site.into(),
            trigger: Trigger::Date(at),
            next_run: Some(at),
        }
    }

    /// Recomputes `next_run`. Cron jobs get their next upcoming fire time;
    /// date jobs are exhausted after firing once.
    pub fn advance(&mut self) -> anyhow::Result<()> {
        self.next_run = match &self.trigger {
            Trigger::Cron(expr) => next_cron_run(expr)?,
            Trigger::Date(_) => None,
        };
        Ok(())
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        matches!(self.next_run, Some(at) if at <= now)
    }

    /// A `Date` trigger is removed from the registry once it has fired.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.trigger, Trigger::Date(_)) && self.next_run.is_none()
    }
}

/// Site configs use the standard 5-field cron format (minute hour
/// day-of-month month day-of-week); the `cron` crate parses 6+ fields with
/// seconds leading, so a `0` seconds field is prepended before parsing.
fn next_cron_run(expr: &str) -> anyhow::Result<Option<DateTime<Utc>>> {
    use std::str::FromStr;
    let with_seconds = format!("0 {expr}");
    let schedule = cron::Schedule::from_str(&with_seconds).map_err(|err| anyhow::anyhow!("invalid cron expression {expr:?}: {err}"))?;
    Ok(schedule.upcoming(Utc).next())
}

/// A completed or in-flight execution of a scheduled or manual job.
#[derive(Debug, Clone)]
pub struct JobRun {
    pub run_id: String,
    pub job_id: String,
    pub site: String,
    pub status: JobStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub items_stored: Option<usize>,
    pub error: Option<String>,
}

impl JobRun {
    pub fn pending(run_id: String, job_id: String, site: String) -> Self {
        Self {
            run_id,
            job_id,
            site,
            status: JobStatus::Pending,
            start_time: Utc::now(),
            end_time: None,
            items_stored: None,
            error: None,
        }
    }
}
