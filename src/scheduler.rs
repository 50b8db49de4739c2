use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

/// Wrapper around tokio-cron-scheduler for the daily posting jobs
pub struct Scheduler {
    inner: JobScheduler,
}

impl Scheduler {
    /// Create a new scheduler
    pub async fn new() -> Result<Self> {
        let inner = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;
        Ok(Self { inner })
    }

    /// Add a recurring cron job evaluated in the given time zone
    pub async fn add_cron_job<F>(&self, cron_expr: &str, tz: Tz, name: &str, task: F) -> Result<()>
    where
        F: Fn() -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
            + Send
            + Sync
            + 'static,
    {
        let job_name = name.to_string();
        let job = Job::new_async_tz(cron_expr, tz, move |_uuid, _lock| {
            let name = job_name.clone();
            let fut = task();
            Box::pin(async move {
                info!("Running scheduled task: {}", name);
                fut.await;
            })
        })
        .with_context(|| format!("Failed to create cron job: {}", name))?;

        self.inner
            .add(job)
            .await
            .with_context(|| format!("Failed to add job: {}", name))?;

        info!("Scheduled task '{}' with cron: {} ({})", name, cron_expr, tz);
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<()> {
        self.inner
            .start()
            .await
            .context("Failed to start scheduler")?;
        info!("Scheduler started");
        Ok(())
    }
}

/// Translate a "HH:MM" posting time into a six-field cron expression.
pub fn post_time_to_cron(time: &str) -> Result<String> {
    let Some((hour, minute)) = time.split_once(':') else {
        bail!("Expected HH:MM, got '{}'", time);
    };
    let hour: u8 = hour
        .parse()
        .with_context(|| format!("Bad hour in '{}'", time))?;
    let minute: u8 = minute
        .parse()
        .with_context(|| format!("Bad minute in '{}'", time))?;
    if hour > 23 || minute > 59 {
        bail!("Time out of range: '{}'", time);
    }
    Ok(format!("0 {} {} * * *", minute, hour))
}
