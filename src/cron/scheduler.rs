//! Cron scheduler for the periodic fee refresh used by `feewatch watch`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{error, info};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerSettings;
use crate::service::FeeService;

use super::jobs;

/// Cron scheduler that refreshes the fee output file on a fixed interval.
pub struct CronScheduler {
    service: Arc<FeeService>,
    settings: Arc<SchedulerSettings>,
}

impl CronScheduler {
    pub fn new(service: Arc<FeeService>, settings: SchedulerSettings) -> Self {
        Self {
            service,
            settings: Arc::new(settings),
        }
    }

    /// Refreshes once immediately, then on every interval until cancellation.
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<()> {
        let mut scheduler = JobScheduler::new().await?;

        self.register_refresh_fees_job(&scheduler).await?;

        // The repeated job first fires one interval from now
        let output_path = self.output_path();
        tokio::select! {
            _ = refresh(&self.service, &output_path) => {},
            _ = cancellation_token.cancelled() => {
                info!("Cron scheduler cancelled before first refresh");
                return Ok(());
            }
        }

        scheduler.start().await?;
        info!("Cron scheduler started");

        // Wait for cancellation
        cancellation_token.cancelled().await;
        info!("Cron scheduler shutting down...");

        scheduler.shutdown().await?;
        Ok(())
    }

    fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.settings.output_path)
    }

    async fn register_refresh_fees_job(&self, scheduler: &JobScheduler) -> Result<()> {
        let service = self.service.clone();
        let output_path = self.output_path();
        let interval = self.settings.refresh_interval_secs;

        let job = Job::new_repeated_async(Duration::from_secs(interval), move |_uuid, _lock| {
            let service = service.clone();
            let output_path = output_path.clone();
            Box::pin(async move {
                refresh(&service, &output_path).await;
            })
        })?;

        scheduler.add(job).await?;
        info!("Registered refresh_fees job (every {}s)", interval);
        Ok(())
    }
}

async fn refresh(service: &FeeService, output_path: &std::path::Path) {
    if let Err(e) = jobs::refresh_fees::run(service, output_path).await {
        error!("Failed to refresh fees: {:#}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeeMetrics;
    use crate::testing::{fixed_service, meta, Fixed};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_refreshes_immediately_and_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fees.json");

        let service = Arc::new(fixed_service(vec![Fixed(meta("omen"), Some(7.0))]));
        let scheduler = CronScheduler::new(
            service,
            SchedulerSettings {
                refresh_interval_secs: 3600,
                output_path: path.to_string_lossy().into_owned(),
            },
        );

        let token = CancellationToken::new();
        let handle = tokio::spawn({
            let token = token.clone();
            async move { scheduler.run(token).await }
        });

        // the first refresh does not wait for the interval
        let mut waited = Duration::ZERO;
        while !path.exists() && waited < Duration::from_secs(10) {
            tokio::time::sleep(Duration::from_millis(20)).await;
            waited += Duration::from_millis(20);
        }

        token.cancel();
        let result = tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());

        let body = std::fs::read_to_string(&path).unwrap();
        let metrics: Vec<FeeMetrics> = serde_json::from_str(&body).unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].id, "omen");
        assert_eq!(metrics[0].one_day, 7.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_returns_when_cancelled_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = CronScheduler::new(
            Arc::new(fixed_service(vec![])),
            SchedulerSettings {
                refresh_interval_secs: 3600,
                output_path: dir.path().join("fees.json").to_string_lossy().into_owned(),
            },
        );

        let token = CancellationToken::new();
        token.cancel();
        assert!(scheduler.run(token).await.is_ok());
    }
}
