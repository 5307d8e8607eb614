//! Job to recompute every protocol's fee metrics and publish them as JSON.
//!
//! The output file is replaced atomically (write to a sibling temp file, then
//! rename), so readers never observe a partially written array.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{error, info, warn};

use crate::error::Result as FeeResult;
use crate::models::FeeMetrics;
use crate::service::FeeService;

/// Recomputes all adapters and writes the successful ones to `output_path`.
///
/// Returns the number of protocols written. A refresh where every adapter failed
/// leaves the previous file in place.
pub async fn run(service: &FeeService, output_path: &Path) -> Result<usize> {
    info!("Starting refresh_fees job...");

    let start = std::time::Instant::now();

    let results = service.compute_all().await?;
    let attempted = results.len();
    let metrics = collect_successes(results);

    if metrics.is_empty() && attempted > 0 {
        bail!("All {} adapters failed, keeping previous output", attempted);
    }

    write_atomically(output_path, &metrics).await?;

    info!(
        "Completed refresh_fees job in {:?} ({}/{} protocols written to {})",
        start.elapsed(),
        metrics.len(),
        attempted,
        output_path.display()
    );
    Ok(metrics.len())
}

/// Keep complete metrics, log and drop failed adapters.
pub fn collect_successes(
    results: Vec<(&'static str, FeeResult<FeeMetrics>)>,
) -> Vec<FeeMetrics> {
    results
        .into_iter()
        .filter_map(|(id, result)| match result {
            Ok(metrics) => Some(metrics),
            Err(e) if e.is_transient() => {
                warn!("Skipping {} this round, upstream unavailable: {}", id, e);
                None
            }
            Err(e) => {
                error!("Failed to compute fees for {}: {}", id, e);
                None
            }
        })
        .collect()
}

async fn write_atomically(path: &Path, metrics: &[FeeMetrics]) -> Result<()> {
    let body = serde_json::to_vec_pretty(metrics).context("Failed to serialize fee metrics")?;

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, &body)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            warn!("Failed to remove {}: {}", tmp.display(), cleanup);
        }
        return Err(e).with_context(|| format!("Failed to move {} into place", tmp.display()));
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
