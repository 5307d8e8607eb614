use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jemallocator::Jemalloc;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use feewatch::{cron::jobs::refresh_fees, CronScheduler, FeeService, Settings};

#[derive(Parser)]
#[command(author, version, about = "Protocol fee metrics from indexed on-chain data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file, with or without extension [default: config]
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute fee metrics once and print them as JSON
    Once {
        /// Only compute this protocol
        #[arg(long)]
        protocol: Option<String>,
    },
    /// Refresh the output file periodically until stopped
    Watch,
    /// List registered protocol ids
    List,
}

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    SimpleLogger::new()
        .with_level(cli.log_level)
        .init()
        .context("Failed to initialize logger")?;

    let settings = match &cli.config {
        Some(path) => Settings::from_path(path),
        None => Settings::new(),
    }
    .context("Failed to load configuration. Please ensure it is valid")?;

    let service = Arc::new(
        FeeService::from_settings(&settings).context("Failed to initialize fee service")?,
    );

    match cli.command {
        Commands::Once { protocol } => run_once(&service, protocol.as_deref()).await,
        Commands::Watch => run_watch(service, settings).await,
        Commands::List => {
            for id in service.registry().ids() {
                println!("{}", id);
            }
            Ok(())
        }
    }
}

async fn run_once(service: &FeeService, protocol: Option<&str>) -> anyhow::Result<()> {
    let metrics = match protocol {
        Some(id) => vec![service.compute(id).await?],
        None => {
            let results = service.compute_all().await?;
            let attempted = results.len();
            let metrics = refresh_fees::collect_successes(results);
            if metrics.is_empty() && attempted > 0 {
                anyhow::bail!("All {} adapters failed", attempted);
            }
            metrics
        }
    };

    let json = serde_json::to_string_pretty(&metrics).context("Failed to serialize metrics")?;
    println!("{}", json);
    Ok(())
}

async fn run_watch(service: Arc<FeeService>, settings: Settings) -> anyhow::Result<()> {
    let cancellation_token = CancellationToken::new();

    let cron_scheduler = CronScheduler::new(service, settings.scheduler);

    let cron_token = cancellation_token.child_token();
    let cron_handle = tokio::spawn(async move {
        if let Err(e) = cron_scheduler.run(cron_token).await {
            error!("Cron scheduler failed: {:#}", e);
        }
    });

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Watching fees. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
        };
    }

    cancellation_token.cancel();

    info!("Waiting for cron scheduler to stop...");
    let _ = cron_handle.await;

    info!("Stopped");
    Ok(())
}
