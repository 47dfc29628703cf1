mod config;

use anyhow::{Context, Result};
use sqlx::MySqlPool;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use svmon_collector::cpu::CpuProbe;
use svmon_collector::disk::DiskProbe;
use svmon_collector::latency::LatencyProbe;
use svmon_collector::memory::MemoryProbe;
use svmon_collector::mysql::{
    BufferPoolProbe, DiskIoProbe, QueryRateProbe, StatusClient, ThreadsProbe,
};
use svmon_collector::network::NetworkProbe;
use svmon_collector::pressure::PressureProbe;
use svmon_collector::record::Record;
use svmon_collector::sampler::Sampler;
use svmon_collector::scheduler::Scheduler;
use svmon_collector::swap::SwapProbe;
use svmon_collector::Probe;
use svmon_common::types::{HostMetrics, MetricRecord, MysqlMetrics};
use svmon_sink::mysql::MySqlSink;
use svmon_sink::RecordSink;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use config::AgentConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("svmon=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/agent.toml".to_string());

    let config = AgentConfig::load(&config_path)
        .with_context(|| format!("loading config from {config_path}"))?;
    tracing::info!(node = config.node_id, "svmon-agent starting");

    // Configuration and connectivity errors are fatal at startup; once
    // the loops run, nothing is allowed to terminate them but ctrl-c.
    let pool = MySqlPool::connect(&config.database.url)
        .await
        .context("connecting to MySQL")?;
    let sink: Arc<dyn RecordSink> = Arc::new(MySqlSink::new(
        pool.clone(),
        &config.database.host_table,
        &config.database.mysql_table,
    )?);

    let interval = Duration::from_secs(config.interval_secs);
    let cancel = CancellationToken::new();
    let mut loops = Vec::new();

    if config.host.enabled {
        let sampler = Sampler::<HostMetrics>::new(config.node_id, host_probe_set(&config)?);
        let scheduler = Scheduler::new(interval)
            .with_offset(Duration::from_secs(config.host.align_offset_secs))
            .immediate(config.host.immediate);
        tracing::info!(
            offset_secs = config.host.align_offset_secs,
            "host monitor enabled"
        );
        loops.push(tokio::spawn(run_monitor(
            "host",
            scheduler,
            sampler,
            Arc::clone(&sink),
            cancel.clone(),
        )));
    }

    if config.mysql.enabled {
        let probes = mysql_probe_set(&config, pool.clone());
        let sampler = Sampler::<MysqlMetrics>::new(config.node_id, probes);
        let scheduler = Scheduler::new(interval)
            .with_offset(Duration::from_secs(config.mysql.align_offset_secs))
            .immediate(config.mysql.immediate);
        tracing::info!(
            offset_secs = config.mysql.align_offset_secs,
            "mysql monitor enabled"
        );
        loops.push(tokio::spawn(run_monitor(
            "mysql",
            scheduler,
            sampler,
            Arc::clone(&sink),
            cancel.clone(),
        )));
    }

    if loops.is_empty() {
        anyhow::bail!("no monitors enabled in {config_path}");
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down gracefully");
    cancel.cancel();
    for task in loops {
        let _ = task.await;
    }

    Ok(())
}

fn host_probe_set(config: &AgentConfig) -> Result<Vec<Arc<dyn Probe>>> {
    let ping_target: IpAddr = config
        .host
        .ping_target
        .parse()
        .with_context(|| format!("invalid ping_target: {}", config.host.ping_target))?;

    Ok(vec![
        Arc::new(PressureProbe::new()),
        Arc::new(CpuProbe::new()),
        Arc::new(MemoryProbe::new()),
        Arc::new(SwapProbe::new()),
        Arc::new(DiskProbe::new()),
        Arc::new(NetworkProbe::new()),
        Arc::new(LatencyProbe::new(ping_target).context("creating latency probe")?),
    ])
}

fn mysql_probe_set(config: &AgentConfig, pool: MySqlPool) -> Vec<Arc<dyn Probe>> {
    let status = Arc::new(StatusClient::new(pool));
    vec![
        Arc::new(ThreadsProbe::new(Arc::clone(&status))),
        Arc::new(QueryRateProbe::new(
            Arc::clone(&status),
            config.interval_secs,
        )),
        Arc::new(BufferPoolProbe::new(status)),
        Arc::new(DiskIoProbe::new(config.interval_secs)),
    ]
}

/// One monitored target's sampling loop: collect at every aligned
/// tick, hand the frozen record to the sink, never stop for a failed
/// cycle.
async fn run_monitor<R>(
    monitor: &'static str,
    scheduler: Scheduler,
    sampler: Sampler<R>,
    sink: Arc<dyn RecordSink>,
    cancel: CancellationToken,
) where
    R: Record + Into<MetricRecord>,
{
    let sampler = Arc::new(sampler);
    scheduler
        .run(cancel, move |tick| {
            let sampler = Arc::clone(&sampler);
            let sink = Arc::clone(&sink);
            async move {
                tracing::info!(monitor, tick = %tick, "cycle started");
                let record: MetricRecord = sampler.collect(tick).await.into();
                match sink.insert(&record).await {
                    Ok(()) => {
                        tracing::info!(monitor, at = %record.created_at(), "record stored");
                    }
                    Err(e) => {
                        // Fire-and-forget: the cycle's record is lost.
                        tracing::error!(monitor, error = %e, "insert failed, record dropped");
                    }
                }
            }
        })
        .await;
    tracing::info!(monitor, "monitor stopped");
}
