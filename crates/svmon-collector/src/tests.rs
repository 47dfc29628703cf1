use crate::sampler::Sampler;
use crate::Probe;
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use svmon_common::types::{HostMetrics, Sample};

enum Outcome {
    Sample(Sample),
    Fail(&'static str),
    Panic,
}

struct StubProbe {
    name: &'static str,
    delay: Duration,
    outcome: Outcome,
}

impl StubProbe {
    fn ok(name: &'static str, sample: Sample) -> Arc<dyn Probe> {
        Arc::new(Self {
            name,
            delay: Duration::ZERO,
            outcome: Outcome::Sample(sample),
        })
    }

    fn slow(name: &'static str, delay: Duration, sample: Sample) -> Arc<dyn Probe> {
        Arc::new(Self {
            name,
            delay,
            outcome: Outcome::Sample(sample),
        })
    }

    fn failing(name: &'static str, message: &'static str) -> Arc<dyn Probe> {
        Arc::new(Self {
            name,
            delay: Duration::ZERO,
            outcome: Outcome::Fail(message),
        })
    }

    fn panicking(name: &'static str) -> Arc<dyn Probe> {
        Arc::new(Self {
            name,
            delay: Duration::ZERO,
            outcome: Outcome::Panic,
        })
    }
}

#[async_trait]
impl Probe for StubProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn collect(&self) -> Result<Sample> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.outcome {
            Outcome::Sample(sample) => Ok(sample.clone()),
            Outcome::Fail(message) => bail!("{message}"),
            Outcome::Panic => panic!("stub probe panic"),
        }
    }
}

#[tokio::test]
async fn sampler_assembles_all_probe_outputs() {
    let sampler: Sampler<HostMetrics> = Sampler::new(
        3,
        vec![
            StubProbe::ok("cpu", Sample::CpuUsage { percent: 17.25 }),
            StubProbe::ok(
                "swap",
                Sample::Swap {
                    used_percent: 4.06,
                },
            ),
            StubProbe::ok(
                "latency",
                Sample::Latency {
                    avg_rtt_ms: 23.11,
                    packet_loss_pct: 0.0,
                },
            ),
        ],
    );

    let tick = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 17).unwrap();
    let record = sampler.collect(tick).await;

    assert_eq!(record.cpu_usage, 17.25);
    assert_eq!(record.swap_usage, 4.06);
    assert_eq!(record.avg_rtt, 23.11);
    assert_eq!(record.node, 3);
    assert_eq!(
        record.created_at,
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    );
}

#[tokio::test]
async fn failing_probe_yields_a_partial_record() {
    let sampler: Sampler<HostMetrics> = Sampler::new(
        1,
        vec![
            StubProbe::ok("cpu", Sample::CpuUsage { percent: 55.0 }),
            StubProbe::failing("latency", "icmp socket unavailable"),
        ],
    );

    let record = sampler.collect(Utc::now()).await;

    // The failed probe's fields stay zero; the cycle still emits.
    assert_eq!(record.cpu_usage, 55.0);
    assert_eq!(record.avg_rtt, 0.0);
    assert_eq!(record.packet_loss, 0.0);
}

#[tokio::test]
async fn panicking_probe_does_not_abort_the_cycle() {
    let sampler: Sampler<HostMetrics> = Sampler::new(
        1,
        vec![
            StubProbe::panicking("disk"),
            StubProbe::ok(
                "memory",
                Sample::Memory {
                    used_percent: 73.4,
                    total_gb: 62,
                    used_gb: 45,
                },
            ),
        ],
    );

    let record = sampler.collect(Utc::now()).await;

    assert_eq!(record.mem_usage, 73.4);
    assert_eq!(record.disk_usage, 0.0);
}

#[tokio::test(start_paused = true)]
async fn probes_run_concurrently_and_the_join_waits_for_the_slowest() {
    let delay = Duration::from_millis(100);
    let sampler: Sampler<HostMetrics> = Sampler::new(
        1,
        vec![
            StubProbe::slow("cpu", delay, Sample::CpuUsage { percent: 10.0 }),
            StubProbe::slow(
                "swap",
                delay,
                Sample::Swap {
                    used_percent: 1.0,
                },
            ),
            StubProbe::slow(
                "latency",
                Duration::from_millis(250),
                Sample::Latency {
                    avg_rtt_ms: 9.99,
                    packet_loss_pct: 0.0,
                },
            ),
        ],
    );

    let started = tokio::time::Instant::now();
    let record = sampler.collect(Utc::now()).await;
    let elapsed = started.elapsed();

    // With the clock paused, elapsed virtual time is deterministic:
    // the fan-out overlaps the 100 ms probes with the 250 ms one.
    assert!(elapsed >= Duration::from_millis(250));
    assert!(elapsed < Duration::from_millis(350));
    assert_eq!(record.cpu_usage, 10.0);
    assert_eq!(record.swap_usage, 1.0);
    assert_eq!(record.avg_rtt, 9.99);
}
