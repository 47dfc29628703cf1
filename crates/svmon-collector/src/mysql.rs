//! MySQL server probes over `SHOW GLOBAL STATUS`, plus the disk I/O
//! probe that accompanies the database monitor.

use crate::counter::{CounterSlot, CounterStore, Delta};
use crate::diskstats::{self, DeviceIo};
use crate::Probe;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;
use std::path::PathBuf;
use svmon_common::types::Sample;
use svmon_common::units::{round2, to_mb};

const THREADS_CONNECTED: &str = "Threads_connected";
const THREADS_RUNNING: &str = "Threads_running";
const QUERIES: &str = "Queries";
const SLOW_QUERIES: &str = "Slow_queries";
const BUFFER_POOL_READ_REQUESTS: &str = "Innodb_buffer_pool_read_requests";
const BUFFER_POOL_READS: &str = "Innodb_buffer_pool_reads";

/// Reads server status counters from a live connection.
pub struct StatusClient {
    pool: MySqlPool,
}

impl StatusClient {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Fetches one `SHOW GLOBAL STATUS` counter by name.
    ///
    /// `item` is always one of the crate-level constants, never user
    /// input; `SHOW` statements do not accept placeholders, so the
    /// name is interpolated directly.
    pub async fn global_status(&self, item: &'static str) -> Result<i64> {
        let row: Option<(String, String)> =
            sqlx::query_as(&format!("SHOW GLOBAL STATUS LIKE '{item}'"))
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("querying status variable {item}"))?;
        let (_, value) = row.with_context(|| format!("status variable {item} not reported"))?;
        value
            .parse::<i64>()
            .with_context(|| format!("status variable {item} is not numeric: {value}"))
    }
}

/// Connection gauges: current and actively running threads.
pub struct ThreadsProbe {
    status: std::sync::Arc<StatusClient>,
}

impl ThreadsProbe {
    pub fn new(status: std::sync::Arc<StatusClient>) -> Self {
        Self { status }
    }
}

#[async_trait]
impl Probe for ThreadsProbe {
    fn name(&self) -> &'static str {
        "mysql-threads"
    }

    async fn collect(&self) -> Result<Sample> {
        Ok(Sample::MysqlThreads {
            connected: self.status.global_status(THREADS_CONNECTED).await?,
            running: self.status.global_status(THREADS_RUNNING).await?,
        })
    }
}

/// Queries-per-second and slow queries per interval.
///
/// QPS divides the `Queries` delta by the configured interval length
/// (assumed, not measured); slow queries are the plain `Slow_queries`
/// delta. Both report zero on the first cycle.
pub struct QueryRateProbe {
    status: std::sync::Arc<StatusClient>,
    queries: CounterSlot,
    slow_queries: CounterSlot,
    interval_secs: u64,
}

impl QueryRateProbe {
    pub fn new(status: std::sync::Arc<StatusClient>, interval_secs: u64) -> Self {
        Self {
            status,
            queries: CounterSlot::new(),
            slow_queries: CounterSlot::new(),
            interval_secs: interval_secs.max(1),
        }
    }
}

fn counter_delta(item: &'static str, delta: Delta) -> u64 {
    match delta {
        Delta::Step(d) => d,
        Delta::First => 0,
        Delta::Backward(drop) => {
            tracing::warn!(
                counter = item,
                drop,
                "status counter moved backward (server restart?), reporting zero"
            );
            0
        }
    }
}

#[async_trait]
impl Probe for QueryRateProbe {
    fn name(&self) -> &'static str {
        "mysql-queries"
    }

    async fn collect(&self) -> Result<Sample> {
        let queries = self.status.global_status(QUERIES).await?;
        let slow = self.status.global_status(SLOW_QUERIES).await?;

        let query_delta =
            counter_delta(QUERIES, self.queries.read_and_advance(queries.max(0) as u64));
        let slow_delta = counter_delta(
            SLOW_QUERIES,
            self.slow_queries.read_and_advance(slow.max(0) as u64),
        );

        Ok(Sample::MysqlQueryRates {
            qps: (query_delta / self.interval_secs) as i64,
            slow_queries: slow_delta as i64,
        })
    }
}

/// InnoDB buffer pool hit rate.
pub struct BufferPoolProbe {
    status: std::sync::Arc<StatusClient>,
}

impl BufferPoolProbe {
    pub fn new(status: std::sync::Arc<StatusClient>) -> Self {
        Self { status }
    }
}

/// `(read_requests - physical_reads) * 100 / read_requests`, zero when
/// the pool has served no read requests yet.
fn buffer_hit_rate(read_requests: i64, physical_reads: i64) -> f64 {
    if read_requests <= 0 {
        return 0.0;
    }
    round2((read_requests - physical_reads) as f64 * 100.0 / read_requests as f64)
}

#[async_trait]
impl Probe for BufferPoolProbe {
    fn name(&self) -> &'static str {
        "mysql-buffer-pool"
    }

    async fn collect(&self) -> Result<Sample> {
        let read_requests = self.status.global_status(BUFFER_POOL_READ_REQUESTS).await?;
        let physical_reads = self.status.global_status(BUFFER_POOL_READS).await?;
        Ok(Sample::MysqlBufferPool {
            hit_rate: buffer_hit_rate(read_requests, physical_reads),
        })
    }
}

/// Aggregate disk read/write throughput over the interval, from
/// per-device cumulative counters.
///
/// Deltas are summed across physical devices and divided by the
/// configured interval length (assumed, not measured). Devices seen
/// for the first time contribute nothing; a backward-moving counter is
/// reported and skipped.
pub struct DiskIoProbe {
    store: CounterStore,
    diskstats_path: PathBuf,
    interval_secs: u64,
}

impl DiskIoProbe {
    pub fn new(interval_secs: u64) -> Self {
        Self::with_path("/proc/diskstats", interval_secs)
    }

    pub fn with_path(path: impl Into<PathBuf>, interval_secs: u64) -> Self {
        Self {
            store: CounterStore::new(),
            diskstats_path: path.into(),
            interval_secs: interval_secs.max(1),
        }
    }

    fn aggregate(&self, devices: &[DeviceIo]) -> Sample {
        let mut read_delta = 0u64;
        let mut write_delta = 0u64;
        for dev in devices {
            let read = self
                .store
                .read_and_advance(&format!("{}:read", dev.device), dev.read_bytes);
            let write = self
                .store
                .read_and_advance(&format!("{}:write", dev.device), dev.write_bytes);
            for (direction, delta) in [("read", read), ("write", write)] {
                if let Delta::Backward(drop) = delta {
                    tracing::warn!(
                        device = %dev.device,
                        direction,
                        drop,
                        "disk I/O counter moved backward, skipping device"
                    );
                }
            }
            read_delta += read.increment().unwrap_or(0);
            write_delta += write.increment().unwrap_or(0);
        }

        let secs = self.interval_secs as f64;
        Sample::MysqlDiskIo {
            read_mb_per_sec: round2(to_mb(read_delta) / secs),
            write_mb_per_sec: round2(to_mb(write_delta) / secs),
        }
    }
}

#[async_trait]
impl Probe for DiskIoProbe {
    fn name(&self) -> &'static str {
        "mysql-disk-io"
    }

    async fn collect(&self) -> Result<Sample> {
        let devices = diskstats::read(&self.diskstats_path)
            .with_context(|| format!("reading {}", self.diskstats_path.display()))?;
        Ok(self.aggregate(&devices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_is_zero_without_read_requests() {
        assert_eq!(buffer_hit_rate(0, 0), 0.0);
    }

    #[test]
    fn hit_rate_matches_the_closed_formula() {
        assert_eq!(buffer_hit_rate(1000, 25), 97.5);
        assert_eq!(buffer_hit_rate(1000, 0), 100.0);
        assert_eq!(buffer_hit_rate(3, 1), 66.67);
    }

    fn dev(name: &str, read_bytes: u64, write_bytes: u64) -> DeviceIo {
        DeviceIo {
            device: name.to_string(),
            read_bytes,
            write_bytes,
        }
    }

    #[test]
    fn disk_io_first_cycle_is_zero() {
        let probe = DiskIoProbe::with_path("/dev/null", 60);
        let sample = probe.aggregate(&[dev("sda", 1 << 20, 2 << 20)]);
        assert_eq!(
            sample,
            Sample::MysqlDiskIo {
                read_mb_per_sec: 0.0,
                write_mb_per_sec: 0.0
            }
        );
    }

    #[test]
    fn disk_io_read_delta_feeds_read_speed() {
        let probe = DiskIoProbe::with_path("/dev/null", 60);
        probe.aggregate(&[dev("sda", 0, 0)]);
        // 60 MiB read and 120 MiB written over a 60 s interval.
        let sample = probe.aggregate(&[dev("sda", 60 << 20, 120 << 20)]);
        assert_eq!(
            sample,
            Sample::MysqlDiskIo {
                read_mb_per_sec: 1.0,
                write_mb_per_sec: 2.0
            }
        );
    }

    #[test]
    fn disk_io_sums_across_devices() {
        let probe = DiskIoProbe::with_path("/dev/null", 60);
        probe.aggregate(&[dev("sda", 0, 0), dev("sdb", 0, 0)]);
        let sample = probe.aggregate(&[dev("sda", 30 << 20, 0), dev("sdb", 30 << 20, 0)]);
        assert_eq!(
            sample,
            Sample::MysqlDiskIo {
                read_mb_per_sec: 1.0,
                write_mb_per_sec: 0.0
            }
        );
    }

    #[test]
    fn disk_io_backward_counter_contributes_nothing() {
        let probe = DiskIoProbe::with_path("/dev/null", 60);
        probe.aggregate(&[dev("sda", 100 << 20, 0)]);
        let sample = probe.aggregate(&[dev("sda", 10 << 20, 0)]);
        assert_eq!(
            sample,
            Sample::MysqlDiskIo {
                read_mb_per_sec: 0.0,
                write_mb_per_sec: 0.0
            }
        );
    }
}
