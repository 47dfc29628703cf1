use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output of a single probe: one disjoint group of record fields.
///
/// Each probe in a sampling cycle produces exactly one variant, and the
/// record applies it without touching any other probe's fields, so no
/// synchronization is needed beyond the sampler's join.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// 1-minute load average divided by logical core count, plus the
    /// raw 1-minute load average.
    Pressure { pressure: f64, load_avg: f64 },
    /// Global CPU usage percentage sampled over a one-second window.
    CpuUsage { percent: f64 },
    /// Virtual memory usage; totals in whole (truncated) gigabytes.
    Memory {
        used_percent: f64,
        total_gb: u64,
        used_gb: u64,
    },
    /// Swap space usage percentage.
    Swap { used_percent: f64 },
    /// Root filesystem usage; totals in whole (truncated) gigabytes.
    Disk {
        used_percent: f64,
        total_gb: u64,
        used_gb: u64,
    },
    /// Per-cycle network byte deltas converted to megabytes. Zero on
    /// the first cycle (no previous counter).
    NetworkThroughput { receive_mb: f64, sent_mb: f64 },
    /// ICMP echo session summary: average round-trip time in
    /// milliseconds and packet loss percentage.
    Latency {
        avg_rtt_ms: f64,
        packet_loss_pct: f64,
    },
    /// MySQL connection gauges from `SHOW GLOBAL STATUS`.
    MysqlThreads { connected: i64, running: i64 },
    /// Queries-per-second (delta / 60) and slow queries per interval.
    /// Zero on the first cycle.
    MysqlQueryRates { qps: i64, slow_queries: i64 },
    /// InnoDB buffer pool hit rate percentage; zero when the server
    /// has served no read requests.
    MysqlBufferPool { hit_rate: f64 },
    /// Aggregate disk read/write throughput in MB/s over the interval.
    MysqlDiskIo {
        read_mb_per_sec: f64,
        write_mb_per_sec: f64,
    },
}

/// One completed host sampling cycle, mirroring the `server_monitor`
/// table column for column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMetrics {
    pub pressure: f64,
    pub cpu_usage: f64,
    pub load_avg: f64,
    pub mem_usage: f64,
    /// Total memory in whole gigabytes (truncated).
    pub mem_total: u64,
    pub mem_used: u64,
    pub swap_usage: f64,
    pub disk_usage: f64,
    pub disk_total: u64,
    pub disk_used: u64,
    /// Megabytes sent since the previous cycle.
    pub sent_speed: f64,
    pub receive_speed: f64,
    /// Average ICMP round-trip time in milliseconds.
    pub avg_rtt: f64,
    pub packet_loss: f64,
    pub node: i32,
    /// Cycle start instant, truncated to the minute boundary. Together
    /// with `node` this is the record's logical key.
    pub created_at: DateTime<Utc>,
}

/// One completed MySQL sampling cycle (`server_monitor_mysql` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MysqlMetrics {
    pub threads_connected: i64,
    pub threads_running: i64,
    pub qps: i64,
    pub slow_queries: i64,
    pub buffer_hit_rate: f64,
    pub write_speed: f64,
    pub read_speed: f64,
    pub node: i32,
    pub created_at: DateTime<Utc>,
}

impl HostMetrics {
    /// An all-zero record stamped at the Unix epoch, ready for probe
    /// output. Failed probes leave their fields at these values.
    pub fn zeroed() -> Self {
        Self {
            pressure: 0.0,
            cpu_usage: 0.0,
            load_avg: 0.0,
            mem_usage: 0.0,
            mem_total: 0,
            mem_used: 0,
            swap_usage: 0.0,
            disk_usage: 0.0,
            disk_total: 0,
            disk_used: 0,
            sent_speed: 0.0,
            receive_speed: 0.0,
            avg_rtt: 0.0,
            packet_loss: 0.0,
            node: 0,
            created_at: DateTime::UNIX_EPOCH,
        }
    }
}

impl MysqlMetrics {
    pub fn zeroed() -> Self {
        Self {
            threads_connected: 0,
            threads_running: 0,
            qps: 0,
            slow_queries: 0,
            buffer_hit_rate: 0.0,
            write_speed: 0.0,
            read_speed: 0.0,
            node: 0,
            created_at: DateTime::UNIX_EPOCH,
        }
    }
}

/// A frozen record on its way to the sink, one variant per monitored
/// target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricRecord {
    Host(HostMetrics),
    Mysql(MysqlMetrics),
}

impl MetricRecord {
    /// Monitored-target label used in log output.
    pub fn target(&self) -> &'static str {
        match self {
            MetricRecord::Host(_) => "host",
            MetricRecord::Mysql(_) => "mysql",
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            MetricRecord::Host(m) => m.created_at,
            MetricRecord::Mysql(m) => m.created_at,
        }
    }
}

impl From<HostMetrics> for MetricRecord {
    fn from(m: HostMetrics) -> Self {
        MetricRecord::Host(m)
    }
}

impl From<MysqlMetrics> for MetricRecord {
    fn from(m: MysqlMetrics) -> Self {
        MetricRecord::Mysql(m)
    }
}
