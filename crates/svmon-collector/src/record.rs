use chrono::{DateTime, Utc};
use svmon_common::types::{HostMetrics, MysqlMetrics, Sample};
use svmon_common::units::truncate_to_minute;

/// A record under assembly by the [`crate::sampler::Sampler`].
///
/// One implementation per monitored target; the sampler is generic
/// over this trait, so the host and MySQL monitors share a single
/// collection path instead of duplicated loops.
pub trait Record: Send + 'static {
    /// An all-zero record. Probes that fail leave their fields here.
    fn empty() -> Self;

    /// Writes one probe's field group. Samples that do not belong to
    /// this record type are ignored (a probe set is fixed at
    /// construction, so this only happens on a wiring mistake).
    fn apply(&mut self, sample: Sample);

    /// Stamps the node identifier and the minute-truncated cycle
    /// timestamp, freezing the record's logical key.
    fn finalize(&mut self, node: i32, tick: DateTime<Utc>);
}

impl Record for HostMetrics {
    fn empty() -> Self {
        HostMetrics::zeroed()
    }

    fn apply(&mut self, sample: Sample) {
        match sample {
            Sample::Pressure { pressure, load_avg } => {
                self.pressure = pressure;
                self.load_avg = load_avg;
            }
            Sample::CpuUsage { percent } => self.cpu_usage = percent,
            Sample::Memory {
                used_percent,
                total_gb,
                used_gb,
            } => {
                self.mem_usage = used_percent;
                self.mem_total = total_gb;
                self.mem_used = used_gb;
            }
            Sample::Swap { used_percent } => self.swap_usage = used_percent,
            Sample::Disk {
                used_percent,
                total_gb,
                used_gb,
            } => {
                self.disk_usage = used_percent;
                self.disk_total = total_gb;
                self.disk_used = used_gb;
            }
            Sample::NetworkThroughput {
                receive_mb,
                sent_mb,
            } => {
                self.receive_speed = receive_mb;
                self.sent_speed = sent_mb;
            }
            Sample::Latency {
                avg_rtt_ms,
                packet_loss_pct,
            } => {
                self.avg_rtt = avg_rtt_ms;
                self.packet_loss = packet_loss_pct;
            }
            _ => {}
        }
    }

    fn finalize(&mut self, node: i32, tick: DateTime<Utc>) {
        self.node = node;
        self.created_at = truncate_to_minute(tick);
    }
}

impl Record for MysqlMetrics {
    fn empty() -> Self {
        MysqlMetrics::zeroed()
    }

    fn apply(&mut self, sample: Sample) {
        match sample {
            Sample::MysqlThreads { connected, running } => {
                self.threads_connected = connected;
                self.threads_running = running;
            }
            Sample::MysqlQueryRates { qps, slow_queries } => {
                self.qps = qps;
                self.slow_queries = slow_queries;
            }
            Sample::MysqlBufferPool { hit_rate } => self.buffer_hit_rate = hit_rate,
            Sample::MysqlDiskIo {
                read_mb_per_sec,
                write_mb_per_sec,
            } => {
                self.read_speed = read_mb_per_sec;
                self.write_speed = write_mb_per_sec;
            }
            _ => {}
        }
    }

    fn finalize(&mut self, node: i32, tick: DateTime<Utc>) {
        self.node = node;
        self.created_at = truncate_to_minute(tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn host_record_fields_are_disjoint_per_sample() {
        let mut record = HostMetrics::empty();
        record.apply(Sample::CpuUsage { percent: 42.5 });
        record.apply(Sample::Memory {
            used_percent: 61.3,
            total_gb: 31,
            used_gb: 19,
        });

        assert_eq!(record.cpu_usage, 42.5);
        assert_eq!(record.mem_usage, 61.3);
        assert_eq!(record.mem_total, 31);
        // Untouched probe fields stay at their zero values.
        assert_eq!(record.disk_usage, 0.0);
        assert_eq!(record.avg_rtt, 0.0);
    }

    #[test]
    fn finalize_truncates_the_tick_to_the_minute() {
        let mut record = HostMetrics::empty();
        let tick = Utc.with_ymd_and_hms(2025, 3, 1, 12, 4, 59).unwrap();
        record.finalize(7, tick);

        assert_eq!(record.node, 7);
        assert_eq!(
            record.created_at,
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 4, 0).unwrap()
        );
    }

    #[test]
    fn mysql_record_ignores_host_samples() {
        let mut record = MysqlMetrics::empty();
        record.apply(Sample::CpuUsage { percent: 99.0 });
        record.apply(Sample::MysqlBufferPool { hit_rate: 99.97 });

        assert_eq!(record.buffer_hit_rate, 99.97);
        assert_eq!(record, {
            let mut want = MysqlMetrics::zeroed();
            want.buffer_hit_rate = 99.97;
            want
        });
    }
}
