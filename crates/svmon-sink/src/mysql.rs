use crate::error::{Result, SinkError};
use crate::RecordSink;
use async_trait::async_trait;
use sqlx::MySqlPool;
use svmon_common::types::{HostMetrics, MetricRecord, MysqlMetrics};

/// Writes records into the two monitoring tables, one `INSERT` per
/// cycle.
pub struct MySqlSink {
    pool: MySqlPool,
    host_table: String,
    mysql_table: String,
}

impl MySqlSink {
    /// Table names come from configuration and are interpolated into
    /// the statements (identifiers cannot be bound), so they are
    /// restricted to `[A-Za-z0-9_]`.
    pub fn new(pool: MySqlPool, host_table: &str, mysql_table: &str) -> Result<Self> {
        for table in [host_table, mysql_table] {
            if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(SinkError::Other(format!("invalid table name: {table:?}")));
            }
        }
        Ok(Self {
            pool,
            host_table: host_table.to_string(),
            mysql_table: mysql_table.to_string(),
        })
    }

    async fn insert_host(&self, m: &HostMetrics) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (pressure, cpu_usage, load_avg, mem_usage, mem_total, mem_used, \
             swap_usage, disk_usage, disk_total, disk_used, sent_speed, receive_speed, \
             avg_rtt, packet_loss, node, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.host_table
        );
        sqlx::query(&sql)
            .bind(m.pressure)
            .bind(m.cpu_usage)
            .bind(m.load_avg)
            .bind(m.mem_usage)
            .bind(m.mem_total)
            .bind(m.mem_used)
            .bind(m.swap_usage)
            .bind(m.disk_usage)
            .bind(m.disk_total)
            .bind(m.disk_used)
            .bind(m.sent_speed)
            .bind(m.receive_speed)
            .bind(m.avg_rtt)
            .bind(m.packet_loss)
            .bind(m.node)
            .bind(m.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_mysql(&self, m: &MysqlMetrics) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (threads_connected, threads_running, qps, slow_queries, \
             buffer_hit_rate, write_speed, read_speed, node, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.mysql_table
        );
        sqlx::query(&sql)
            .bind(m.threads_connected)
            .bind(m.threads_running)
            .bind(m.qps)
            .bind(m.slow_queries)
            .bind(m.buffer_hit_rate)
            .bind(m.write_speed)
            .bind(m.read_speed)
            .bind(m.node)
            .bind(m.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for MySqlSink {
    fn name(&self) -> &'static str {
        "mysql"
    }

    async fn insert(&self, record: &MetricRecord) -> Result<()> {
        match record {
            MetricRecord::Host(m) => self.insert_host(m).await,
            MetricRecord::Mysql(m) => self.insert_mysql(m).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn table_names_are_validated() {
        let pool = MySqlPool::connect_lazy("mysql://localhost/monitor").unwrap();
        assert!(MySqlSink::new(pool.clone(), "server_monitor", "server_monitor_mysql").is_ok());
        assert!(MySqlSink::new(pool.clone(), "bad-name", "server_monitor_mysql").is_err());
        assert!(MySqlSink::new(pool.clone(), "drop table; --", "x").is_err());
        assert!(MySqlSink::new(pool, "", "x").is_err());
    }
}
