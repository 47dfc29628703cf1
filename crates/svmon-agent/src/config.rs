use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    /// Identifies this host in every record; constant for the process
    /// lifetime.
    pub node_id: i32,
    /// Sampling interval in seconds. Also the fixed divisor for the
    /// MySQL rate formulas, so changing it changes their meaning.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub host: HostMonitorConfig,
    #[serde(default)]
    pub mysql: MysqlMonitorConfig,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    /// MySQL URL used both for the record sink and, when the MySQL
    /// monitor is enabled, the status probes.
    pub url: String,
    #[serde(default = "default_host_table")]
    pub host_table: String,
    #[serde(default = "default_mysql_table")]
    pub mysql_table: String,
}

#[derive(Debug, Deserialize)]
pub struct HostMonitorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds past the aligned boundary at which ticks fire.
    #[serde(default)]
    pub align_offset_secs: u64,
    /// Fire one cycle immediately at startup before aligning.
    #[serde(default)]
    pub immediate: bool,
    #[serde(default = "default_ping_target")]
    pub ping_target: String,
}

#[derive(Debug, Deserialize)]
pub struct MysqlMonitorConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Offset 30 s by default so the two monitors' cycles interleave.
    #[serde(default = "default_mysql_offset_secs")]
    pub align_offset_secs: u64,
    #[serde(default)]
    pub immediate: bool,
}

impl Default for HostMonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            align_offset_secs: 0,
            immediate: false,
            ping_target: default_ping_target(),
        }
    }
}

impl Default for MysqlMonitorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            align_offset_secs: default_mysql_offset_secs(),
            immediate: false,
        }
    }
}

fn default_interval_secs() -> u64 {
    60
}

fn default_host_table() -> String {
    "server_monitor".to_string()
}

fn default_mysql_table() -> String {
    "server_monitor_mysql".to_string()
}

fn default_true() -> bool {
    true
}

fn default_ping_target() -> String {
    "8.8.8.8".to_string()
}

fn default_mysql_offset_secs() -> u64 {
    30
}

impl AgentConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
