use crate::Probe;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use svmon_common::types::Sample;
use svmon_common::units::round2;
use sysinfo::System;
use tokio::sync::Mutex;

/// Width of the usage sampling window. CPU% is measured between two
/// refreshes, not read instantaneously, so every collect blocks for
/// this long.
const SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// Global CPU utilization sampled over a one-second window.
pub struct CpuProbe {
    // tokio Mutex: held across the sampling-window await.
    system: Mutex<System>,
}

impl CpuProbe {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        Self {
            system: Mutex::new(system),
        }
    }
}

impl Default for CpuProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for CpuProbe {
    fn name(&self) -> &'static str {
        "cpu"
    }

    async fn collect(&self) -> Result<Sample> {
        let mut system = self.system.lock().await;
        system.refresh_cpu_all();
        tokio::time::sleep(SAMPLE_WINDOW).await;
        system.refresh_cpu_all();

        Ok(Sample::CpuUsage {
            percent: round2(f64::from(system.global_cpu_usage())),
        })
    }
}
