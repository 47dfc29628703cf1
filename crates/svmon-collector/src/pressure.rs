use crate::Probe;
use anyhow::Result;
use async_trait::async_trait;
use svmon_common::types::Sample;
use svmon_common::units::round2;
use sysinfo::System;

/// System pressure: 1-minute load average divided by logical core
/// count, alongside the raw 1-minute load average.
pub struct PressureProbe {
    cores: usize,
}

impl PressureProbe {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        // Core count is constant for the process lifetime; the max(1)
        // guards division on platforms where the list comes back empty.
        Self {
            cores: system.cpus().len().max(1),
        }
    }
}

impl Default for PressureProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for PressureProbe {
    fn name(&self) -> &'static str {
        "pressure"
    }

    async fn collect(&self) -> Result<Sample> {
        let load = System::load_average();
        Ok(Sample::Pressure {
            pressure: round2(load.one / self.cores as f64),
            load_avg: round2(load.one),
        })
    }
}
