use crate::Probe;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use svmon_common::types::Sample;
use svmon_common::units::round2;
use sysinfo::System;

/// Swap space usage percentage.
pub struct SwapProbe {
    system: Mutex<System>,
}

impl SwapProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SwapProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for SwapProbe {
    fn name(&self) -> &'static str {
        "swap"
    }

    async fn collect(&self) -> Result<Sample> {
        let mut system = self.system.lock().unwrap_or_else(|p| p.into_inner());
        system.refresh_memory();

        let total = system.total_swap();
        let used = system.used_swap();
        let used_percent = if total > 0 {
            round2(used as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        Ok(Sample::Swap { used_percent })
    }
}
