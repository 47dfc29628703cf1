use crate::Probe;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use svmon_common::types::Sample;
use svmon_common::units::{round2, to_gb};
use sysinfo::System;

/// Virtual memory usage: used percentage plus total/used in whole
/// (truncated) gigabytes.
pub struct MemoryProbe {
    system: Mutex<System>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for MemoryProbe {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn collect(&self) -> Result<Sample> {
        let mut system = self.system.lock().unwrap_or_else(|p| p.into_inner());
        system.refresh_memory();

        let total = system.total_memory();
        let used = system.used_memory();
        let used_percent = if total > 0 {
            round2(used as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        Ok(Sample::Memory {
            used_percent,
            total_gb: to_gb(total),
            used_gb: to_gb(used),
        })
    }
}
