use crate::Probe;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use svmon_common::types::Sample;
use svmon_common::units::{round2, to_gb};
use sysinfo::Disks;

/// Usage of a single filesystem, the root mount by default.
pub struct DiskProbe {
    disks: Mutex<Disks>,
    mount: PathBuf,
}

impl DiskProbe {
    /// Probes the filesystem mounted at `/`.
    pub fn new() -> Self {
        Self::for_mount("/")
    }

    pub fn for_mount(mount: impl Into<PathBuf>) -> Self {
        Self {
            disks: Mutex::new(Disks::new_with_refreshed_list()),
            mount: mount.into(),
        }
    }
}

impl Default for DiskProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for DiskProbe {
    fn name(&self) -> &'static str {
        "disk"
    }

    async fn collect(&self) -> Result<Sample> {
        let mut disks = self.disks.lock().unwrap_or_else(|p| p.into_inner());
        disks.refresh();

        let Some(disk) = disks.iter().find(|d| d.mount_point() == self.mount.as_path()) else {
            bail!("no filesystem mounted at {}", self.mount.display());
        };

        let total = disk.total_space();
        let used = total.saturating_sub(disk.available_space());
        let used_percent = if total > 0 {
            round2(used as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        Ok(Sample::Disk {
            used_percent,
            total_gb: to_gb(total),
            used_gb: to_gb(used),
        })
    }
}
