//! Cumulative per-device I/O counters from `/proc/diskstats`.
//!
//! Sector counts (fields 5 and 9) are always reported in 512-byte
//! units regardless of the device's logical sector size. Partitions
//! and virtual devices are filtered out so that summing across devices
//! does not double-count a disk and its partitions.

use std::io;
use std::path::Path;

const SECTOR_SIZE: u64 = 512;

/// Cumulative bytes read/written by one block device since boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIo {
    pub device: String,
    pub read_bytes: u64,
    pub write_bytes: u64,
}

pub fn read(path: impl AsRef<Path>) -> io::Result<Vec<DeviceIo>> {
    Ok(parse(&std::fs::read_to_string(path)?))
}

pub fn parse(raw: &str) -> Vec<DeviceIo> {
    let mut devices = Vec::new();
    for line in raw.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 14 {
            continue;
        }
        let name = fields[2];
        if !is_physical_device(name) {
            continue;
        }
        let (Ok(read_sectors), Ok(write_sectors)) =
            (fields[5].parse::<u64>(), fields[9].parse::<u64>())
        else {
            continue;
        };
        devices.push(DeviceIo {
            device: name.to_string(),
            read_bytes: read_sectors * SECTOR_SIZE,
            write_bytes: write_sectors * SECTOR_SIZE,
        });
    }
    devices
}

fn is_physical_device(name: &str) -> bool {
    if name.starts_with("loop")
        || name.starts_with("ram")
        || name.starts_with("zram")
        || name.starts_with("dm-")
        || name.starts_with("md")
        || name.starts_with("sr")
        || name.starts_with("fd")
        || name.starts_with("nbd")
    {
        return false;
    }
    if name.starts_with("nvme") || name.starts_with("mmcblk") {
        // nvme0n1 is the disk, nvme0n1p1 a partition.
        return !name.contains('p');
    }
    // sda is the disk, sda1 a partition.
    !name.chars().last().is_some_and(|c| c.is_ascii_digit())
}
