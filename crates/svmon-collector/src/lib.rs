//! The svmon sampling engine.
//!
//! A [`scheduler::Scheduler`] fires once per wall-clock-aligned
//! interval; on each tick a [`sampler::Sampler`] fans out every
//! [`Probe`] of its probe set concurrently, joins them, and assembles
//! one immutable record. Rate probes keep their previous counter
//! values in [`counter`] slots so monotonic counters become
//! per-interval deltas.

pub mod counter;
pub mod cpu;
pub mod disk;
pub mod diskstats;
pub mod latency;
pub mod memory;
pub mod mysql;
pub mod network;
pub mod pressure;
pub mod record;
pub mod sampler;
pub mod scheduler;
pub mod swap;

#[cfg(test)]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use svmon_common::types::Sample;

/// One independent metric-collection function.
///
/// Probes run concurrently within a cycle and may not depend on one
/// another's output; each contributes a disjoint group of record
/// fields via its [`Sample`] variant. Implementations own whatever
/// state they need across cycles (a `sysinfo` handle, counter slots),
/// behind interior mutability since the sampler shares them across
/// spawned tasks.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Short name used for logging (e.g. `"cpu"`, `"latency"`).
    fn name(&self) -> &'static str;

    /// Collects this probe's sample for the current cycle.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying metric source is
    /// unreadable. The sampler logs it and leaves the probe's record
    /// fields at their zero values; the cycle continues.
    async fn collect(&self) -> Result<Sample>;
}
