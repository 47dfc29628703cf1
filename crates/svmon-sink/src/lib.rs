//! Persistence boundary for completed metric records.
//!
//! The sampling loop hands each frozen [`MetricRecord`] to a
//! [`RecordSink`] exactly once per cycle. Sinks report failures but
//! the core never retries or buffers: a lost cycle is acceptable, a
//! stalled loop is not.

pub mod error;
pub mod mysql;

use async_trait::async_trait;
use svmon_common::types::MetricRecord;

/// Accepts one completed record per sampling cycle.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Sink name used for logging (e.g. `"mysql"`).
    fn name(&self) -> &'static str;

    /// Persists one record.
    ///
    /// # Errors
    ///
    /// Returns an error when the record could not be stored; the
    /// caller logs it and moves on to the next cycle.
    async fn insert(&self, record: &MetricRecord) -> error::Result<()>;
}
