use crate::record::Record;
use crate::Probe;
use chrono::{DateTime, Utc};
use std::marker::PhantomData;
use std::sync::Arc;

/// Runs a fixed probe set concurrently once per cycle and assembles
/// the results into one record.
///
/// All probes start at the top of the cycle; the sampler joins every
/// task before the record is finalized, so a partially written record
/// is never observable outside this function. There is no cross-probe
/// timeout: the slowest probe (the multi-second latency session)
/// bounds cycle duration, which must stay under the scheduling
/// interval for no boundary to be skipped.
pub struct Sampler<R: Record> {
    node: i32,
    probes: Vec<Arc<dyn Probe>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Sampler<R> {
    pub fn new(node: i32, probes: Vec<Arc<dyn Probe>>) -> Self {
        Self {
            node,
            probes,
            _record: PhantomData,
        }
    }

    /// Collects one cycle started at `tick`.
    ///
    /// A probe error leaves its fields at zero; a panicked probe task
    /// is reported the same way. Neither aborts the cycle.
    pub async fn collect(&self, tick: DateTime<Utc>) -> R {
        let mut handles = Vec::with_capacity(self.probes.len());
        for probe in &self.probes {
            let probe = Arc::clone(probe);
            handles.push(tokio::spawn(async move {
                (probe.name(), probe.collect().await)
            }));
        }

        let mut record = R::empty();
        for handle in handles {
            match handle.await {
                Ok((_, Ok(sample))) => record.apply(sample),
                Ok((name, Err(e))) => {
                    tracing::warn!(probe = name, error = %e, "probe failed, fields left at zero");
                }
                Err(e) => {
                    tracing::error!(error = %e, "probe task panicked");
                }
            }
        }

        record.finalize(self.node, tick);
        record
    }
}
