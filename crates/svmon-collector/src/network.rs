use crate::counter::{CounterSlot, Delta};
use crate::Probe;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use svmon_common::types::Sample;
use svmon_common::units::{round2, to_mb};
use sysinfo::Networks;

/// Aggregate network throughput: the per-cycle delta of cumulative
/// bytes received/sent across all interfaces, converted to megabytes.
///
/// The value is a per-interval delta reported as a "speed", not
/// normalized by elapsed seconds; the first cycle reports zero because
/// no previous counter exists.
pub struct NetworkProbe {
    networks: Mutex<Networks>,
    received: CounterSlot,
    transmitted: CounterSlot,
}

impl NetworkProbe {
    pub fn new() -> Self {
        Self {
            networks: Mutex::new(Networks::new_with_refreshed_list()),
            received: CounterSlot::new(),
            transmitted: CounterSlot::new(),
        }
    }
}

fn delta_mb(direction: &'static str, delta: Delta) -> f64 {
    match delta {
        Delta::First => 0.0,
        Delta::Step(bytes) => round2(to_mb(bytes)),
        Delta::Backward(drop) => {
            tracing::warn!(
                direction,
                drop,
                "cumulative byte counter moved backward (interface reset?), reporting zero"
            );
            0.0
        }
    }
}

impl Default for NetworkProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for NetworkProbe {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn collect(&self) -> Result<Sample> {
        let (total_received, total_transmitted) = {
            let mut networks = self.networks.lock().unwrap_or_else(|p| p.into_inner());
            networks.refresh();
            networks.iter().fold((0u64, 0u64), |(rx, tx), (_, data)| {
                (rx + data.total_received(), tx + data.total_transmitted())
            })
        };

        let receive_mb = delta_mb("receive", self.received.read_and_advance(total_received));
        let sent_mb = delta_mb("sent", self.transmitted.read_and_advance(total_transmitted));

        Ok(Sample::NetworkThroughput {
            receive_mb,
            sent_mb,
        })
    }
}
