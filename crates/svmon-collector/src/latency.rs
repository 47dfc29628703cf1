use crate::Probe;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use svmon_common::types::Sample;
use svmon_common::units::round2;
use surge_ping::{Client, Config, PingIdentifier, PingSequence};

/// Echoes sent per cycle, one per second.
const ECHO_COUNT: u16 = 5;
const ECHO_INTERVAL: Duration = Duration::from_secs(1);
const ECHO_TIMEOUT: Duration = Duration::from_secs(1);
const PAYLOAD: [u8; 56] = [0; 56];

/// Network latency and packet loss against a fixed external address.
///
/// Sends a burst of ICMP echoes and summarizes the session into an
/// average round-trip time (milliseconds) and a loss percentage. The
/// session blocks for roughly `ECHO_COUNT` seconds, which makes this
/// the probe that dominates cycle duration.
///
/// Raw ICMP sockets need root or `CAP_NET_RAW`.
pub struct LatencyProbe {
    client: Client,
    target: IpAddr,
}

impl LatencyProbe {
    pub fn new(target: IpAddr) -> Result<Self> {
        let client = Client::new(&Config::default()).context("creating ICMP socket")?;
        Ok(Self { client, target })
    }
}

/// Collapse an echo session into `(avg_rtt_ms, loss_pct)`.
///
/// The average is truncated to whole microseconds before scaling to
/// milliseconds; a session with no replies reports zero RTT and 100%
/// loss.
fn summarize(sent: u32, received: u32, total_rtt: Duration) -> (f64, f64) {
    let loss = if sent > 0 {
        (sent - received) as f64 * 100.0 / sent as f64
    } else {
        0.0
    };
    let avg_ms = if received > 0 {
        (total_rtt / received).as_micros() as f64 / 1000.0
    } else {
        0.0
    };
    (round2(avg_ms), round2(loss))
}

#[async_trait]
impl Probe for LatencyProbe {
    fn name(&self) -> &'static str {
        "latency"
    }

    async fn collect(&self) -> Result<Sample> {
        let mut pinger = self
            .client
            .pinger(self.target, PingIdentifier(rand::random()))
            .await;
        pinger.timeout(ECHO_TIMEOUT);

        let mut received = 0u32;
        let mut total_rtt = Duration::ZERO;
        for seq in 0..ECHO_COUNT {
            if seq > 0 {
                tokio::time::sleep(ECHO_INTERVAL).await;
            }
            match pinger.ping(PingSequence(seq), &PAYLOAD).await {
                Ok((_, rtt)) => {
                    received += 1;
                    total_rtt += rtt;
                }
                Err(e) => {
                    tracing::debug!(addr = %self.target, seq, error = %e, "echo lost");
                }
            }
        }

        let (avg_rtt_ms, packet_loss_pct) = summarize(u32::from(ECHO_COUNT), received, total_rtt);
        Ok(Sample::Latency {
            avg_rtt_ms,
            packet_loss_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_replies_received() {
        let (rtt, loss) = summarize(5, 5, Duration::from_micros(5 * 12_345));
        assert_eq!(loss, 0.0);
        // 12.345 ms truncated to whole microseconds, then rounded.
        assert_eq!(rtt, 12.35);
    }

    #[test]
    fn partial_loss() {
        let (rtt, loss) = summarize(5, 4, Duration::from_millis(4 * 20));
        assert_eq!(loss, 20.0);
        assert_eq!(rtt, 20.0);
    }

    #[test]
    fn no_replies_is_total_loss_with_zero_rtt() {
        let (rtt, loss) = summarize(5, 0, Duration::ZERO);
        assert_eq!(loss, 100.0);
        assert_eq!(rtt, 0.0);
    }
}
