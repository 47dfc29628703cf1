use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Fires a callback at wall-clock instants aligned to an interval
/// boundary plus an optional offset.
///
/// Each boundary is recomputed from the *current* time, not by adding
/// the interval to the previous tick, so a cycle that overruns its
/// interval skips the missed boundary instead of compounding drift or
/// queueing catch-up ticks.
pub struct Scheduler {
    interval: Duration,
    offset: Duration,
    immediate: bool,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            offset: Duration::ZERO,
            immediate: false,
        }
    }

    /// Shifts every aligned boundary forward (e.g. 30 s past the
    /// minute for the MySQL monitor).
    pub fn with_offset(mut self, offset: Duration) -> Self {
        self.offset = offset;
        self
    }

    /// Fire once immediately before aligning to the first boundary.
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// The next aligned boundary strictly after truncating `now`:
    /// `trunc(now, interval) + interval + offset`.
    pub fn next_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let step = self.interval.as_secs().max(1) as i64;
        let aligned = now.timestamp().div_euclid(step) * step + step + self.offset.as_secs() as i64;
        DateTime::from_timestamp(aligned, 0).unwrap_or(now)
    }

    /// Runs the scheduling loop until `cancel` fires.
    ///
    /// Cancellation observed while sleeping aborts the wait without
    /// invoking `on_tick`; a tick already executing runs to completion
    /// (cooperative, not preemptive). A boundary already in the past
    /// (offset or an overrunning previous tick) clamps the sleep to
    /// zero so the tick fires at once and the loop re-aligns on the
    /// next iteration.
    pub async fn run<F, Fut>(&self, cancel: CancellationToken, mut on_tick: F)
    where
        F: FnMut(DateTime<Utc>) -> Fut,
        Fut: Future<Output = ()>,
    {
        if self.immediate {
            if cancel.is_cancelled() {
                return;
            }
            on_tick(Utc::now()).await;
        }

        loop {
            let now = Utc::now();
            let next = self.next_boundary(now);
            let sleep = (next - now).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("scheduler cancelled");
                    return;
                }
                _ = tokio::time::sleep(sleep) => {}
            }

            on_tick(next).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn minutely() -> Scheduler {
        Scheduler::new(Duration::from_secs(60))
    }

    #[test]
    fn boundary_aligns_to_the_next_whole_minute() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 17).unwrap();
        let want = Utc.with_ymd_and_hms(2025, 3, 1, 12, 1, 0).unwrap();
        assert_eq!(minutely().next_boundary(now), want);
    }

    #[test]
    fn boundary_on_an_exact_minute_moves_to_the_following_one() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 1, 0).unwrap();
        let want = Utc.with_ymd_and_hms(2025, 3, 1, 12, 2, 0).unwrap();
        assert_eq!(minutely().next_boundary(now), want);
    }

    #[test]
    fn offset_shifts_the_boundary() {
        let sched = minutely().with_offset(Duration::from_secs(30));
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 17).unwrap();
        let want = Utc.with_ymd_and_hms(2025, 3, 1, 12, 1, 30).unwrap();
        assert_eq!(sched.next_boundary(now), want);
    }

    #[test]
    fn overrun_realigns_from_current_time_skipping_missed_boundaries() {
        // A 70 s cycle starting at 12:01:00 ends at 12:02:10; the next
        // boundary is 12:03:00, not a queued 12:02:00.
        let after_overrun = Utc.with_ymd_and_hms(2025, 3, 1, 12, 2, 10).unwrap();
        let want = Utc.with_ymd_and_hms(2025, 3, 1, 12, 3, 0).unwrap();
        assert_eq!(minutely().next_boundary(after_overrun), want);
    }

    #[tokio::test]
    async fn cancelled_while_sleeping_fires_no_tick() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let cancel = CancellationToken::new();
        cancel.cancel();

        minutely()
            .run(cancel, move |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;

        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn immediate_mode_fires_once_before_aligning() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();

        minutely()
            .immediate(true)
            .run(cancel, move |_| {
                let counter = counter.clone();
                let canceller = canceller.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    // Cancel from inside the first tick; the following
                    // sleep observes it and the loop exits.
                    canceller.cancel();
                }
            })
            .await;

        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_interval_ticks_land_on_whole_seconds() {
        let sched = Scheduler::new(Duration::from_secs(1));
        let seen: Arc<std::sync::Mutex<Vec<DateTime<Utc>>>> = Arc::default();
        let sink = seen.clone();
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();

        sched
            .run(cancel, move |tick| {
                let sink = sink.clone();
                let canceller = canceller.clone();
                async move {
                    let mut seen = sink.lock().unwrap();
                    seen.push(tick);
                    if seen.len() == 2 {
                        canceller.cancel();
                    }
                }
            })
            .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        for tick in seen.iter() {
            assert_eq!(tick.timestamp_subsec_millis(), 0);
        }
        assert!((seen[1] - seen[0]).num_seconds() >= 1);
    }
}
