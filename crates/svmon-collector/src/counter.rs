use std::collections::HashMap;
use std::sync::Mutex;

/// Outcome of swapping a stored monotonic counter for its new reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    /// No previous value existed; the first cycle after process start
    /// must report a zero rate.
    First,
    /// The counter advanced by this many units (zero included).
    Step(u64),
    /// The counter moved backward by this many units: a wraparound or
    /// a source reset. Callers report this explicitly (warn log, zero
    /// rate) instead of clamping it away.
    Backward(u64),
}

impl Delta {
    /// The usable increment, if any. `First` and `Backward` carry no
    /// meaningful rate.
    pub fn increment(self) -> Option<u64> {
        match self {
            Delta::Step(d) => Some(d),
            Delta::First | Delta::Backward(_) => None,
        }
    }
}

fn classify(previous: Option<u64>, current: u64) -> Delta {
    match previous {
        None => Delta::First,
        Some(prev) if current >= prev => Delta::Step(current - prev),
        Some(prev) => Delta::Backward(prev - current),
    }
}

/// Holds one previous-cycle counter value.
///
/// Each rate probe owns its slots, so contention is per-slot by
/// construction; the mutex only makes sharing across spawned probe
/// tasks sound.
#[derive(Debug, Default)]
pub struct CounterSlot {
    prev: Mutex<Option<u64>>,
}

impl CounterSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces the stored value with `current` and
    /// classifies the movement since the previous cycle.
    pub fn read_and_advance(&self, current: u64) -> Delta {
        let mut prev = self.prev.lock().unwrap_or_else(|p| p.into_inner());
        let delta = classify(*prev, current);
        *prev = Some(current);
        delta
    }
}

/// Keyed counter slots for sources with a dynamic set of counters
/// (per-device disk I/O).
#[derive(Debug, Default)]
pub struct CounterStore {
    slots: Mutex<HashMap<String, u64>>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_and_advance(&self, key: &str, current: u64) -> Delta {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        let delta = classify(slots.get(key).copied(), current);
        slots.insert(key.to_string(), current);
        delta
    }
}
