use chrono::{DateTime, Utc};

/// Round to two decimal places.
///
/// Every float that lands in a record passes through here so the
/// persisted precision is uniform across all gauges and rates.
///
/// # Examples
///
/// ```
/// assert_eq!(svmon_common::units::round2(0.12345), 0.12);
/// ```
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Convert bytes to whole gigabytes, truncating (integer division).
pub fn to_gb(bytes: u64) -> u64 {
    bytes / 1024 / 1024 / 1024
}

/// Convert bytes to fractional megabytes.
pub fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

/// Truncate an instant to its minute boundary, discarding seconds and
/// sub-second precision.
pub fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp().div_euclid(60) * 60;
    DateTime::from_timestamp(secs, 0).unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn round2_truncates_to_two_places() {
        assert_eq!(round2(0.12345), 0.12);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(99.999), 100.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn to_gb_truncates_not_rounds() {
        let bytes = 3 * 1024u64.pow(3) + 500_000_000;
        assert_eq!(to_gb(bytes), 3);
        assert_eq!(to_gb(1024u64.pow(3) - 1), 0);
    }

    #[test]
    fn to_mb_is_fractional() {
        assert_eq!(to_mb(1024 * 1024), 1.0);
        assert_eq!(to_mb(1536 * 1024), 1.5);
    }

    #[test]
    fn truncate_to_minute_drops_seconds() {
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 17).unwrap();
        let want = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(truncate_to_minute(t), want);

        let exact = Utc.with_ymd_and_hms(2025, 3, 1, 12, 1, 0).unwrap();
        assert_eq!(truncate_to_minute(exact), exact);
    }
}
