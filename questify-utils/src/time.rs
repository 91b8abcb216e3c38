use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Duration, Utc};

/// Return the current unix timestamp in seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

/// Current UTC calendar date as `YYYY-MM-DD`.
pub fn today_iso_date() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// RFC 3339 timestamp with a `Z` suffix, as calendar providers expect.
pub fn to_rfc3339_z(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Inclusive lookup window around `now`: `days_back` before and `days_ahead` after.
pub fn window_around(
    now: DateTime<Utc>,
    days_back: i64,
    days_ahead: i64,
) -> (DateTime<Utc>, DateTime<Utc>) {
    (now - Duration::days(days_back), now + Duration::days(days_ahead))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{to_rfc3339_z, today_iso_date, window_around};

    #[test]
    fn iso_date_has_calendar_shape() {
        let today = today_iso_date();
        assert_eq!(today.len(), 10);
        assert_eq!(today.as_bytes()[4], b'-');
        assert_eq!(today.as_bytes()[7], b'-');
    }

    #[test]
    fn window_spans_requested_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let (start, end) = window_around(now, 30, 90);

        assert_eq!(to_rfc3339_z(start), "2024-01-31T12:00:00Z");
        assert_eq!(to_rfc3339_z(end), "2024-05-30T12:00:00Z");
    }
}
