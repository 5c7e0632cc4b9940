//! Snapshot naming
//!
//! Names look like `backup-2024-01-12T08-30-00-000Z.tar.gz`: an ISO-8601 UTC
//! timestamp with millisecond precision where `:` and `.` are replaced by
//! `-`. Every field is fixed-width, so lexical order of names equals
//! chronological order of the timestamps they carry.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

/// Leading part of every snapshot file name
pub const NAME_PREFIX: &str = "backup-";

/// Trailing part of every snapshot file name
pub const NAME_SUFFIX: &str = ".tar.gz";

/// Length of the rendered timestamp, e.g. `2024-01-12T08-30-00-000Z`
const TIMESTAMP_LEN: usize = 24;

/// Drop everything below millisecond precision
pub fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = at.nanosecond();
    // Leap seconds carry nanos >= 1e9; keep them inside the representable second
    let millis = (nanos / 1_000_000).min(999);
    at.with_nanosecond(millis * 1_000_000).unwrap_or(at)
}

/// Render the snapshot file name for a point in time
pub fn snapshot_name(at: DateTime<Utc>) -> String {
    let at = truncate_to_millis(at);
    format!(
        "{}{}-{:03}Z{}",
        NAME_PREFIX,
        at.format("%Y-%m-%dT%H-%M-%S"),
        at.timestamp_subsec_millis(),
        NAME_SUFFIX
    )
}

/// Parse the creation time embedded in a snapshot file name
///
/// Returns `None` for anything that does not match the naming pattern exactly.
pub fn parse_snapshot_name(name: &str) -> Option<DateTime<Utc>> {
    let ts = name.strip_prefix(NAME_PREFIX)?.strip_suffix(NAME_SUFFIX)?;
    parse_timestamp(ts)
}

/// Check whether a file name follows the snapshot naming pattern
pub fn is_snapshot_name(name: &str) -> bool {
    parse_snapshot_name(name).is_some()
}

/// Parse `YYYY-MM-DDTHH-MM-SS-mmmZ`
fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    if ts.len() != TIMESTAMP_LEN || !ts.is_ascii() {
        return None;
    }

    let bytes = ts.as_bytes();
    let separators = [(4, b'-'), (7, b'-'), (10, b'T'), (13, b'-'), (16, b'-'), (19, b'-'), (23, b'Z')];
    if separators.iter().any(|&(i, c)| bytes[i] != c) {
        return None;
    }

    let year = digits(&ts[0..4])? as i32;
    let month = digits(&ts[5..7])?;
    let day = digits(&ts[8..10])?;
    let hour = digits(&ts[11..13])?;
    let minute = digits(&ts[14..16])?;
    let second = digits(&ts[17..19])?;
    let millis = digits(&ts[20..23])?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;

    Some(DateTime::from_naive_utc_and_offset(
        NaiveDateTime::new(date, time),
        Utc,
    ))
}

/// Parse a run of ASCII digits, rejecting signs and whitespace
fn digits(s: &str) -> Option<u32> {
    if s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, TimeZone};

    #[test]
    fn test_name_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 12, 8, 30, 5).unwrap() + Duration::milliseconds(42);
        assert_eq!(snapshot_name(at), "backup-2024-01-12T08-30-05-042Z.tar.gz");
    }

    #[test]
    fn test_parse_name() {
        let parsed = parse_snapshot_name("backup-2024-01-01T00-00-00-000Z.tar.gz").unwrap();
        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.month(), 1);
        assert_eq!(parsed.day(), 1);

        let parsed = parse_snapshot_name("backup-2025-11-27T14-30-22-456Z.tar.gz").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 456);
        assert_eq!(parsed.hour(), 14);
    }

    #[test]
    fn test_parse_inverts_render() {
        let now = Utc::now();
        let name = snapshot_name(now);
        assert_eq!(parse_snapshot_name(&name), Some(truncate_to_millis(now)));
    }

    #[test]
    fn test_rejects_non_matching_names() {
        for name in [
            "backup-missing.tar.gz",
            "backup-2024-01-01T00-00-00-000Z.tar",
            "backup-2024-01-01T00:00:00.000Z.tar.gz",
            "backup-2024-13-01T00-00-00-000Z.tar.gz",
            "backup-2024-01-01T00-00-00-000.tar.gz",
            "backup-+024-01-01T00-00-00-000Z.tar.gz",
            "snapshot-2024-01-01T00-00-00-000Z.tar.gz",
            "backup-2024-01-01T00-00-00-000Z.tar.gz.partial",
            "",
        ] {
            assert!(!is_snapshot_name(name), "{name} should not match");
        }
    }

    #[test]
    fn test_lexical_order_matches_chronological_order() {
        let base = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let steps = [
            Duration::milliseconds(1),
            Duration::milliseconds(999),
            Duration::seconds(1),
            Duration::minutes(1),
            Duration::hours(1),
            Duration::days(1),
            Duration::days(40),
            Duration::days(400),
        ];

        for step in steps {
            let t1 = base;
            let t2 = base + step;
            assert!(
                snapshot_name(t1) < snapshot_name(t2),
                "{} should sort before {}",
                snapshot_name(t1),
                snapshot_name(t2)
            );
        }
    }
}
