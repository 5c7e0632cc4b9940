//! Snapshot display formatting
//!
//! Formats snapshot listings for terminal output.

use chrono::{DateTime, Utc};

use crate::snapshot::Snapshot;

/// Format snapshots as a numbered table, in the order given
///
/// Numbers start at 1 and are the indices `restore --index` accepts.
pub fn format_snapshot_list(snapshots: &[Snapshot], now: DateTime<Utc>) -> String {
    if snapshots.is_empty() {
        return "No snapshots found.".to_string();
    }

    let name_width = snapshots
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let index_width = snapshots.len().to_string().len().max(1);

    let mut output = String::new();
    output.push_str(&format!(
        "{:>index_width$}  {:<name_width$}  {:>10}  {:>6}\n",
        "#",
        "Name",
        "Size",
        "Age",
        index_width = index_width,
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:->index_width$}  {:-<name_width$}  {:->10}  {:->6}\n",
        "",
        "",
        "",
        "",
        index_width = index_width,
        name_width = name_width,
    ));

    for (i, snapshot) in snapshots.iter().enumerate() {
        output.push_str(&format!(
            "{:>index_width$}  {:<name_width$}  {:>10}  {:>6}\n",
            i + 1,
            snapshot.name,
            format_size(snapshot.size_bytes),
            format_age(now.signed_duration_since(snapshot.created_at)),
            index_width = index_width,
            name_width = name_width,
        ));
    }

    output.push_str(&format!("\nTotal: {} snapshot(s)", snapshots.len()));
    output
}

/// Format one snapshot's details
pub fn format_snapshot_details(snapshot: &Snapshot) -> String {
    format!(
        "Name:    {}\nPath:    {}\nCreated: {}\nSize:    {}",
        snapshot.name,
        snapshot.path.display(),
        snapshot.created_at.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
        format_size(snapshot.size_bytes),
    )
}

/// Format a duration in human-readable form
pub fn format_age(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::path::PathBuf;

    fn snapshot(name: &str, created_at: DateTime<Utc>, size_bytes: u64) -> Snapshot {
        Snapshot {
            name: name.to_string(),
            path: PathBuf::from("/backups").join(name),
            created_at,
            size_bytes,
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::seconds(42)), "42s");
        assert_eq!(format_age(Duration::minutes(5)), "5m");
        assert_eq!(format_age(Duration::hours(3)), "3h");
        assert_eq!(format_age(Duration::days(2)), "2d");
        assert_eq!(format_age(Duration::days(65)), "2mo");
        assert_eq!(format_age(Duration::seconds(-5)), "0s");
    }

    #[test]
    fn test_format_empty_list() {
        assert_eq!(format_snapshot_list(&[], Utc::now()), "No snapshots found.");
    }

    #[test]
    fn test_format_list_numbers_in_given_order() {
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        let newer = snapshot("backup-2024-01-02T00-00-00-000Z.tar.gz", now - Duration::days(1), 2048);
        let older = snapshot("backup-2024-01-01T00-00-00-000Z.tar.gz", now - Duration::days(2), 100);

        let output = format_snapshot_list(&[newer, older], now);
        let lines: Vec<_> = output.lines().collect();

        assert!(lines[2].starts_with("1  backup-2024-01-02"));
        assert!(lines[2].contains("2.0 KB"));
        assert!(lines[3].starts_with("2  backup-2024-01-01"));
        assert!(lines[3].ends_with("2d"));
        assert!(output.ends_with("Total: 2 snapshot(s)"));
    }

    #[test]
    fn test_format_details() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let details = format_snapshot_details(&snapshot("backup-2024-01-01T00-00-00-000Z.tar.gz", at, 10));
        assert!(details.contains("2024-01-01 00:00:00.000 UTC"));
        assert!(details.contains("10 B"));
    }
}
