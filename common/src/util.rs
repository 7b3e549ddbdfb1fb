use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;

/// Layout emitted by the workload driver, e.g. `2024-03-01 12:00:00.250 +0100 CET`.
static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(?:\.\d{1,9})?) ([+-]\d{4}) ([A-Za-z]+|[+-]\d{2}(?:\d{2})?)$",
    )
    .unwrap()
});

const SIZE_UNITS: &[(u64, &str)] = &[
    (1 << 60, "EB"),
    (1 << 50, "PB"),
    (1 << 40, "TB"),
    (1 << 30, "GB"),
    (1 << 20, "MB"),
    (1 << 10, "KB"),
];

/// Parses a driver timestamp. The zone abbreviation must be present but only
/// the numeric offset is used.
pub fn parse_timestamp(timestamp: &str) -> Result<DateTime<FixedOffset>, String> {
    let caps = TIMESTAMP_RE
        .captures(timestamp)
        .ok_or_else(|| format!("Unsupported timestamp format {timestamp:?}"))?;
    let datetime = format!("{} {}", &caps[1], &caps[2]);
    DateTime::parse_from_str(&datetime, "%Y-%m-%d %H:%M:%S%.f %z")
        .map_err(|err| format!("Invalid timestamp {timestamp:?}: {err}"))
}

/// Formats a byte count using the largest binary unit that divides it exactly,
/// so 1024 is `1KB` but 1536 stays `1536B`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_owned();
    }
    SIZE_UNITS
        .iter()
        .find(|(unit, _)| bytes % unit == 0)
        .map(|(unit, suffix)| format!("{}{suffix}", bytes / unit))
        .unwrap_or_else(|| format!("{bytes}B"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fractional_timestamp() {
        let ts = parse_timestamp("2024-03-01 12:00:00.25 +0100 CET").unwrap();
        let base = parse_timestamp("2024-03-01 11:00:00 +0000 UTC").unwrap();
        assert_eq!((ts - base).num_milliseconds(), 250);
    }

    #[test]
    fn parses_numeric_zone_abbreviation() {
        assert!(parse_timestamp("2024-03-01 12:00:00.123456789 +0300 +03").is_ok());
    }

    #[test]
    fn rejects_deviating_layouts() {
        for bad in [
            "2024-03-01T12:00:00Z",
            "2024-03-01 12:00:00 +0100",
            "2024-03-01 12:00:00.1234567890 +0100 CET",
            "2024-03-01 12:00:00 CET +0100",
            "",
        ] {
            assert!(parse_timestamp(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn sizes_use_exact_units() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1024), "1KB");
        assert_eq!(format_size(1536), "1536B");
        assert_eq!(format_size(4 << 20), "4MB");
        assert_eq!(format_size(3 << 30), "3GB");
        assert_eq!(format_size(100), "100B");
    }
}
