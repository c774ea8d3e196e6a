//! Display utilities and input parsing for the pollwise CLI.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use pollwise_lib::start_of_day;

/// Formats epoch milliseconds as a local date and time, or "never" for 0.
pub(crate) fn format_millis(millis: i64, zone: &Tz) -> String {
    if millis == 0 {
        return "never".to_string();
    }
    DateTime::from_timestamp_millis(millis).map_or_else(
        || format!("{millis} (out of range)"),
        |utc| {
            utc.with_timezone(zone)
                .format("%Y-%m-%d %H:%M %Z")
                .to_string()
        },
    )
}

/// Parses a timestamp given as epoch milliseconds, RFC 3339, or a
/// `YYYY-MM-DD` date (start of that day in `zone`).
pub(crate) fn parse_timestamp(input: &str, zone: &Tz) -> Result<i64> {
    let input = input.trim();

    if let Ok(millis) = input.parse::<i64>() {
        return Ok(millis);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(start_of_day(zone, date).timestamp_millis());
    }

    bail!("Invalid timestamp: {input}. Expected epoch milliseconds, RFC 3339, or YYYY-MM-DD")
}

/// Resolves the reference time: the given RFC 3339 instant, or now.
pub(crate) fn parse_reference(at: Option<&str>, zone: &Tz) -> Result<DateTime<Tz>> {
    match at {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(zone))
            .with_context(|| format!("Invalid reference time: {s}")),
        None => Ok(Utc::now().with_timezone(zone)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_forms() {
        let tokyo = Tz::Asia__Tokyo;

        assert_eq!(parse_timestamp("1715769000000", &tokyo).unwrap(), 1_715_769_000_000);
        assert_eq!(
            parse_timestamp("2024-05-15T10:30:00Z", &tokyo).unwrap(),
            1_715_769_000_000
        );
        // Midnight in Tokyo is 15:00 UTC the previous day.
        assert_eq!(
            parse_timestamp("2024-05-15", &tokyo).unwrap(),
            1_715_698_800_000
        );
        assert!(parse_timestamp("yesterday", &tokyo).is_err());
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0, &Tz::UTC), "never");
        assert_eq!(
            format_millis(1_715_769_000_000, &Tz::UTC),
            "2024-05-15 10:30 UTC"
        );
    }

    #[test]
    fn test_parse_reference() {
        let reference = parse_reference(Some("2024-05-15T10:30:00Z"), &Tz::Asia__Tokyo).unwrap();
        assert_eq!(reference.timestamp_millis(), 1_715_769_000_000);
        assert!(parse_reference(Some("soon"), &Tz::UTC).is_err());
    }
}
