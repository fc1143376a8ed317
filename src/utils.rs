//! Date and time conversion helpers shared by the value transformations.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

/// Formats a timestamp in the SCIM XSD dateTime form with millisecond
/// precision, e.g. "2025-06-14T10:03:54.374Z".
pub fn format_scim_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parses a SCIM dateTime value (ISO-8601 with `Z` or `±HH:MM` offset).
pub fn parse_scim_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Formats a timestamp in the LDAP generalized-time form with millisecond
/// precision, e.g. "20250614100354.374Z".
pub fn format_generalized_time(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%d%H%M%S%.3fZ").to_string()
}

/// Parses an LDAP generalized-time value: `YYYYMMDDHHMMSS[.fff]` followed by
/// `Z` or a `±HHMM` offset. The instant is normalized to UTC.
pub fn parse_generalized_time(s: &str) -> Option<DateTime<Utc>> {
    let (body, offset_secs) = if let Some(body) = s.strip_suffix('Z') {
        (body, 0)
    } else if let Some(pos) = s.rfind(['+', '-']) {
        // An offset sign can only appear after the date digits.
        if pos < 14 {
            return None;
        }
        let (body, offset) = s.split_at(pos);
        (body, parse_offset(offset)?)
    } else {
        return None;
    };

    let naive = NaiveDateTime::parse_from_str(body, "%Y%m%d%H%M%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(body, "%Y%m%d%H%M%S"))
        .ok()?;
    let offset = FixedOffset::east_opt(offset_secs)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_offset(s: &str) -> Option<i32> {
    let (sign, digits) = match s.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (
            digits[..2].parse::<i32>().ok()?,
            digits[2..].parse::<i32>().ok()?,
        ),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}
