use chrono::{DateTime, NaiveDateTime, Utc};

/// Resolve an optional client-supplied ISO-8601 timestamp to Unix epoch
/// seconds, falling back to `now` when the field is absent or unparsable.
///
/// The silent fallback is a business rule: a malformed timestamp from the
/// chat platform must never fail the webhook.
pub fn resolve(timestamp_str: Option<&str>, now: DateTime<Utc>) -> i64 {
    timestamp_str
        .and_then(parse_date)
        .unwrap_or(now)
        .timestamp()
}

/// Parse an ISO-8601 date string. Accepts an explicit offset or a trailing
/// `Z`; a naive datetime without offset is taken as UTC.
fn parse_date(supposed_iso_string: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(supposed_iso_string) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = supposed_iso_string.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn resolves_utc_timestamp_with_trailing_z() {
        assert_eq!(
            resolve(Some("2025-12-22T12:42:00Z"), fixed_now()),
            1766407320
        );
    }

    #[test]
    fn resolves_explicit_offset() {
        // +05:30 is five and a half hours ahead of UTC
        assert_eq!(
            resolve(Some("2025-12-22T18:12:00+05:30"), fixed_now()),
            1766407320
        );
    }

    #[test]
    fn naive_datetime_is_taken_as_utc() {
        assert_eq!(resolve(Some("2025-12-22T12:42:00"), fixed_now()), 1766407320);
    }

    #[test]
    fn unparsable_timestamp_falls_back_to_now() {
        // Deliberate: parse failures are recovered silently, never surfaced
        let now = fixed_now();
        assert_eq!(resolve(Some("not-a-date"), now), now.timestamp());
        assert_eq!(resolve(Some(""), now), now.timestamp());
    }

    #[test]
    fn missing_timestamp_falls_back_to_now() {
        let now = fixed_now();
        assert_eq!(resolve(None, now), now.timestamp());
    }
}
