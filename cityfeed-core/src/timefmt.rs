//! Display-time round trip.
//!
//! `formatted_time` is the user-facing local time string. The merger's
//! future-only filter and the hour view parse it back, so the configured
//! display format must carry the full date (e.g. `%d %b %Y, %a, %I:%M %p`).

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Render an instant as the display string in the given timezone.
pub fn format_display_time(t: DateTime<Utc>, tz: Tz, format: &str) -> String {
    t.with_timezone(&tz).format(format).to_string()
}

/// Parse a display string back to an instant.
///
/// Returns `None` when the string does not match the format or names a
/// nonexistent local time; callers treat such records as malformed and
/// drop them.
pub fn parse_display_time(s: &str, tz: Tz, format: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s, format).ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Singapore;

    const FORMAT: &str = "%d %b %Y, %a, %I:%M %p";

    #[test]
    fn test_format_renders_in_local_time() {
        // 11:00 UTC is 19:00 in Singapore (UTC+8)
        let t = Utc.with_ymd_and_hms(2026, 8, 7, 11, 0, 0).unwrap();
        assert_eq!(
            format_display_time(t, Singapore, FORMAT),
            "07 Aug 2026, Fri, 07:00 PM"
        );
    }

    #[test]
    fn test_parse_round_trips_format() {
        let t = Utc.with_ymd_and_hms(2026, 8, 7, 11, 0, 0).unwrap();
        let display = format_display_time(t, Singapore, FORMAT);
        assert_eq!(parse_display_time(&display, Singapore, FORMAT), Some(t));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_display_time("not a time", Singapore, FORMAT), None);
        assert_eq!(parse_display_time("", Singapore, FORMAT), None);
    }
}
