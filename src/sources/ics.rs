//! ICS feed source.
//!
//! Fetches each configured ICS subscription over HTTP and normalizes its
//! VEVENTs into canonical events, using the icalendar crate's parser.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    parser::{read_calendar, unfold, Component},
    CalendarDateTime, DatePerhapsTime,
};
use log::{info, warn};

use cityfeed_core::{timefmt, Event, EventSource, FeedConfig, FeedError, FeedResult};

use crate::config::IcsFeedConfig;

pub struct IcsSource {
    feeds: Vec<IcsFeedConfig>,
    city: String,
    tz: Tz,
    display_time_format: String,
    client: reqwest::Client,
}

impl IcsSource {
    pub fn new(config: &FeedConfig, feeds: Vec<IcsFeedConfig>) -> FeedResult<Self> {
        Ok(IcsSource {
            feeds,
            city: config.city.clone(),
            tz: config.tz()?,
            display_time_format: config.display_time_format.clone(),
            client: reqwest::Client::new(),
        })
    }

    async fn fetch_feed(&self, feed: &IcsFeedConfig) -> FeedResult<Vec<Event>> {
        let body = self
            .client
            .get(&feed.ics_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| FeedError::Source {
                name: "ics".to_string(),
                message: format!("{}: {}", feed.ics_url, err),
            })?
            .text()
            .await
            .map_err(|err| FeedError::Source {
                name: "ics".to_string(),
                message: format!("{}: {}", feed.ics_url, err),
            })?;

        Ok(self.parse_feed(&body, feed, Utc::now()))
    }

    /// Parse one ICS document into normalized future events in this city.
    fn parse_feed(&self, content: &str, feed: &IcsFeedConfig, now: DateTime<Utc>) -> Vec<Event> {
        let unfolded = unfold(content);
        let calendar = match read_calendar(&unfolded) {
            Ok(calendar) => calendar,
            Err(err) => {
                warn!("Cannot read ICS feed {}: {}", feed.group_name, err);
                return Vec::new();
            }
        };

        let city = self.city.to_lowercase();
        calendar
            .components
            .iter()
            .filter(|component| component.name == "VEVENT")
            .filter_map(|vevent| self.normalize(vevent, feed))
            .filter(|event| event.location.to_lowercase().contains(&city))
            .filter(|event| event.start_time > now)
            .collect()
    }

    /// Convert one VEVENT into a canonical event. Entries missing a
    /// start or end time are malformed and dropped one at a time.
    fn normalize(&self, vevent: &Component<'_>, feed: &IcsFeedConfig) -> Option<Event> {
        let uid = vevent.find_prop("UID")?.val.to_string();
        let start = self.to_utc(DatePerhapsTime::try_from(vevent.find_prop("DTSTART")?).ok()?)?;
        let end = self.to_utc(DatePerhapsTime::try_from(vevent.find_prop("DTEND")?).ok()?)?;

        let name = vevent
            .find_prop("SUMMARY")
            .map(|p| p.val.to_string())
            .unwrap_or_default();
        let description = vevent
            .find_prop("DESCRIPTION")
            .map(|p| p.val.to_string())
            .unwrap_or_default();
        let location = vevent
            .find_prop("LOCATION")
            .map(|p| p.val.to_string())
            .unwrap_or_default();
        let explicit_url = vevent.find_prop("URL").map(|p| p.val.to_string());

        Some(Event {
            id: trim_after_at(&uid).to_string(),
            name,
            url: event_url(explicit_url, &description, &feed.group_url),
            description,
            location,
            group_id: None,
            group_name: feed.group_name.clone(),
            group_url: feed.group_url.clone(),
            formatted_time: timefmt::format_display_time(start, self.tz, &self.display_time_format),
            start_time: start,
            end_time: end,
            platform: Some("ics".to_string()),
            latitude: None,
            longitude: None,
            rsvp_count: None,
        })
    }

    /// Resolve an ICS timestamp to an instant, reading floating and
    /// zoned times against the relevant timezone and all-day dates as
    /// local midnight.
    fn to_utc(&self, dpt: DatePerhapsTime) -> Option<DateTime<Utc>> {
        match dpt {
            DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Some(dt),
            DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
                local_to_utc(self.tz, naive)
            }
            DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
                let tz: Tz = tzid.parse().ok()?;
                local_to_utc(tz, date_time)
            }
            DatePerhapsTime::Date(date) => local_to_utc(self.tz, date.and_hms_opt(0, 0, 0)?),
        }
    }
}

fn local_to_utc(tz: Tz, naive: chrono::NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}

#[async_trait]
impl EventSource for IcsSource {
    fn name(&self) -> &str {
        "ics"
    }

    async fn fetch(&self) -> FeedResult<Vec<Event>> {
        let mut events = Vec::new();

        for feed in &self.feeds {
            // One unreachable subscription must not sink the others.
            match self.fetch_feed(feed).await {
                Ok(mut feed_events) => events.append(&mut feed_events),
                Err(err) => warn!("Cannot read ICS feed {}: {}", feed.group_name, err),
            }
        }

        info!("Found {} ics events in total", events.len());
        Ok(events)
    }
}

/// Calendar hosts suffix UIDs with `@host`; the stable part is what
/// comes before it.
fn trim_after_at(uid: &str) -> &str {
    uid.split('@').next().unwrap_or(uid)
}

/// Prefer an explicit URL property, then the first URL in the
/// description, then the group page.
fn event_url(explicit: Option<String>, description: &str, group_url: &str) -> String {
    if let Some(url) = explicit {
        if !url.is_empty() {
            return url;
        }
    }
    if let Some(url) = first_url(description) {
        return url.to_string();
    }
    group_url.to_string()
}

fn first_url(text: &str) -> Option<&str> {
    let start = match (text.find("http://"), text.find("https://")) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };

    let rest = &text[start..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '"' || c == '<' || c == '>')
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityfeed_core::FeedConfig;

    const SAMPLE_ICS: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:abc123@calendar.example.com\r\n\
SUMMARY:Hack Night\r\n\
DESCRIPTION:Bring a project. Signup at https://example.com/signup now\r\n\
LOCATION:The Hub\\, Singapore\r\n\
DTSTART:20300807T110000Z\r\n\
DTEND:20300807T130000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:def456@calendar.example.com\r\n\
SUMMARY:Remote Conference\r\n\
LOCATION:Somewhere Else\r\n\
DTSTART:20300808T110000Z\r\n\
DTEND:20300808T130000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:ghi789@calendar.example.com\r\n\
SUMMARY:No Times Listed\r\n\
LOCATION:The Hub\\, Singapore\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn source() -> IcsSource {
        let config = FeedConfig {
            city: "Singapore".to_string(),
            timezone: "Asia/Singapore".to_string(),
            display_time_format: "%d %b %Y, %a, %I:%M %p".to_string(),
            api_version: "1.0".to_string(),
            whitelist_events: Vec::new(),
            blacklist_events: Vec::new(),
            ignore_words_in_duplicate_events: Vec::new(),
            description_overlap_threshold: 5,
        };
        IcsSource::new(
            &config,
            vec![IcsFeedConfig {
                group_name: "Hack & Tell".to_string(),
                group_url: "https://example.com/hack-and-tell".to_string(),
                ics_url: "https://example.com/hack-and-tell/events.ics".to_string(),
            }],
        )
        .unwrap()
    }

    fn feed_config() -> IcsFeedConfig {
        IcsFeedConfig {
            group_name: "Hack & Tell".to_string(),
            group_url: "https://example.com/hack-and-tell".to_string(),
            ics_url: "https://example.com/hack-and-tell/events.ics".to_string(),
        }
    }

    #[test]
    fn test_parse_feed_normalizes_and_filters() {
        let source = source();
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap();

        let events = source.parse_feed(SAMPLE_ICS, &feed_config(), now);

        // The out-of-town event and the one without times are gone.
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.id, "abc123");
        assert_eq!(event.name, "Hack Night");
        assert_eq!(event.group_name, "Hack & Tell");
        assert_eq!(event.platform.as_deref(), Some("ics"));
        // 11:00 UTC renders as 19:00 in Singapore.
        assert_eq!(event.formatted_time, "07 Aug 2030, Wed, 07:00 PM");
    }

    #[test]
    fn test_past_events_are_dropped_at_the_adapter() {
        let source = source();
        let after_everything = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();

        let events = source.parse_feed(SAMPLE_ICS, &feed_config(), after_everything);
        assert!(events.is_empty());
    }

    #[test]
    fn test_unreadable_document_yields_no_events() {
        let source = source();
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap();

        let events = source.parse_feed("definitely not ics", &feed_config(), now);
        assert!(events.is_empty());
    }

    #[test]
    fn test_uid_is_trimmed_at_the_host() {
        assert_eq!(trim_after_at("abc123@calendar.example.com"), "abc123");
        assert_eq!(trim_after_at("no-host-part"), "no-host-part");
    }

    #[test]
    fn test_event_url_fallback_chain() {
        assert_eq!(
            event_url(
                Some("https://example.com/event".to_string()),
                "see https://ignored.example.com",
                "https://example.com/group"
            ),
            "https://example.com/event"
        );
        assert_eq!(
            event_url(None, "signup at https://example.com/signup today", "https://example.com/group"),
            "https://example.com/signup"
        );
        assert_eq!(
            event_url(None, "no links here", "https://example.com/group"),
            "https://example.com/group"
        );
    }
}
