//! Duplicate-event detection.
//!
//! Two events denote the same real-world occurrence when they display at
//! exactly the same local time and their names, locations and
//! descriptions share enough meaningful words. This is a lexical
//! heuristic: false positives and false negatives are accepted behavior,
//! not errors.

use std::collections::HashSet;

use log::info;

use crate::event::Event;

/// Default minimum description-token overlap for two same-time events to
/// count as duplicates when their names only partially overlap.
pub const DEFAULT_DESCRIPTION_OVERLAP_THRESHOLD: usize = 5;

/// Words that carry no signal for duplicate matching.
const COMMON_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "before", "but", "by", "can", "come", "could", "day", "do", "for", "from", "get", "go",
    "had", "has", "have", "he", "her", "here", "his", "how", "i", "if", "in", "into", "is",
    "it", "its", "just", "like", "make", "me", "more", "most", "my", "new", "no", "not", "now",
    "of", "on", "one", "only", "or", "other", "our", "out", "over", "she", "so", "some",
    "take", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "time", "to", "up", "us", "use", "want", "was", "we", "well", "what", "when", "where",
    "which", "who", "will", "with", "would", "you", "your",
];

/// Settings for the duplicate heuristic, derived from configuration.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    stop_words: HashSet<String>,
    description_overlap_threshold: usize,
}

impl DedupConfig {
    /// Build a dedup config from the configured ignore words and city.
    /// The city name is always treated as a stop word: every local event
    /// mentions it, so it says nothing about sameness.
    pub fn new(ignore_words: &[String], city: &str, description_overlap_threshold: usize) -> Self {
        let mut stop_words: HashSet<String> = COMMON_WORDS.iter().map(|w| w.to_string()).collect();
        stop_words.extend(ignore_words.iter().map(|w| w.to_lowercase()));
        stop_words.insert(city.to_lowercase());

        DedupConfig {
            stop_words,
            description_overlap_threshold,
        }
    }

    /// Decide whether `candidate` duplicates the already-accepted `kept`.
    pub fn is_duplicate(&self, kept: &Event, candidate: &Event) -> bool {
        // Duplicates must display at exactly the same local time.
        if kept.formatted_time != candidate.formatted_time {
            return false;
        }

        if kept.name == candidate.name {
            return true;
        }

        let name_overlap = self.overlap(&kept.name, &candidate.name);
        let location_overlap = self.overlap(&kept.location, &candidate.location);
        let description_overlap = self.overlap(&kept.description, &candidate.description);

        location_overlap > 0
            && (name_overlap > 0 || description_overlap > self.description_overlap_threshold)
    }

    /// Number of meaningful words two texts share.
    fn overlap(&self, a: &str, b: &str) -> usize {
        let tokens_a = self.tokens(a);
        let tokens_b = self.tokens(b);
        tokens_a.intersection(&tokens_b).count()
    }

    /// Meaningful words of a text: case-folded, numbers ignored, stop
    /// words removed, depluralized.
    fn tokens(&self, text: &str) -> HashSet<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter_map(|raw| {
                if raw.is_empty() {
                    return None;
                }
                let lower = raw.to_lowercase();
                if lower.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                if self.stop_words.contains(&lower) {
                    return None;
                }
                let word = depluralize(&lower);
                if self.stop_words.contains(word) {
                    return None;
                }
                Some(word.to_string())
            })
            .collect()
    }
}

/// "talks" -> "talk"; short words like "as" or "its" are left alone.
fn depluralize(word: &str) -> &str {
    match word.strip_suffix('s') {
        Some(stem) if stem.len() >= 3 => stem,
        _ => word,
    }
}

/// Keep each event only if it duplicates none of the previously kept ones.
///
/// First seen in the incoming order wins. The feed is sorted by
/// `start_time` (stably) before this scan, so for a same-start duplicate
/// pair the winner is whichever source's merge ran first. That
/// completion-order dependence across sources is a known, accepted
/// property of the feed.
pub fn remove_duplicates(cfg: &DedupConfig, events: Vec<Event>) -> Vec<Event> {
    let mut unique: Vec<Event> = Vec::with_capacity(events.len());

    for event in events {
        let duplicate = unique.iter().any(|kept| cfg.is_duplicate(kept, &event));
        if duplicate {
            info!("Duplicate event removed: {}", event.url);
        } else {
            unique.push(event);
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn config() -> DedupConfig {
        DedupConfig::new(
            &["meetup".to_string()],
            "Singapore",
            DEFAULT_DESCRIPTION_OVERLAP_THRESHOLD,
        )
    }

    fn event(name: &str, location: &str, description: &str, formatted_time: &str) -> Event {
        Event {
            id: format!("{}-{}", name, formatted_time),
            name: name.to_string(),
            description: description.to_string(),
            location: location.to_string(),
            url: format!("https://example.com/{}", name.replace(' ', "-")),
            group_id: None,
            group_name: "Test Group".to_string(),
            group_url: "https://example.com".to_string(),
            formatted_time: formatted_time.to_string(),
            start_time: Utc.with_ymd_and_hms(2026, 8, 7, 11, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 8, 7, 13, 0, 0).unwrap(),
            platform: None,
            latitude: None,
            longitude: None,
            rsvp_count: None,
        }
    }

    const TIME_A: &str = "07 Aug 2026, Fri, 07:00 PM";
    const TIME_B: &str = "07 Aug 2026, Fri, 09:00 PM";

    #[test]
    fn test_different_display_times_are_never_duplicates() {
        let cfg = config();
        let a = event("Tech Mixer", "The Hub", "Same talk", TIME_A);
        let b = event("Tech Mixer", "The Hub", "Same talk", TIME_B);
        assert!(!cfg.is_duplicate(&a, &b));
    }

    #[test]
    fn test_exact_name_match_short_circuits() {
        let cfg = config();
        let a = event("Tech Mixer", "The Hub", "", TIME_A);
        let b = event("Tech Mixer", "Elsewhere entirely", "", TIME_A);
        assert!(cfg.is_duplicate(&a, &b));
    }

    #[test]
    fn test_overlapping_name_and_location_is_duplicate() {
        // Same venue tokens, names sharing "tech mixer": one must go.
        let cfg = config();
        let a = event("Tech Mixer", "The Hub, Downtown", "", TIME_A);
        let b = event("Tech Mixer SG", "The Hub, Downtown", "", TIME_A);
        assert!(cfg.is_duplicate(&a, &b));
    }

    #[test]
    fn test_no_location_overlap_is_not_duplicate() {
        let cfg = config();
        let a = event("Tech Mixer", "The Hub", "", TIME_A);
        let b = event("Tech Mixer SG", "Community Library", "", TIME_A);
        assert!(!cfg.is_duplicate(&a, &b));
    }

    #[test]
    fn test_description_overlap_must_exceed_default_threshold_of_five() {
        let cfg = config();
        // Disjoint names, shared venue, descriptions sharing exactly 5
        // meaningful words: below the default cutoff.
        let five = "rust compiler borrow checker lifetimes";
        let a = event("Evening Code", "The Hub", five, TIME_A);
        let b = event("Night Build", "The Hub", five, TIME_A);
        assert!(!cfg.is_duplicate(&a, &b));

        // A sixth shared word tips it over.
        let six = "rust compiler borrow checker lifetimes macros";
        let a = event("Evening Code", "The Hub", six, TIME_A);
        let b = event("Night Build", "The Hub", six, TIME_A);
        assert!(cfg.is_duplicate(&a, &b));
    }

    #[test]
    fn test_threshold_is_configurable() {
        let cfg = DedupConfig::new(&[], "Singapore", 2);
        let three = "rust compiler internals";
        let a = event("Evening Code", "The Hub", three, TIME_A);
        let b = event("Night Build", "The Hub", three, TIME_A);
        assert!(cfg.is_duplicate(&a, &b));
    }

    #[test]
    fn test_numbers_city_and_ignore_words_carry_no_overlap() {
        let cfg = config();
        // "2026", "singapore" and "meetup" are all discounted; the names
        // share nothing meaningful.
        let a = event("Gathering 2026 Singapore Meetup", "The Hub", "", TIME_A);
        let b = event("Assembly 2026 Singapore Meetup", "The Hub", "", TIME_A);
        assert!(!cfg.is_duplicate(&a, &b));
    }

    #[test]
    fn test_depluralized_words_overlap() {
        let cfg = config();
        let a = event("Lightning Talks", "The Hub", "", TIME_A);
        let b = event("Talk Lightning Night", "The Hub", "", TIME_A);
        assert!(cfg.is_duplicate(&a, &b));
    }

    #[test]
    fn test_scan_keeps_first_seen_and_is_idempotent() {
        let cfg = config();
        let a = event("Tech Mixer", "The Hub", "", TIME_A);
        let b = event("Tech Mixer SG", "The Hub", "", TIME_A);
        let c = event("Pottery Class", "Art Studio", "", TIME_A);

        let once = remove_duplicates(&cfg, vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(once.len(), 2);
        assert_eq!(once[0].name, "Tech Mixer");
        assert_eq!(once[1].name, "Pottery Class");

        let twice = remove_duplicates(&cfg, once.clone());
        let names: Vec<_> = twice.iter().map(|e| e.name.clone()).collect();
        assert_eq!(
            names,
            once.iter().map(|e| e.name.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_no_residual_duplicates_after_scan() {
        let cfg = config();
        let events = vec![
            event("Tech Mixer", "The Hub", "", TIME_A),
            event("Tech Mixer SG", "The Hub", "", TIME_A),
            event("Tech Mixer", "The Hub", "", TIME_B),
            event("Pottery Class", "Art Studio", "", TIME_A),
        ];

        let unique = remove_duplicates(&cfg, events);
        for i in 0..unique.len() {
            for j in 0..unique.len() {
                if i != j {
                    assert!(!cfg.is_duplicate(&unique[i], &unique[j]));
                }
            }
        }
    }
}
