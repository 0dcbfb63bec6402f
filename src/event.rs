//! The event representation the finder works with.

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;

/// Longest title rendered as-is; anything longer is cut and marked.
pub const TITLE_LIMIT: usize = 10;

/// Shown when the service omits an event title.
pub const UNTITLED: &str = "(No title)";

/// A timed calendar event: display title plus a concrete start instant.
///
/// All-day events never become an `Event`; they have no start instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub title: String,
    pub start: DateTime<Utc>,
}

/// Build the display title for a raw summary.
///
/// Missing titles get the [`UNTITLED`] placeholder. Titles longer than
/// [`TITLE_LIMIT`] characters become the first [`TITLE_LIMIT`] characters
/// followed by two `.` markers. Counts characters, not bytes.
pub fn display_title(summary: &str) -> String {
    if summary.is_empty() {
        return UNTITLED.to_string();
    }

    if summary.chars().count() <= TITLE_LIMIT {
        return summary.to_string();
    }

    let head: String = summary.chars().take(TITLE_LIMIT).collect();
    format!("{head}..")
}

/// Render an event as `"<title> <HH:MM>"` on a 24-hour clock, no date
/// component, no zone marker.
///
/// The time-of-day is taken in `tz` when configured, otherwise in the
/// system-local zone.
pub fn format_event(event: &Event, tz: Option<Tz>) -> String {
    let time = match tz {
        Some(tz) => event.start.with_timezone(&tz).format("%H:%M").to_string(),
        None => event.start.with_timezone(&Local).format("%H:%M").to_string(),
    };

    format!("{} {}", event.title, time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Tz;

    #[test]
    fn short_titles_pass_through() {
        assert_eq!(display_title("Standup"), "Standup");
        assert_eq!(display_title("exactly10!"), "exactly10!");
    }

    #[test]
    fn long_titles_are_cut_to_twelve_chars() {
        let title = display_title("Quarterly Review Meeting");
        assert_eq!(title, "Quarterly ..");
        assert_eq!(title.chars().count(), TITLE_LIMIT + 2);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(display_title("Überplanungstreffen"), "Überplanun..");
    }

    #[test]
    fn missing_title_gets_placeholder() {
        assert_eq!(display_title(""), UNTITLED);
    }

    #[test]
    fn formats_title_and_time_of_day() {
        let event = Event {
            title: "Standup".to_string(),
            start: Utc.with_ymd_and_hms(2024, 5, 14, 9, 0, 0).unwrap(),
        };

        assert_eq!(format_event(&event, Some(Tz::UTC)), "Standup 09:00");
    }

    #[test]
    fn formats_in_the_display_timezone() {
        let event = Event {
            title: "Lunch".to_string(),
            start: Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(),
        };

        assert_eq!(
            format_event(&event, Some(chrono_tz::Europe::Madrid)),
            "Lunch 13:00"
        );
    }
}
