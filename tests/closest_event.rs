//! Pipeline scenarios over a faked calendar service.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use upnext::event::format_event;
use upnext::finder::{EventFinder, LookaheadWindow};
use upnext::remote::{CalendarRef, CalendarSource, RemoteError, RemoteEvent};

/// Fake service: a fixed list of calendars, each either answering with
/// canned events or failing.
#[derive(Default)]
struct FakeService {
    calendars: Vec<(CalendarRef, Option<Vec<RemoteEvent>>)>,
}

impl FakeService {
    fn calendar(mut self, id: &str, events: Vec<RemoteEvent>) -> Self {
        self.calendars.push((CalendarRef::new(id), Some(events)));
        self
    }

    fn failing_calendar(mut self, id: &str) -> Self {
        self.calendars.push((CalendarRef::new(id), None));
        self
    }
}

#[async_trait]
impl CalendarSource for FakeService {
    async fn calendars(&self) -> Result<Vec<CalendarRef>, RemoteError> {
        Ok(self.calendars.iter().map(|(cal, _)| cal.clone()).collect())
    }

    async fn events(
        &self,
        calendar: &CalendarRef,
        _window: &LookaheadWindow,
    ) -> Result<Vec<RemoteEvent>, RemoteError> {
        match self.calendars.iter().find(|(cal, _)| cal == calendar) {
            Some((_, Some(events))) => Ok(events.clone()),
            _ => Err(RemoteError::ListEvents {
                calendar: calendar.id().to_string(),
                message: "connection reset".into(),
            }),
        }
    }
}

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, hour, min, 0).unwrap()
}

fn timed(summary: &str, hour: u32, min: u32) -> RemoteEvent {
    RemoteEvent {
        summary: summary.to_string(),
        start: Some(at(hour, min)),
    }
}

async fn output_line(service: FakeService, now: DateTime<Utc>) -> String {
    let finder = EventFinder::new(service, now);

    match finder.closest_event().await {
        Some(event) => format_event(&event, Some(Tz::UTC)),
        None => "None".to_string(),
    }
}

#[tokio::test]
async fn prints_the_nearest_event_of_the_day() {
    let service = FakeService::default()
        .calendar("A", vec![])
        .calendar(
            "B",
            vec![
                timed("Standup", 9, 0),
                timed("Quarterly Review Meeting", 14, 30),
            ],
        );

    assert_eq!(output_line(service, at(8, 0)).await, "Standup 09:00");
}

#[tokio::test]
async fn truncates_long_titles_once_earlier_events_pass() {
    let service = FakeService::default()
        .calendar("A", vec![])
        .calendar(
            "B",
            vec![
                timed("Standup", 9, 0),
                timed("Quarterly Review Meeting", 14, 30),
            ],
        );

    assert_eq!(output_line(service, at(10, 0)).await, "Quarterly .. 14:30");
}

#[tokio::test]
async fn partial_failure_does_not_suppress_the_result() {
    let service = FakeService::default()
        .failing_calendar("A")
        .calendar("B", vec![timed("Lunch", 12, 0)]);

    assert_eq!(output_line(service, at(8, 0)).await, "Lunch 12:00");
}

#[tokio::test]
async fn no_qualifying_event_prints_the_no_event_marker() {
    let service = FakeService::default()
        .calendar("A", vec![])
        .calendar("B", vec![timed("Standup", 9, 0)]);

    // The only event already started at 10:00.
    assert_eq!(output_line(service, at(10, 30)).await, "None");
}
