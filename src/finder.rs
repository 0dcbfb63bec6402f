//! The event pipeline: fetch everything in the next 24 hours, keep what
//! qualifies, pick the nearest.

use chrono::{DateTime, Duration, Utc};
use tracing::error;

use crate::event::{display_title, Event};
use crate::remote::{CalendarRef, CalendarSource, RemoteError, RemoteEvent};

/// Most events kept per calendar.
pub const MAX_EVENTS_PER_CALENDAR: usize = 10;

/// The fixed query window `[from, from + 24h)`, established once at
/// process start. A long run keeps filtering against the captured `from`,
/// not the current time.
#[derive(Debug, Clone)]
pub struct LookaheadWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl LookaheadWindow {
    pub fn starting(now: DateTime<Utc>) -> Self {
        LookaheadWindow {
            from: now,
            to: now + Duration::hours(24),
        }
    }

    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339()
    }
}

/// Finds the nearest upcoming event across every calendar of the account.
pub struct EventFinder<S> {
    source: S,
    window: LookaheadWindow,
}

impl<S: CalendarSource> EventFinder<S> {
    /// `now` is injected and captured once; see [`LookaheadWindow`].
    pub fn new(source: S, now: DateTime<Utc>) -> Self {
        EventFinder {
            source,
            window: LookaheadWindow::starting(now),
        }
    }

    /// Qualifying events of one calendar, ordered by start time.
    pub async fn events_for_calendar(
        &self,
        calendar: &CalendarRef,
    ) -> Result<Vec<Event>, RemoteError> {
        let remote = self.source.events(calendar, &self.window).await?;

        let mut events: Vec<Event> = remote
            .into_iter()
            .filter_map(|raw| self.qualify(raw))
            .collect();

        events.sort_by_key(|event| event.start);
        events.truncate(MAX_EVENTS_PER_CALENDAR);

        Ok(events)
    }

    fn qualify(&self, raw: RemoteEvent) -> Option<Event> {
        // All-day events carry no start instant.
        let start = raw.start?;

        // The service window may still include already-started events.
        if start < self.window.from {
            return None;
        }

        Some(Event {
            title: display_title(&raw.summary),
            start,
        })
    }

    /// Events across every calendar, concatenated in calendar order.
    ///
    /// Absent when the calendar list itself is unavailable or empty. A
    /// calendar whose event listing fails is logged and contributes zero
    /// events; it never aborts the remaining calendars.
    pub async fn all_events(&self) -> Option<Vec<Event>> {
        let calendars = match self.source.calendars().await {
            Ok(calendars) => calendars,
            Err(err) => {
                error!("{err}");
                return None;
            }
        };

        if calendars.is_empty() {
            return None;
        }

        let mut events = Vec::new();

        for calendar in &calendars {
            match self.events_for_calendar(calendar).await {
                Ok(batch) => events.extend(batch),
                Err(err) => error!("{err}"),
            }
        }

        Some(events)
    }

    /// The single event with the minimum start time across all calendars.
    ///
    /// Ties keep the concatenation order (stable sort).
    pub async fn closest_event(&self) -> Option<Event> {
        let mut events = self.all_events().await?;

        if events.is_empty() {
            return None;
        }

        events.sort_by_key(|event| event.start);
        events.into_iter().next()
    }
}
