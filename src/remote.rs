//! The calendar service seam.
//!
//! [`CalendarSource`] is the read-only collaborator boundary: the
//! production implementation delegates to the `google-calendar` client,
//! tests substitute fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use google_calendar::types::{MinAccessRole, OrderBy};
use google_calendar::Client;
use thiserror::Error;

use crate::finder::LookaheadWindow;

/// Errors from the two remote read operations.
///
/// The aggregation step folds these to "no events", but callers of the
/// per-call wrappers can still tell a failed call from an empty one.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Failed to list calendars: {0}")]
    ListCalendars(String),

    #[error("Failed to list events for calendar '{calendar}': {message}")]
    ListEvents { calendar: String, message: String },
}

/// Opaque identifier of one calendar visible to the account.
///
/// Re-fetched on every run; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarRef(String);

impl CalendarRef {
    pub fn new(id: impl Into<String>) -> Self {
        CalendarRef(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// A raw service event, before any filtering.
#[derive(Clone, Debug)]
pub struct RemoteEvent {
    /// Raw title; empty when the service omits one.
    pub summary: String,
    /// Start instant. Absent for all-day events, which only carry a date.
    pub start: Option<DateTime<Utc>>,
}

impl RemoteEvent {
    fn from_google(event: google_calendar::types::Event) -> Self {
        RemoteEvent {
            summary: event.summary,
            start: event.start.and_then(|start| start.date_time),
        }
    }
}

/// Read-only view of the calendar service.
#[async_trait]
pub trait CalendarSource {
    /// List the calendars visible to the account, in service order.
    async fn calendars(&self) -> Result<Vec<CalendarRef>, RemoteError>;

    /// List one calendar's events within the window, recurring events
    /// expanded to single instances, ordered by start time.
    async fn events(
        &self,
        calendar: &CalendarRef,
        window: &LookaheadWindow,
    ) -> Result<Vec<RemoteEvent>, RemoteError>;
}

/// Google Calendar as a [`CalendarSource`].
pub struct GoogleCalendar {
    client: Client,
}

impl GoogleCalendar {
    pub fn new(client: Client) -> Self {
        GoogleCalendar { client }
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendar {
    async fn calendars(&self) -> Result<Vec<CalendarRef>, RemoteError> {
        let response = self
            .client
            .calendar_list()
            .list_all(MinAccessRole::default(), false, false)
            .await
            .map_err(|e| RemoteError::ListCalendars(e.to_string()))?;

        Ok(response
            .body
            .into_iter()
            .map(|cal| CalendarRef::new(cal.id))
            .collect())
    }

    async fn events(
        &self,
        calendar: &CalendarRef,
        window: &LookaheadWindow,
    ) -> Result<Vec<RemoteEvent>, RemoteError> {
        let response = self
            .client
            .events()
            .list_all(
                calendar.id(),
                "",
                0,
                OrderBy::StartTime,
                &[],
                "", // search query
                &[],
                false,
                false,
                true, // expand recurring events to single instances
                &window.to_rfc3339(),
                &window.from_rfc3339(),
                "",
                "",
            )
            .await
            .map_err(|e| RemoteError::ListEvents {
                calendar: calendar.id().to_string(),
                message: e.to_string(),
            })?;

        Ok(response
            .body
            .into_iter()
            .map(RemoteEvent::from_google)
            .collect())
    }
}
