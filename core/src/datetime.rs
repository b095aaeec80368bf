// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, offset::LocalResult};
use chrono_tz::Tz;
use icalendar::{CalendarDateTime, DatePerhapsTime};

/// The time of an event as written in an Org timestamp.
///
/// Org timestamps carry no zone, so every time is a wall-clock time of the system running the
/// sync. Zoned calendar times are converted into it on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventTime {
    /// Date only without time, an all-day event.
    DateOnly(NaiveDate),

    /// Local wall-clock date and time.
    Floating(NaiveDateTime),
}

impl EventTime {
    /// Returns the date part
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::DateOnly(d) => *d,
            EventTime::Floating(dt) => dt.date(),
        }
    }

    /// Returns the time part, if available.
    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            EventTime::DateOnly(_) => None,
            EventTime::Floating(dt) => Some(dt.time()),
        }
    }

    pub fn is_date_only(&self) -> bool {
        matches!(self, EventTime::DateOnly(_))
    }
}

impl From<DatePerhapsTime> for EventTime {
    #[tracing::instrument]
    fn from(dt: DatePerhapsTime) -> Self {
        match dt {
            DatePerhapsTime::DateTime(dt) => match dt {
                CalendarDateTime::Floating(dt) => dt.into(),
                CalendarDateTime::Utc(dt) => dt.into(),
                CalendarDateTime::WithTimezone { date_time, tzid } => match tzid.parse::<Tz>() {
                    Ok(tz) => match tz.from_local_datetime(&date_time) {
                        LocalResult::Single(dt_in_tz) => dt_in_tz.into(),
                        LocalResult::Ambiguous(dt1, _) => {
                            tracing::warn!(tzid, "ambiguous local time, picking earliest");
                            dt1.into()
                        }
                        LocalResult::None => {
                            tracing::warn!(tzid, "invalid local time, falling back to floating");
                            date_time.into()
                        }
                    },
                    Err(_) => {
                        tracing::warn!(tzid, "unknown timezone, treating as floating");
                        date_time.into()
                    }
                },
            },
            DatePerhapsTime::Date(d) => d.into(),
        }
    }
}

impl From<NaiveDate> for EventTime {
    fn from(d: NaiveDate) -> Self {
        EventTime::DateOnly(d)
    }
}

impl From<NaiveDateTime> for EventTime {
    fn from(dt: NaiveDateTime) -> Self {
        EventTime::Floating(dt)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for EventTime {
    fn from(dt: DateTime<Tz>) -> Self {
        EventTime::Floating(dt.with_timezone(&Local).naive_local())
    }
}
