// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::{Captures, Regex};

use crate::EventTime;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Matches an active timestamp, optionally followed by `--` and a second one.
///
/// Groups: 1 date, 2 time, 3 end time; 4 date, 5 time of the range end.
static ACTIVE_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    let single = r"<(\d{4}-\d{2}-\d{2})(?:\s+[^\s\d>]+)?(?:\s+(\d{1,2}:\d{2})(?:-(\d{1,2}:\d{2}))?)?[^>\n]*>";
    let range_end = r"<(\d{4}-\d{2}-\d{2})(?:\s+[^\s\d>]+)?(?:\s+(\d{1,2}:\d{2}))?[^>\n]*>";
    Regex::new(&format!("{single}(?:--{range_end})?")).expect("active timestamp regex must compile")
});

/// An active Org timestamp such as `<2024-01-10 Wed 10:00-11:00>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrgTimestamp {
    pub start: EventTime,
    /// Inclusive end, `None` for a single point in time or a single day.
    pub end: Option<EventTime>,
}

impl OrgTimestamp {
    pub fn new(start: EventTime, end: Option<EventTime>) -> Self {
        Self {
            start,
            end: normalize_end(start, end),
        }
    }

    /// Finds the first active timestamp in `text`, with its byte range.
    pub fn find(text: &str) -> Option<(Self, Range<usize>)> {
        ACTIVE_TIMESTAMP
            .captures_iter(text)
            .find_map(|caps| Some((Self::from_captures(&caps)?, caps.get(0)?.range())))
    }

    /// Returns the byte ranges of every active timestamp in `text`.
    pub fn spans(text: &str) -> Vec<Range<usize>> {
        ACTIVE_TIMESTAMP.find_iter(text).map(|m| m.range()).collect()
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        let date = parse_date(caps.get(1)?.as_str())?;
        let time = time_group(caps, 2)?;
        let end_time = time_group(caps, 3)?;

        let start = match time {
            Some(t) => EventTime::Floating(date.and_time(t)),
            None => EventTime::DateOnly(date),
        };

        let end = match caps.get(4) {
            Some(m) => {
                let end_date = parse_date(m.as_str())?;
                match time_group(caps, 5)? {
                    Some(t) => Some(EventTime::Floating(end_date.and_time(t))),
                    None => Some(EventTime::DateOnly(end_date)),
                }
            }
            None => end_time.map(|t| EventTime::Floating(date.and_time(t))),
        };

        Some(Self::new(start, end))
    }
}

impl fmt::Display for OrgTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (EventTime::Floating(s), Some(EventTime::Floating(e))) if s.date() == e.date() => {
                write!(
                    f,
                    "<{} {}-{}>",
                    s.date().format("%Y-%m-%d %a"),
                    s.time().format("%H:%M"),
                    e.time().format("%H:%M")
                )
            }
            (start, Some(end)) => write!(f, "{}--{}", Single(start), Single(end)),
            (start, None) => write!(f, "{}", Single(start)),
        }
    }
}

struct Single(EventTime);

impl fmt::Display for Single {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            EventTime::DateOnly(d) => write!(f, "<{}>", d.format("%Y-%m-%d %a")),
            EventTime::Floating(dt) => write!(f, "<{}>", dt.format("%Y-%m-%d %a %H:%M")),
        }
    }
}

/// Makes the end the same kind as the start, and drops ends that add nothing.
fn normalize_end(start: EventTime, end: Option<EventTime>) -> Option<EventTime> {
    let end = match (start, end?) {
        (EventTime::DateOnly(_), e) => EventTime::DateOnly(e.date()),
        (EventTime::Floating(s), EventTime::DateOnly(d)) => EventTime::Floating(d.and_time(s.time())),
        (_, e) => e,
    };
    (end > start).then_some(end)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// `Some(None)` when the group did not match, `None` when it holds an invalid time.
fn time_group(caps: &Captures<'_>, group: usize) -> Option<Option<NaiveTime>> {
    match caps.get(group) {
        Some(m) => Some(Some(parse_time(m.as_str())?)),
        None => Some(None),
    }
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let (h, m) = s.split_once(':')?;
    NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0)
}
