// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Conversion between event fields and iCalendar resources.

use chrono::{TimeDelta, Utc};
use icalendar::{
    Calendar, Component, DatePerhapsTime, EventLike, Property, ValueType,
    parser::{read_calendar, unfold},
};

use crate::EventTime;

const PRODID: &str = "-//orgdav//orgdav//EN";

/// The calendar-relevant content of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    /// Event title, the Org heading text.
    pub title: String,

    pub start: EventTime,

    /// Inclusive end. For all-day events this is the last day of the event.
    pub end: Option<EventTime>,

    /// Free text, the Org entry body.
    pub body: String,
}

/// An event decoded from a calendar resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEvent {
    pub uid: String,
    pub fields: EventFields,
    /// The iCalendar `SEQUENCE`, if the resource carries one.
    pub revision: Option<u32>,
}

/// Errors raised while decoding a calendar resource.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to parse iCalendar data: {0}")]
    Parse(String),

    #[error("no VEVENT component in calendar resource")]
    NoEvent,

    #[error("missing {0} property")]
    MissingProperty(&'static str),

    #[error("invalid {0} value")]
    InvalidValue(&'static str),
}

/// Decodes the first non-override `VEVENT` of an iCalendar resource.
pub fn decode(blob: &str) -> Result<RemoteEvent, CodecError> {
    let unfolded = unfold(blob);
    let calendar = read_calendar(&unfolded).map_err(|e| CodecError::Parse(e.to_string()))?;
    let vevent = calendar
        .components
        .iter()
        .find(|c| c.name == "VEVENT" && c.find_prop("RECURRENCE-ID").is_none())
        .ok_or(CodecError::NoEvent)?;

    let uid = vevent
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .ok_or(CodecError::MissingProperty("UID"))?;
    let title = vevent
        .find_prop("SUMMARY")
        .map(|p| unescape_text(p.val.as_ref()))
        .unwrap_or_default();
    let body = vevent
        .find_prop("DESCRIPTION")
        .map(|p| unescape_text(p.val.as_ref()))
        .unwrap_or_default();

    let start_prop = vevent
        .find_prop("DTSTART")
        .ok_or(CodecError::MissingProperty("DTSTART"))?;
    let start: EventTime = DatePerhapsTime::try_from(start_prop)
        .map_err(|_| CodecError::InvalidValue("DTSTART"))?
        .into();

    let end = match vevent.find_prop("DTEND") {
        Some(prop) => Some(
            DatePerhapsTime::try_from(prop)
                .map_err(|_| CodecError::InvalidValue("DTEND"))?
                .into(),
        ),
        None => match vevent.find_prop("DURATION") {
            Some(prop) => {
                let end = parse_duration(prop.val.as_ref())
                    .and_then(|duration| add_duration(start, duration))
                    .ok_or(CodecError::InvalidValue("DURATION"))?;
                Some(end)
            }
            None => None,
        },
    };

    let revision = vevent
        .find_prop("SEQUENCE")
        .and_then(|p| p.val.as_ref().trim().parse().ok());

    Ok(RemoteEvent {
        uid,
        fields: EventFields {
            title,
            start,
            end: inclusive_end(start, end),
            body,
        },
        revision,
    })
}

/// Encodes an event as a complete iCalendar resource carrying `revision` as its `SEQUENCE`.
pub fn encode(uid: &str, fields: &EventFields, revision: u32) -> String {
    let mut event = icalendar::Event::new();
    event.uid(uid);
    event.summary(&fields.title);
    event.add_property("DTSTAMP", Utc::now().format("%Y%m%dT%H%M%SZ").to_string());
    event.add_property("SEQUENCE", revision.to_string());

    add_time_property(&mut event, "DTSTART", &fields.start);
    if let Some(end) = exclusive_end(fields.start, fields.end) {
        add_time_property(&mut event, "DTEND", &end);
    }

    if !fields.body.is_empty() {
        event.description(&fields.body);
    }

    let mut calendar = Calendar::new();
    calendar.push(event.done());
    let calendar = calendar.done();

    calendar
        .to_string()
        .lines()
        .map(|line| {
            if line.starts_with("PRODID:") {
                format!("PRODID:{PRODID}\r\n")
            } else {
                format!("{line}\r\n")
            }
        })
        .collect()
}

fn add_time_property(event: &mut icalendar::Event, name: &str, time: &EventTime) {
    match time {
        EventTime::DateOnly(d) => {
            let mut prop = Property::new(name, d.format("%Y%m%d").to_string());
            prop.append_parameter(ValueType::Date);
            event.append_property(prop);
        }
        EventTime::Floating(dt) => match local_tzid() {
            Some(tzid) => {
                let mut prop = Property::new(name, dt.format("%Y%m%dT%H%M%S").to_string());
                prop.add_parameter("TZID", &tzid);
                event.append_property(prop);
            }
            None => {
                tracing::warn!("failed to get timezone, writing floating time");
                event.add_property(name, dt.format("%Y%m%dT%H%M%S").to_string());
            }
        },
    }
}

fn local_tzid() -> Option<String> {
    let tzid = iana_time_zone::get_timezone().ok()?;
    tzid.parse::<chrono_tz::Tz>().ok().map(|_| tzid)
}

/// All-day `DTEND` is exclusive; a one-day event ends on the following day.
fn exclusive_end(start: EventTime, end: Option<EventTime>) -> Option<EventTime> {
    match (start, end) {
        (EventTime::DateOnly(s), None) => s.succ_opt().map(EventTime::DateOnly),
        (EventTime::DateOnly(_), Some(EventTime::DateOnly(e))) => {
            e.succ_opt().map(EventTime::DateOnly)
        }
        (_, end) => end,
    }
}

fn inclusive_end(start: EventTime, end: Option<EventTime>) -> Option<EventTime> {
    match (start, end) {
        (EventTime::DateOnly(s), Some(EventTime::DateOnly(e))) => {
            let last = e.pred_opt().unwrap_or(e);
            (last > s).then_some(EventTime::DateOnly(last))
        }
        (_, Some(end)) if end == start => None,
        (_, end) => end,
    }
}

/// `None` if the end falls outside the representable range.
fn add_duration(start: EventTime, duration: TimeDelta) -> Option<EventTime> {
    match start {
        EventTime::DateOnly(d) => d.checked_add_signed(duration).map(EventTime::DateOnly),
        EventTime::Floating(dt) => dt.checked_add_signed(duration).map(EventTime::Floating),
    }
}

/// Parses an RFC 5545 duration such as `PT1H30M` or `P2D`.
fn parse_duration(value: &str) -> Option<TimeDelta> {
    let value = value.trim();
    let (negative, value) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let value = value.strip_prefix('P')?;

    let mut total = TimeDelta::zero();
    let mut number = String::new();
    let mut in_time = false;
    for c in value.chars() {
        match c {
            'T' => in_time = true,
            '0'..='9' => number.push(c),
            unit => {
                let n: i64 = number.parse().ok()?;
                number.clear();
                let part = match (unit, in_time) {
                    ('W', false) => TimeDelta::try_weeks(n)?,
                    ('D', false) => TimeDelta::try_days(n)?,
                    ('H', true) => TimeDelta::try_hours(n)?,
                    ('M', true) => TimeDelta::try_minutes(n)?,
                    ('S', true) => TimeDelta::try_seconds(n)?,
                    _ => return None,
                };
                total = total.checked_add(&part)?;
            }
        }
    }
    if !number.is_empty() {
        return None;
    }

    Some(if negative { -total } else { total })
}

/// Reverses RFC 5545 text escaping: `\,` `\;` `\\` and `\n`.
fn unescape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some(&next @ (',' | ';' | '\\')) => {
                result.push(next);
                chars.next();
            }
            Some('n' | 'N') => {
                result.push('\n');
                chars.next();
            }
            _ => result.push(c),
        }
    }

    result
}
