// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Org and iCalendar texts shared by the workflow tests.

/// Notes with one synced meeting and a plain heading without a timestamp.
pub const NOTES: &str = "\
#+TITLE: Notes

* Planning meeting <2024-01-10 Wed 10:00-11:00>
:PROPERTIES:
:ID:       meeting-1
:END:
Agenda for the quarter.
* Groceries
Milk and eggs.
";

/// Notes with two timestamped entries, one of them tagged private.
#[allow(dead_code)]
pub const NOTES_WITH_PRIVATE: &str = "\
* Dentist
:PROPERTIES:
:ID:       dentist-1
:END:
<2024-02-01 Thu 09:30-10:00>
* Diary <2024-02-02 Fri>  :private:
:PROPERTIES:
:ID:       diary-1
:END:
";

/// Returns `text` with the meeting title replaced.
#[allow(dead_code)]
pub fn retitle(text: &str, title: &str) -> String {
    text.replace("* Planning meeting <", &format!("* {title} <"))
}

/// Returns `text` without the meeting entry.
#[allow(dead_code)]
pub fn without_meeting(text: &str) -> String {
    let start = text
        .find("* Planning meeting")
        .expect("fixture should contain the meeting");
    let end = text[start..]
        .find("* Groceries")
        .map_or(text.len(), |i| start + i);
    format!("{}{}", &text[..start], &text[end..])
}

/// A calendar event with floating times, as another client would upload it.
#[allow(dead_code)]
pub fn event_ics(uid: &str, summary: &str, start: &str, end: &str, sequence: u32) -> String {
    format!(
        "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example Corp.//Phone Calendar//EN\r\n\
BEGIN:VEVENT\r\n\
UID:{uid}\r\n\
DTSTAMP:20240101T000000Z\r\n\
DTSTART:{start}\r\n\
DTEND:{end}\r\n\
SEQUENCE:{sequence}\r\n\
SUMMARY:{summary}\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n"
    )
}
