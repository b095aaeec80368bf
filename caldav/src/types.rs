// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Deref;

/// Calendar resource href (path).
///
/// A `Href` represents the path to a calendar resource on a `CalDAV` server,
/// such as `/calendars/user/personal/event1.ics`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Href(String);

impl Href {
    /// Creates a new `Href` from a string.
    #[must_use]
    pub const fn new(href: String) -> Self {
        Self(href)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last non-empty path segment, percent-decoded.
    #[must_use]
    pub fn file_name(&self) -> Option<String> {
        let segment = self.0.trim_end_matches('/').rsplit('/').next()?;
        if segment.is_empty() {
            return None;
        }
        match urlencoding::decode(segment) {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(_) => Some(segment.to_string()),
        }
    }

    /// The event uid encoded in an `<uid>.ics` href, if this is one.
    #[must_use]
    pub fn event_uid(&self) -> Option<String> {
        if self.0.ends_with('/') {
            return None;
        }
        let name = self.file_name()?;
        name.strip_suffix(".ics").map(str::to_string)
    }
}

impl Deref for Href {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Href {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Href {
    fn from(href: String) -> Self {
        Self(href)
    }
}

impl From<&str> for Href {
    fn from(href: &str) -> Self {
        Self(href.to_string())
    }
}

/// Entity tag for change detection.
///
/// An `ETag` represents an entity tag returned by the `CalDAV` server,
/// used for optimistic concurrency control and change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ETag(String);

impl ETag {
    /// Creates a new `ETag` from a string.
    #[must_use]
    pub const fn new(etag: String) -> Self {
        Self(etag)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ETag {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ETag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ETag {
    fn from(etag: String) -> Self {
        Self(etag)
    }
}

impl From<&str> for ETag {
    fn from(etag: &str) -> Self {
        Self(etag.to_string())
    }
}

/// One entry of a calendar collection listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtagEntry {
    /// The href of the resource.
    pub href: Href,
    /// The event uid derived from the href.
    pub uid: String,
    /// The current entity tag of the resource.
    pub etag: ETag,
}

/// A calendar object resource.
///
/// The raw iCalendar text is kept as-is; decoding is left to the caller.
#[derive(Debug, Clone)]
pub struct CalendarResource {
    /// The href of the resource.
    pub href: Href,
    /// The entity tag of the resource, if the server sent one.
    pub etag: Option<ETag>,
    /// The iCalendar data.
    pub data: String,
}

impl CalendarResource {
    /// Creates a new `CalendarResource`.
    #[must_use]
    pub const fn new(href: Href, etag: Option<ETag>, data: String) -> Self {
        Self { href, etag, data }
    }
}
