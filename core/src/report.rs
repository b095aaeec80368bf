// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::EventStatus;

/// What a sync run did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncAction {
    /// Uploaded to the calendar.
    Pushed,
    /// The transfer failed; the event is retried on the next run.
    Error,
    /// Deleted from the calendar after it vanished from Org.
    RemovedFromCal,
    /// Kept on the calendar although it vanished from Org.
    KeptInCal,
    /// Written as a new entry into the inbox.
    AddedToOrg,
    /// An existing Org entry was updated from the calendar.
    UpdatedInOrg,
    /// Deleted from Org after it vanished from the calendar.
    RemovedFromOrg,
    /// Kept in Org although it vanished from the calendar.
    KeptInOrg,
}

impl SyncAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            SyncAction::Pushed => "pushed",
            SyncAction::Error => "error",
            SyncAction::RemovedFromCal => "removed-from-cal",
            SyncAction::KeptInCal => "kept-in-cal",
            SyncAction::AddedToOrg => "added-to-org",
            SyncAction::UpdatedInOrg => "updated-in-org",
            SyncAction::RemovedFromOrg => "removed-from-org",
            SyncAction::KeptInOrg => "kept-in-org",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub uid: String,
    /// The classification the event had when it was acted on.
    pub status: EventStatus,
    pub action: SyncAction,
    /// Title of the event when known, for display.
    pub title: Option<String>,
    /// Failure detail for [`SyncAction::Error`].
    pub detail: Option<String>,
}

/// The outcome of a sync run, one entry per event that was acted on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub calendar: String,
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn new(calendar: impl Into<String>) -> Self {
        Self {
            calendar: calendar.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: SyncOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of outcomes with the given action.
    pub fn count(&self, action: SyncAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(SyncAction::Error) > 0
    }

    /// Outcomes for one event, in the order they happened.
    pub fn for_uid<'a>(&'a self, uid: &'a str) -> impl Iterator<Item = &'a SyncOutcome> {
        self.outcomes.iter().filter(move |o| o.uid == uid)
    }
}
