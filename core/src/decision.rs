// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use serde::Deserialize;

/// How much of a remote change is written back into an existing Org entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncChangesMode {
    /// Only the heading title.
    TitleOnly,
    /// Only the active timestamp.
    TimestampOnly,
    /// Heading title and active timestamp.
    #[default]
    TitleAndTimestamp,
    /// Title, timestamp and the entry body.
    All,
}

impl SyncChangesMode {
    pub const fn updates_title(self) -> bool {
        matches!(self, Self::TitleOnly | Self::TitleAndTimestamp | Self::All)
    }

    pub const fn updates_timestamp(self) -> bool {
        matches!(self, Self::TimestampOnly | Self::TitleAndTimestamp | Self::All)
    }

    pub const fn updates_body(self) -> bool {
        matches!(self, Self::All)
    }
}

/// Whether a deletion observed on one side is carried over to the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletionPolicy {
    /// Ask the [`DeletionDecider`] for every event.
    #[default]
    Ask,
    /// Never delete; keep the surviving copy.
    Never,
    /// Always delete without asking.
    Always,
}

impl DeletionPolicy {
    /// Resolves the policy for one event, consulting `decider` only under [`DeletionPolicy::Ask`].
    pub fn allows(self, decider: &mut dyn DeletionDecider, request: &DeletionRequest) -> bool {
        match self {
            DeletionPolicy::Always => true,
            DeletionPolicy::Never => false,
            DeletionPolicy::Ask => decider.confirm(request),
        }
    }
}

/// Which store an event would be deleted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionTarget {
    /// The Org files; the event disappeared from the calendar.
    Local,
    /// The calendar; the event disappeared from the Org files.
    Remote,
}

impl fmt::Display for DeletionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionTarget::Local => f.write_str("Org files"),
            DeletionTarget::Remote => f.write_str("calendar"),
        }
    }
}

/// A pending deletion presented to a [`DeletionDecider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub uid: String,
    /// The event title when it is still known.
    pub title: Option<String>,
    pub target: DeletionTarget,
}

/// Decides whether a pending deletion goes ahead.
pub trait DeletionDecider {
    fn confirm(&mut self, request: &DeletionRequest) -> bool;
}

/// A decider that answers every request the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDecision(pub bool);

impl DeletionDecider for FixedDecision {
    fn confirm(&mut self, _request: &DeletionRequest) -> bool {
        self.0
    }
}

impl<F> DeletionDecider for F
where
    F: FnMut(&DeletionRequest) -> bool,
{
    fn confirm(&mut self, request: &DeletionRequest) -> bool {
        self(request)
    }
}
