// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Two-way synchronization between Org-mode files and a `CalDAV` calendar.
//!
//! A run classifies every known event with an [`EventStatus`], pushes Org changes to the
//! calendar, pulls calendar changes into the Org files and persists the resulting
//! [`EventDb`]. When both sides changed the same event, the Org side wins.

mod config;
mod datetime;
mod decision;
mod error;
mod event_db;
mod ics;
mod local;
mod org;
mod remote;
mod report;
mod state;
mod sync;

pub use crate::config::{APP_NAME, Config};
pub use crate::datetime::EventTime;
pub use crate::decision::{
    DeletionDecider, DeletionPolicy, DeletionRequest, DeletionTarget, FixedDecision,
    SyncChangesMode,
};
pub use crate::error::SyncError;
pub use crate::event_db::{EventDb, EventRecord, EventStatus};
pub use crate::ics::{CodecError, EventFields, RemoteEvent, decode, encode};
pub use crate::local::{EntryLocation, LocalStore};
pub use crate::org::{OrgOptions, OrgStore, OrgTimestamp};
pub use crate::remote::{ChangeTokens, RemoteStore};
pub use crate::report::{SyncAction, SyncOutcome, SyncReport};
pub use crate::state::StateFile;
pub use crate::sync::{SyncOptions, Synchronizer, sync_calendar};
