// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::SyncError;

/// Classification of an event during a synchronization run.
///
/// A record without a status has not been classified yet in the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventStatus {
    /// Present in Org, never pushed before.
    NewInLocal,
    /// Present in Org, its text changed since the last sync.
    ChangedInLocal,
    /// Present in Org and unchanged; not yet confirmed on the calendar.
    InLocal,
    /// Present on the calendar, unknown to the database.
    NewInRemote,
    /// Present on the calendar with a different entity tag than recorded.
    ChangedInRemote,
    /// Known to the database, but gone from the Org files.
    DeletedInLocal,
    /// Present in Org and unchanged, but gone from the calendar.
    DeletedInRemote,
    /// Identical on both sides.
    Synced,
    /// Transferring the event failed in this run.
    Error,
}

impl EventStatus {
    /// Returns the kebab-case name used in the state file and the report.
    pub const fn as_str(self) -> &'static str {
        match self {
            EventStatus::NewInLocal => "new-in-local",
            EventStatus::ChangedInLocal => "changed-in-local",
            EventStatus::InLocal => "in-local",
            EventStatus::NewInRemote => "new-in-remote",
            EventStatus::ChangedInRemote => "changed-in-remote",
            EventStatus::DeletedInLocal => "deleted-in-local",
            EventStatus::DeletedInRemote => "deleted-in-remote",
            EventStatus::Synced => "synced",
            EventStatus::Error => "error",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sync metadata about one event, keyed by its uid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    revision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<EventStatus>,
}

impl EventRecord {
    /// The unique identifier shared by the Org entry and the calendar resource.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Digest of the Org entry text when it was last observed.
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// Entity tag of the calendar resource when it was last observed.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Revision (iCalendar `SEQUENCE`) of the last pushed or pulled version.
    pub fn revision(&self) -> Option<u32> {
        self.revision
    }

    pub fn status(&self) -> Option<EventStatus> {
        self.status
    }

    pub fn set_fingerprint(&mut self, fingerprint: Option<String>) {
        self.fingerprint = fingerprint;
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn set_revision(&mut self, revision: Option<u32>) {
        self.revision = revision;
    }

    pub fn set_status(&mut self, status: Option<EventStatus>) {
        self.status = status;
    }
}

/// The in-memory table of [`EventRecord`]s, unique by uid.
///
/// Records keep their insertion order so the persisted state is stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDb {
    records: IndexMap<String, EventRecord>,
}

impl EventDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a database from previously persisted records.
    ///
    /// Statuses are kept as stored; the local scan resets them before use.
    pub fn from_records(records: Vec<EventRecord>) -> Result<Self, SyncError> {
        let mut db = Self::new();
        for record in records {
            if db.records.contains_key(&record.uid) {
                return Err(SyncError::State(format!(
                    "duplicate event uid in state: {}",
                    record.uid
                )));
            }
            db.records.insert(record.uid.clone(), record);
        }
        Ok(db)
    }

    /// Inserts a new record, failing if the uid is already present.
    pub fn add(
        &mut self,
        uid: impl Into<String>,
        fingerprint: Option<String>,
        token: Option<String>,
        revision: Option<u32>,
        status: Option<EventStatus>,
    ) -> Result<&mut EventRecord, SyncError> {
        let uid = uid.into();
        match self.records.entry(uid) {
            indexmap::map::Entry::Occupied(entry) => Err(SyncError::Invariant(format!(
                "event {} is already tracked",
                entry.key()
            ))),
            indexmap::map::Entry::Vacant(entry) => {
                let uid = entry.key().clone();
                Ok(entry.insert(EventRecord {
                    uid,
                    fingerprint,
                    token,
                    revision,
                    status,
                }))
            }
        }
    }

    pub fn find(&self, uid: &str) -> Option<&EventRecord> {
        self.records.get(uid)
    }

    pub fn find_mut(&mut self, uid: &str) -> Option<&mut EventRecord> {
        self.records.get_mut(uid)
    }

    /// Returns every record whose status equals `status`, in insertion order.
    pub fn filter(&self, status: Option<EventStatus>) -> Vec<&EventRecord> {
        self.records
            .values()
            .filter(|record| record.status == status)
            .collect()
    }

    /// Returns the uids of every record whose status is one of `statuses`.
    ///
    /// The returned list is owned, so the caller may mutate or remove records while walking it.
    pub fn uids_with(&self, statuses: &[EventStatus]) -> Vec<String> {
        self.records
            .values()
            .filter(|record| record.status.is_some_and(|s| statuses.contains(&s)))
            .map(|record| record.uid.clone())
            .collect()
    }

    /// Removes a record, keeping the order of the remaining ones.
    pub fn remove(&mut self, uid: &str) -> Option<EventRecord> {
        self.records.shift_remove(uid)
    }

    /// Clears the status of every record, ahead of a new classification pass.
    pub fn reset_statuses(&mut self) {
        for record in self.records.values_mut() {
            record.status = None;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut EventRecord> {
        self.records.values_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copies the records out, in insertion order.
    pub fn to_records(&self) -> Vec<EventRecord> {
        self.records.values().cloned().collect()
    }
}
