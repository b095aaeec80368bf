// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::ops::Range;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::{EventFields, SyncChangesMode, SyncError};

/// Where an event lives in the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation {
    pub path: PathBuf,
    /// Zero-based line range of the entry, from its heading to the end of its subtree.
    pub lines: Range<usize>,
}

/// The local text store holding one entry per event.
///
/// Edits stay in memory until [`LocalStore::save`] is called.
#[async_trait]
pub trait LocalStore: Send {
    /// Uids of every syncable entry, in file order, without duplicates.
    fn event_uids(&self) -> Vec<String>;

    /// Hex digest of the entry text, used to detect local edits.
    fn fingerprint_of(&self, uid: &str) -> Option<String>;

    /// The calendar-relevant fields of one entry.
    fn export_event(&self, uid: &str) -> Option<EventFields>;

    /// Every syncable entry with its fields.
    fn export_all(&self) -> Vec<(String, EventFields)>;

    /// True if the store holds an entry for `uid` but keeps it out of sync.
    fn is_excluded(&self, _uid: &str) -> bool {
        false
    }

    /// Appends a new entry to the inbox.
    fn write_new_entry(&mut self, uid: &str, fields: &EventFields) -> Result<(), SyncError>;

    /// Updates an existing entry with the parts of `fields` selected by `mode`.
    fn rewrite_entry(
        &mut self,
        uid: &str,
        fields: &EventFields,
        mode: SyncChangesMode,
    ) -> Result<(), SyncError>;

    fn delete_entry(&mut self, uid: &str) -> Result<(), SyncError>;

    fn locate_entry(&self, uid: &str) -> Option<EntryLocation>;

    /// Writes pending edits back.
    async fn save(&mut self) -> Result<(), SyncError>;
}
