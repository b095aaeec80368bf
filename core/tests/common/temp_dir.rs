// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! A throwaway Org directory with its own sync state.

use std::path::PathBuf;

use orgdav_core::{
    DeletionDecider, EventDb, FixedDecision, OrgOptions, OrgStore, RemoteStore, StateFile,
    SyncError, SyncOptions, SyncReport, sync_calendar,
};
use tempfile::TempDir;
use tokio::fs;

/// One notes file, one inbox and a state directory inside a temporary directory.
///
/// Every sync opens the files from disk again, the way separate command invocations do.
#[derive(Debug)]
pub struct Workspace {
    _dir: TempDir,
    pub notes: PathBuf,
    pub inbox: PathBuf,
    pub save_dir: PathBuf,
    pub options: OrgOptions,
}

#[allow(dead_code)]
impl Workspace {
    pub async fn new(notes: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let notes_path = dir.path().join("notes.org");
        fs::write(&notes_path, notes).await.unwrap();
        Self {
            notes: notes_path,
            inbox: dir.path().join("inbox.org"),
            save_dir: dir.path().join("state"),
            options: OrgOptions::default(),
            _dir: dir,
        }
    }

    pub fn state_for(&self, remote: &dyn RemoteStore) -> StateFile {
        StateFile::for_calendar(&self.save_dir, &remote.calendar_identity())
    }

    pub async fn open(&self) -> OrgStore {
        OrgStore::open(
            std::slice::from_ref(&self.notes),
            &self.inbox,
            self.options.clone(),
        )
        .await
        .unwrap()
    }

    /// Syncs with default policies, answering yes to every deletion prompt.
    pub async fn sync(&self, remote: &dyn RemoteStore) -> Result<SyncReport, SyncError> {
        self.sync_with(remote, SyncOptions::default(), &mut FixedDecision(true))
            .await
    }

    pub async fn sync_with(
        &self,
        remote: &dyn RemoteStore,
        options: SyncOptions,
        decider: &mut dyn DeletionDecider,
    ) -> Result<SyncReport, SyncError> {
        let mut store = self.open().await;
        let state = self.state_for(remote);
        sync_calendar(&mut store, remote, &state, options, decider).await
    }

    pub async fn db(&self, remote: &dyn RemoteStore) -> EventDb {
        self.state_for(remote).load().await.unwrap()
    }

    pub async fn state_text(&self, remote: &dyn RemoteStore) -> String {
        fs::read_to_string(self.state_for(remote).path())
            .await
            .unwrap()
    }

    pub async fn notes_text(&self) -> String {
        fs::read_to_string(&self.notes).await.unwrap()
    }

    pub async fn write_notes(&self, text: &str) {
        fs::write(&self.notes, text).await.unwrap();
    }

    /// The inbox text, empty when nothing was written to it yet.
    pub async fn inbox_text(&self) -> String {
        fs::read_to_string(&self.inbox).await.unwrap_or_default()
    }
}
