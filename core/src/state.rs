// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;

use crate::{EventDb, EventRecord, SyncError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    events: Vec<EventRecord>,
}

/// The persisted [`EventDb`] of one calendar.
///
/// Each calendar gets its own file under the save directory, named after a digest of the
/// calendar identity so that syncing several calendars never mixes their records.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
    identity: String,
}

impl StateFile {
    pub fn for_calendar(save_dir: &Path, identity: &str) -> Self {
        let digest = hex::encode(Sha256::digest(identity.as_bytes()));
        Self {
            path: save_dir.join(format!("orgdav-{}.toml", &digest[..10])),
            identity: identity.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Loads the database, or an empty one if the calendar was never synced.
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<EventDb, SyncError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no sync state yet, starting fresh");
                return Ok(EventDb::new());
            }
            Err(e) => return Err(SyncError::State(format!("failed to read state: {e}"))),
        };

        let document: StateDocument = toml::from_str(&content)
            .map_err(|e| SyncError::State(format!("failed to parse state: {e}")))?;
        let db = EventDb::from_records(document.events)?;
        tracing::debug!(count = db.len(), "loaded sync state");
        Ok(db)
    }

    /// Writes the database, replacing the previous state in one step.
    #[tracing::instrument(skip(self, db), fields(path = %self.path.display()))]
    pub async fn save(&self, db: &EventDb) -> Result<(), SyncError> {
        let document = StateDocument {
            events: db.to_records(),
        };
        let body = toml::to_string(&document)
            .map_err(|e| SyncError::State(format!("failed to serialize state: {e}")))?;
        let content = format!(
            "# orgdav sync state, do not edit\n# calendar: {}\n\n{body}",
            self.identity
        );

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| SyncError::State(format!("failed to create {}: {e}", dir.display())))?;
        }

        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content)
            .await
            .map_err(|e| SyncError::State(format!("failed to write state: {e}")))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| SyncError::State(format!("failed to replace state: {e}")))?;

        tracing::debug!(count = db.len(), "saved sync state");
        Ok(())
    }
}
