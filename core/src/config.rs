// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::{Path, PathBuf};

use crate::{DeletionPolicy, OrgOptions, SyncChangesMode, SyncOptions};

/// The name of the orgdav application.
pub const APP_NAME: &str = "orgdav";

/// Configuration of the Org side of a sync.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Org files scanned for events.
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Org file receiving events created on the calendar. Always scanned too.
    pub inbox: PathBuf,

    /// Which parts of an Org entry a calendar change rewrites.
    #[serde(default)]
    pub sync_changes_to_org: SyncChangesMode,

    /// What to do with Org entries whose event was deleted on the calendar.
    #[serde(default)]
    pub delete_org_entries: DeletionPolicy,

    /// What to do with calendar events whose Org entry was deleted.
    #[serde(default = "default_delete_calendar_entries")]
    pub delete_calendar_entries: DeletionPolicy,

    /// Directory holding the sync state files.
    #[serde(default)]
    pub save_dir: Option<PathBuf>,

    /// Entries tagged with any of these are not synced.
    #[serde(default)]
    pub exclude_tags: Vec<String>,

    /// File receiving a copy of every entry before it is rewritten or deleted.
    #[serde(default)]
    pub backup_file: Option<PathBuf>,
}

impl Config {
    /// Normalize the configuration.
    pub fn normalize(&mut self) -> Result<(), Box<dyn Error>> {
        for file in &mut self.files {
            *file = expand_path(file)
                .map_err(|e| format!("Failed to expand path {}: {e}", file.display()))?;
        }
        self.inbox = expand_path(&self.inbox)
            .map_err(|e| format!("Failed to expand inbox path: {e}"))?;

        if let Some(backup) = &self.backup_file {
            self.backup_file = Some(
                expand_path(backup).map_err(|e| format!("Failed to expand backup path: {e}"))?,
            );
        }

        // Normalize save directory
        self.save_dir = Some(match &self.save_dir {
            Some(a) => {
                expand_path(a).map_err(|e| format!("Failed to expand save directory path: {e}"))?
            }
            None => get_state_dir()
                .map_err(|e| format!("Failed to get state directory: {e}"))?
                .join(APP_NAME),
        });

        Ok(())
    }

    /// The directory holding the sync state, once normalized.
    pub fn save_dir(&self) -> Option<&Path> {
        self.save_dir.as_deref()
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            sync_changes_to_org: self.sync_changes_to_org,
            delete_org_entries: self.delete_org_entries,
            delete_calendar_entries: self.delete_calendar_entries,
        }
    }

    pub fn org_options(&self) -> OrgOptions {
        OrgOptions {
            exclude_tags: self.exclude_tags.clone(),
            backup_file: self.backup_file.clone(),
        }
    }
}

const fn default_delete_calendar_entries() -> DeletionPolicy {
    DeletionPolicy::Always
}

/// Handle tilde (~) and environment variables in the path
fn expand_path(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path.to_str().ok_or("Invalid path")?;

    // Handle tilde and home directory
    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    // Handle config directories
    let config_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_CONFIG_HOME/", "${XDG_CONFIG_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in config_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_config_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> Result<PathBuf, Box<dyn Error>> {
    dirs::home_dir().ok_or("User-specific home directory not found".into())
}

fn get_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(windows)]
    let config_dir = dirs::config_dir();
    config_dir.ok_or("User-specific home directory not found".into())
}

fn get_state_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let state_dir = xdg::BaseDirectories::new().get_state_home();
    #[cfg(windows)]
    let state_dir = dirs::data_dir();
    state_dir.ok_or("User-specific state directory not found".into())
}
