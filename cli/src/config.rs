// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf, str::FromStr};

use orgdav_caldav::CalDavConfig;
use orgdav_core::{APP_NAME, Config as CoreConfig};
use tokio::fs;

const ORGDAV_CONFIG_ENV: &str = "ORGDAV_CONFIG";

/// Configuration of the orgdav application.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// The Org side and the sync policies.
    pub core: CoreConfig,

    /// The calendar to sync with.
    pub caldav: CalDavConfig,
}

impl FromStr for Config {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

/// Locates, reads and normalizes the configuration.
///
/// The file is taken from `path`, then `$ORGDAV_CONFIG`, then the user config directory.
#[tracing::instrument]
pub async fn parse_config(path: Option<PathBuf>) -> Result<Config, Box<dyn Error>> {
    let path = if let Some(path) = path {
        path
    } else if let Ok(env_path) = std::env::var(ORGDAV_CONFIG_ENV) {
        PathBuf::from(env_path)
    } else {
        let config = get_config_dir()?.join(format!("{APP_NAME}/config.toml"));
        if !config.exists() {
            return Err(format!("No config found at: {}", config.display()).into());
        }
        config
    };

    let mut config: Config = fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse()
        .map_err(|e| format!("Invalid config file at {}: {}", path.display(), e))?;
    config.core.normalize()?;

    tracing::debug!(path = %path.display(), calendar = %config.caldav.calendar_url(), "loaded configuration");
    Ok(config)
}

fn get_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(windows)]
    let config_dir = dirs::config_dir();
    config_dir.ok_or_else(|| "User-specific config directory not found".into())
}
