// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, error::Error};

use clap::{ArgMatches, Command};
use colored::{Color, Colorize};
use orgdav_caldav::CalDavConfig;
use orgdav_core::{EventRecord, EventStatus, StateFile};

use crate::config::Config;
use crate::table::{PaddingDirection, Table, TableColumn};

#[derive(Debug, Default, Clone, Copy)]
pub struct CmdState;

impl CmdState {
    pub const NAME: &str = "state";

    pub fn command() -> Command {
        Command::new(Self::NAME).about("Show the sync state recorded for the configured calendar")
    }

    pub fn from(_matches: &ArgMatches) -> Self {
        CmdState
    }

    /// Print the persisted event database. Does not contact the calendar.
    pub async fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "showing sync state...");

        let state = state_file(config)?;
        let db = state.load().await?;

        println!("{} {}", "Calendar:".bold(), state.identity());
        println!("{} {}", "State:".bold(), state.path().display());
        if db.is_empty() {
            println!("No events synced yet");
            return Ok(());
        }

        let records = db.to_records();
        let columns = [
            StateColumn::Uid,
            StateColumn::Status,
            StateColumn::Revision,
            StateColumn::Token,
        ];
        println!();
        print!("{}", Table::new(&columns, &records));
        Ok(())
    }
}

fn state_file(config: &Config) -> Result<StateFile, Box<dyn Error>> {
    let save_dir = config
        .core
        .save_dir()
        .ok_or("No save directory configured")?;
    Ok(StateFile::for_calendar(
        save_dir,
        &calendar_identity(&config.caldav),
    ))
}

/// Same identity the client reports, without building an HTTP client.
fn calendar_identity(config: &CalDavConfig) -> String {
    config.calendar_url()
}

#[derive(Debug, Clone, Copy)]
enum StateColumn {
    Uid,
    Status,
    Revision,
    Token,
}

impl TableColumn<EventRecord> for StateColumn {
    fn name(&self) -> Cow<'_, str> {
        match self {
            StateColumn::Uid => "UID",
            StateColumn::Status => "Status",
            StateColumn::Revision => "Rev",
            StateColumn::Token => "ETag",
        }
        .into()
    }

    fn format<'a>(&self, data: &'a EventRecord) -> Cow<'a, str> {
        match self {
            StateColumn::Uid => data.uid().into(),
            StateColumn::Status => data.status().map_or("-", EventStatus::as_str).into(),
            StateColumn::Revision => data
                .revision()
                .map_or_else(|| "-".to_string(), |r| r.to_string())
                .into(),
            StateColumn::Token => data.token().unwrap_or("-").into(),
        }
    }

    fn padding_direction(&self) -> PaddingDirection {
        match self {
            StateColumn::Revision => PaddingDirection::Right,
            _ => PaddingDirection::Left,
        }
    }

    fn color(&self, data: &EventRecord) -> Option<Color> {
        match (self, data.status()) {
            (StateColumn::Status, Some(EventStatus::Synced)) => Some(Color::Green),
            (StateColumn::Status, Some(_)) => Some(Color::Yellow),
            _ => None,
        }
    }
}
