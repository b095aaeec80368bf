// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgAction, ArgMatches, Command, arg};
use colored::Colorize;
use orgdav_caldav::CalDavClient;
use orgdav_core::{OrgStore, RemoteStore, StateFile, sync_calendar};

use crate::config::Config;
use crate::prompt;
use crate::report_formatter::ReportFormatter;

#[derive(Debug, Default, Clone, Copy)]
pub struct CmdSync {
    /// Answer yes to every deletion prompt
    pub yes: bool,

    /// Never prompt; deletions configured as `ask` are skipped
    pub no_input: bool,
}

impl CmdSync {
    pub const NAME: &str = "sync";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Sync the Org files with the calendar (the default command)")
            .arg(arg!(-y --yes "Answer yes to every deletion prompt").action(ArgAction::SetTrue))
            .arg(
                arg!(--"no-input" "Never prompt; deletions configured as `ask` are skipped")
                    .action(ArgAction::SetTrue)
                    .conflicts_with("yes"),
            )
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            yes: matches.get_flag("yes"),
            no_input: matches.get_flag("no-input"),
        }
    }

    /// Run one full sync and print what happened.
    pub async fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "syncing...");

        let client = CalDavClient::new(config.caldav.clone())?;
        let save_dir = config
            .core
            .save_dir()
            .ok_or("No save directory configured")?;
        let state = StateFile::for_calendar(save_dir, &client.calendar_identity());

        let mut store = OrgStore::open(
            &config.core.files,
            &config.core.inbox,
            config.core.org_options(),
        )
        .await?;
        let mut decider = prompt::decider(self.yes, self.no_input);

        let report = sync_calendar(
            &mut store,
            &client,
            &state,
            config.core.sync_options(),
            decider.as_mut(),
        )
        .await?;

        print!("{}", ReportFormatter::new(&report).format(&report));
        if report.has_errors() {
            println!(
                "{} failed events are retried on the next sync",
                "Note:".yellow()
            );
        }
        Ok(())
    }
}
