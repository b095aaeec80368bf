// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt};

use colored::{Color, Colorize};
use orgdav_core::{SyncAction, SyncOutcome, SyncReport};

use crate::table::{Table, TableColumn};

const ACTIONS: [SyncAction; 8] = [
    SyncAction::Pushed,
    SyncAction::AddedToOrg,
    SyncAction::UpdatedInOrg,
    SyncAction::RemovedFromOrg,
    SyncAction::RemovedFromCal,
    SyncAction::KeptInOrg,
    SyncAction::KeptInCal,
    SyncAction::Error,
];

/// Renders a [`SyncReport`] as a table followed by a one-line summary.
#[derive(Debug)]
pub struct ReportFormatter {
    columns: Vec<ReportColumn>,
}

impl ReportFormatter {
    pub fn new(report: &SyncReport) -> Self {
        let mut columns = vec![ReportColumn::Action, ReportColumn::Title, ReportColumn::Uid];
        if report.outcomes.iter().any(|o| o.detail.is_some()) {
            columns.push(ReportColumn::Detail);
        }
        Self { columns }
    }

    pub fn format<'a>(&'a self, report: &'a SyncReport) -> Display<'a> {
        Display {
            report,
            formatter: self,
        }
    }
}

#[derive(Debug)]
pub struct Display<'a> {
    report: &'a SyncReport,
    formatter: &'a ReportFormatter,
}

impl fmt::Display for Display<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.report.is_empty() {
            return writeln!(f, "Nothing to do, {} is in sync.", self.report.calendar);
        }

        write!(
            f,
            "{}",
            Table::new(&self.formatter.columns, &self.report.outcomes)
        )?;

        let summary: Vec<String> = ACTIONS
            .iter()
            .filter_map(|&action| {
                let count = self.report.count(action);
                (count > 0).then(|| format!("{count} {}", describe(action)))
            })
            .collect();
        let summary = summary.join(", ");
        if self.report.has_errors() {
            writeln!(f, "\n{}", summary.red())
        } else {
            writeln!(f, "\n{}", summary.green())
        }
    }
}

fn describe(action: SyncAction) -> &'static str {
    match action {
        SyncAction::Pushed => "pushed",
        SyncAction::AddedToOrg => "added to Org",
        SyncAction::UpdatedInOrg => "updated in Org",
        SyncAction::RemovedFromOrg => "removed from Org",
        SyncAction::RemovedFromCal => "removed from calendar",
        SyncAction::KeptInOrg => "kept in Org",
        SyncAction::KeptInCal => "kept in calendar",
        SyncAction::Error => "failed",
    }
}

#[derive(Debug, Clone, Copy)]
enum ReportColumn {
    Action,
    Title,
    Uid,
    Detail,
}

impl TableColumn<SyncOutcome> for ReportColumn {
    fn name(&self) -> Cow<'_, str> {
        match self {
            ReportColumn::Action => "Action",
            ReportColumn::Title => "Title",
            ReportColumn::Uid => "UID",
            ReportColumn::Detail => "Detail",
        }
        .into()
    }

    fn format<'a>(&self, data: &'a SyncOutcome) -> Cow<'a, str> {
        match self {
            ReportColumn::Action => data.action.as_str().into(),
            ReportColumn::Title => data.title.as_deref().unwrap_or("-").into(),
            ReportColumn::Uid => data.uid.as_str().into(),
            ReportColumn::Detail => data.detail.as_deref().unwrap_or("").into(),
        }
    }

    fn color(&self, data: &SyncOutcome) -> Option<Color> {
        match self {
            ReportColumn::Action => Some(action_color(data.action)),
            ReportColumn::Uid => Some(Color::BrightBlack),
            ReportColumn::Detail => Some(Color::Red),
            ReportColumn::Title => None,
        }
    }
}

fn action_color(action: SyncAction) -> Color {
    match action {
        SyncAction::Pushed => Color::Green,
        SyncAction::AddedToOrg | SyncAction::UpdatedInOrg => Color::Cyan,
        SyncAction::RemovedFromOrg | SyncAction::RemovedFromCal => Color::Magenta,
        SyncAction::KeptInOrg | SyncAction::KeptInCal => Color::Yellow,
        SyncAction::Error => Color::Red,
    }
}
