// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line interface of orgdav.

mod cli;
mod cmd_generate_completion;
mod cmd_state;
mod cmd_sync;
mod config;
mod prompt;
mod report_formatter;
mod table;

pub use crate::cli::{Cli, Commands, run};
pub use crate::config::{Config, parse_config};
