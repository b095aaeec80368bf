// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::io::IsTerminal;

use dialoguer::Confirm;
use orgdav_core::{DeletionDecider, DeletionRequest, DeletionTarget, FixedDecision};

/// Asks on the terminal before each deletion.
#[derive(Debug, Default)]
pub struct ConfirmDecider;

impl DeletionDecider for ConfirmDecider {
    fn confirm(&mut self, request: &DeletionRequest) -> bool {
        let prompt = prompt_text(request);
        match Confirm::new().with_prompt(prompt).default(false).interact() {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(uid = %request.uid, err = %e, "prompt failed, keeping the event");
                false
            }
        }
    }
}

/// Picks how deletions configured as `ask` are answered.
///
/// Without a terminal on stdin there is nobody to ask, so the answer is no.
pub fn decider(yes: bool, no_input: bool) -> Box<dyn DeletionDecider> {
    if yes {
        Box::new(FixedDecision(true))
    } else if no_input || !std::io::stdin().is_terminal() {
        Box::new(FixedDecision(false))
    } else {
        Box::new(ConfirmDecider)
    }
}

fn prompt_text(request: &DeletionRequest) -> String {
    let name = match &request.title {
        Some(title) => format!("\"{title}\" ({})", request.uid),
        None => request.uid.clone(),
    };
    match request.target {
        DeletionTarget::Local => {
            format!("{name} was deleted from the calendar. Delete it from Org too?")
        }
        DeletionTarget::Remote => {
            format!("{name} was deleted from Org. Delete it from the calendar too?")
        }
    }
}
