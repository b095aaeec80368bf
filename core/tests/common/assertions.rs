// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use orgdav_core::{EventDb, EventStatus, SyncAction, SyncReport};

/// Asserts that `uid` is tracked as synced with the given revision.
#[track_caller]
pub fn assert_synced(db: &EventDb, uid: &str, revision: u32) {
    let record = db
        .find(uid)
        .unwrap_or_else(|| panic!("{uid} should be tracked"));
    assert_eq!(record.status(), Some(EventStatus::Synced), "status of {uid}");
    assert_eq!(record.revision(), Some(revision), "revision of {uid}");
    assert!(record.fingerprint().is_some(), "fingerprint of {uid}");
    assert!(record.token().is_some(), "token of {uid}");
}

/// Asserts that the report holds exactly the given actions for `uid`.
#[track_caller]
#[allow(dead_code)]
pub fn assert_actions(report: &SyncReport, uid: &str, expected: &[SyncAction]) {
    let actions: Vec<_> = report.for_uid(uid).map(|o| o.action).collect();
    assert_eq!(actions, expected, "actions for {uid}");
}
