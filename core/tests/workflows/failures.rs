// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Transfer failures and unreachable calendars.

use orgdav_core::{EventStatus, SyncAction, SyncError};

use crate::common::{MemoryCalendar, NOTES, Workspace, assert_actions, assert_synced};

#[tokio::test]
async fn failed_push_is_forgotten_and_retried() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    calendar.fail_puts_for("meeting-1");

    // Act
    let failed = ws.sync(&calendar).await.unwrap();

    // Assert
    assert_actions(&failed, "meeting-1", &[SyncAction::Error]);
    let outcome = failed.for_uid("meeting-1").next().unwrap();
    assert_eq!(outcome.status, EventStatus::NewInLocal);
    assert!(
        outcome.detail.as_deref().unwrap().contains("upload failed"),
        "{outcome:?}"
    );
    assert!(failed.has_errors());
    assert!(ws.db(&calendar).await.find("meeting-1").is_none());
    assert!(calendar.uids().is_empty());

    // Act again once the calendar accepts uploads.
    calendar.clear_failures();
    let retried = ws.sync(&calendar).await.unwrap();

    // Assert
    assert_actions(&retried, "meeting-1", &[SyncAction::Pushed]);
    assert_eq!(
        retried.for_uid("meeting-1").next().unwrap().status,
        EventStatus::NewInLocal
    );
    assert_synced(&ws.db(&calendar).await, "meeting-1", 1);
}

#[tokio::test]
async fn upload_missing_on_confirm_fetch_is_treated_as_failed() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    calendar.lose_puts_for("meeting-1");

    // Act
    let lost = ws.sync(&calendar).await.unwrap();

    // Assert
    assert_eq!(calendar.put_count(), 1);
    assert_actions(&lost, "meeting-1", &[SyncAction::Error]);
    let outcome = lost.for_uid("meeting-1").next().unwrap();
    assert!(
        outcome.detail.as_deref().unwrap().contains("confirm fetch failed"),
        "{outcome:?}"
    );
    assert!(ws.db(&calendar).await.find("meeting-1").is_none());

    // Act again once uploads are stored.
    calendar.clear_failures();
    let retried = ws.sync(&calendar).await.unwrap();

    // Assert
    assert_actions(&retried, "meeting-1", &[SyncAction::Pushed]);
    assert_eq!(
        retried.for_uid("meeting-1").next().unwrap().status,
        EventStatus::NewInLocal
    );
    assert_synced(&ws.db(&calendar).await, "meeting-1", 1);
}

#[tokio::test]
async fn unreachable_calendar_leaves_everything_untouched() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    calendar.set_offline(true);

    // Act
    let result = ws.sync(&calendar).await;

    // Assert
    assert!(matches!(result, Err(SyncError::Connectivity(_))), "{result:?}");
    assert!(!ws.state_for(&calendar).path().exists());
    assert_eq!(ws.notes_text().await, NOTES);
    assert_eq!(calendar.put_count(), 0);
}

#[tokio::test]
async fn unreadable_remote_event_is_reported_and_retried() {
    // Arrange
    let ws = Workspace::new("").await;
    let calendar = MemoryCalendar::new();
    calendar.insert("broken-1", "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n");

    // Act
    let report = ws.sync(&calendar).await.unwrap();

    // Assert
    assert_actions(&report, "broken-1", &[SyncAction::Error]);
    assert!(ws.db(&calendar).await.find("broken-1").is_none());
    assert!(ws.inbox_text().await.is_empty());

    let again = ws.sync(&calendar).await.unwrap();
    assert_actions(&again, "broken-1", &[SyncAction::Error]);
}
