// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar-side edits and additions flowing into the Org files.

use orgdav_core::{EventStatus, SyncAction, SyncChangesMode, SyncOptions, decode};

use crate::common::{
    MemoryCalendar, NOTES, Workspace, assert_actions, assert_synced, event_ics, retitle,
};

#[tokio::test]
async fn remote_edit_updates_title_and_time() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    ws.sync(&calendar).await.unwrap();
    calendar.insert(
        "meeting-1",
        event_ics(
            "meeting-1",
            "Moved meeting",
            "20240111T140000",
            "20240111T150000",
            2,
        ),
    );

    // Act
    let report = ws.sync(&calendar).await.unwrap();

    // Assert
    assert_actions(&report, "meeting-1", &[SyncAction::UpdatedInOrg]);
    assert_eq!(
        report.for_uid("meeting-1").next().unwrap().status,
        EventStatus::ChangedInRemote
    );

    let notes = ws.notes_text().await;
    assert!(notes.contains("Moved meeting"), "{notes}");
    assert!(notes.contains("<2024-01-11 Thu 14:00-15:00>"), "{notes}");
    assert!(!notes.contains("Planning meeting"), "{notes}");
    // The body is left alone by the default mode.
    assert!(notes.contains("Agenda for the quarter."), "{notes}");
    assert!(notes.contains("* Groceries"), "{notes}");

    assert_synced(&ws.db(&calendar).await, "meeting-1", 2);
    assert_eq!(calendar.put_count(), 1);
}

#[tokio::test]
async fn pulled_change_is_stable_on_next_sync() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    ws.sync(&calendar).await.unwrap();
    calendar.insert(
        "meeting-1",
        event_ics(
            "meeting-1",
            "Moved meeting",
            "20240111T140000",
            "20240111T150000",
            2,
        ),
    );
    ws.sync(&calendar).await.unwrap();

    // Act
    let report = ws.sync(&calendar).await.unwrap();

    // Assert
    assert!(report.is_empty(), "unexpected actions: {report:?}");
    assert_eq!(calendar.put_count(), 1);
}

#[tokio::test]
async fn title_only_mode_keeps_org_time() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    ws.sync(&calendar).await.unwrap();
    calendar.insert(
        "meeting-1",
        event_ics(
            "meeting-1",
            "Renamed meeting",
            "20240111T140000",
            "20240111T150000",
            2,
        ),
    );
    let options = SyncOptions {
        sync_changes_to_org: SyncChangesMode::TitleOnly,
        ..SyncOptions::default()
    };

    // Act
    let report = ws
        .sync_with(&calendar, options, &mut orgdav_core::FixedDecision(true))
        .await
        .unwrap();

    // Assert
    assert_actions(&report, "meeting-1", &[SyncAction::UpdatedInOrg]);
    let notes = ws.notes_text().await;
    assert!(notes.contains("* Renamed meeting <2024-01-10 Wed 10:00-11:00>"), "{notes}");
}

#[tokio::test]
async fn local_change_wins_over_remote_change() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    ws.sync(&calendar).await.unwrap();
    calendar.insert(
        "meeting-1",
        event_ics(
            "meeting-1",
            "Remote title",
            "20240111T140000",
            "20240111T150000",
            2,
        ),
    );
    ws.write_notes(&retitle(NOTES, "Local title")).await;

    // Act
    let report = ws.sync(&calendar).await.unwrap();

    // Assert
    assert_actions(&report, "meeting-1", &[SyncAction::Pushed]);
    assert_eq!(
        report.for_uid("meeting-1").next().unwrap().status,
        EventStatus::ChangedInLocal
    );

    let event = decode(&calendar.blob("meeting-1").unwrap()).unwrap();
    assert_eq!(event.fields.title, "Local title");
    let notes = ws.notes_text().await;
    assert!(notes.contains("* Local title <2024-01-10 Wed 10:00-11:00>"), "{notes}");
    assert!(!notes.contains("Remote title"));
    assert_synced(&ws.db(&calendar).await, "meeting-1", 2);
}

#[tokio::test]
async fn remote_event_lands_in_inbox() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    calendar.insert(
        "phone-1",
        event_ics(
            "phone-1",
            "Lunch with Sam",
            "20240112T120000",
            "20240112T130000",
            0,
        ),
    );

    // Act
    let report = ws.sync(&calendar).await.unwrap();

    // Assert
    assert_actions(&report, "phone-1", &[SyncAction::AddedToOrg]);
    assert_actions(&report, "meeting-1", &[SyncAction::Pushed]);

    let inbox = ws.inbox_text().await;
    assert!(inbox.contains("* Lunch with Sam\n"), "{inbox}");
    assert!(inbox.contains(":ID:       phone-1\n"), "{inbox}");
    assert!(inbox.contains("<2024-01-12 Fri 12:00-13:00>"), "{inbox}");
    assert!(!ws.notes_text().await.contains("Lunch"));

    let db = ws.db(&calendar).await;
    assert_synced(&db, "phone-1", 0);
    assert_synced(&db, "meeting-1", 1);

    let again = ws.sync(&calendar).await.unwrap();
    assert!(again.is_empty(), "unexpected actions: {again:?}");
}
