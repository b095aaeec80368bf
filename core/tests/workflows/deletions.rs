// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Deletions on either side and the policies guarding them.

use orgdav_core::{
    DeletionPolicy, DeletionRequest, DeletionTarget, EventStatus, FixedDecision, SyncAction,
    SyncOptions,
};

use crate::common::{
    MemoryCalendar, NOTES, Workspace, assert_actions, assert_synced, retitle, without_meeting,
};

fn policies(org: DeletionPolicy, calendar: DeletionPolicy) -> SyncOptions {
    SyncOptions {
        delete_org_entries: org,
        delete_calendar_entries: calendar,
        ..SyncOptions::default()
    }
}

#[tokio::test]
async fn remote_deletion_removes_org_entry() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    ws.sync(&calendar).await.unwrap();
    calendar.remove("meeting-1");
    let options = policies(DeletionPolicy::Always, DeletionPolicy::Always);

    // Act
    let report = ws
        .sync_with(&calendar, options, &mut FixedDecision(false))
        .await
        .unwrap();

    // Assert
    assert_actions(&report, "meeting-1", &[SyncAction::RemovedFromOrg]);
    let notes = ws.notes_text().await;
    assert!(!notes.contains("Planning meeting"), "{notes}");
    assert!(!notes.contains("Agenda for the quarter."), "{notes}");
    assert!(notes.contains("* Groceries\nMilk and eggs.\n"), "{notes}");
    assert!(ws.db(&calendar).await.is_empty());

    let again = ws.sync_with(&calendar, options, &mut FixedDecision(false)).await.unwrap();
    assert!(again.is_empty(), "unexpected actions: {again:?}");
    assert_eq!(calendar.put_count(), 1);
}

#[tokio::test]
async fn remote_deletion_asks_with_title() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    ws.sync(&calendar).await.unwrap();
    calendar.remove("meeting-1");
    let mut asked = Vec::new();
    let mut decider = |request: &DeletionRequest| {
        asked.push(request.clone());
        false
    };

    // Act
    let report = ws
        .sync_with(
            &calendar,
            policies(DeletionPolicy::Ask, DeletionPolicy::Always),
            &mut decider,
        )
        .await
        .unwrap();

    // Assert
    assert_actions(&report, "meeting-1", &[SyncAction::KeptInOrg]);
    assert_eq!(asked.len(), 1);
    assert_eq!(asked[0].uid, "meeting-1");
    assert_eq!(asked[0].title.as_deref(), Some("Planning meeting"));
    assert_eq!(asked[0].target, DeletionTarget::Local);
    assert!(ws.notes_text().await.contains("Planning meeting"));
}

#[tokio::test]
async fn refused_remote_deletion_keeps_entry_and_record() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    ws.sync(&calendar).await.unwrap();
    calendar.remove("meeting-1");
    let options = policies(DeletionPolicy::Never, DeletionPolicy::Always);

    // Act
    let first = ws
        .sync_with(&calendar, options, &mut FixedDecision(true))
        .await
        .unwrap();
    let second = ws
        .sync_with(&calendar, options, &mut FixedDecision(true))
        .await
        .unwrap();

    // Assert
    assert_actions(&first, "meeting-1", &[SyncAction::KeptInOrg]);
    assert_actions(&second, "meeting-1", &[SyncAction::KeptInOrg]);
    assert_eq!(ws.notes_text().await, NOTES);
    let db = ws.db(&calendar).await;
    assert_eq!(
        db.find("meeting-1").unwrap().status(),
        Some(EventStatus::DeletedInRemote)
    );
    // A kept entry is not uploaded again.
    assert_eq!(calendar.put_count(), 1);
    assert!(calendar.uids().is_empty());
}

#[tokio::test]
async fn local_deletion_removes_calendar_event() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    ws.sync(&calendar).await.unwrap();
    ws.write_notes(&without_meeting(NOTES)).await;

    // Act
    let report = ws.sync(&calendar).await.unwrap();

    // Assert
    assert_actions(&report, "meeting-1", &[SyncAction::RemovedFromCal]);
    assert!(calendar.uids().is_empty());
    assert_eq!(calendar.delete_count(), 1);
    assert!(ws.db(&calendar).await.is_empty());
}

#[tokio::test]
async fn refused_local_deletion_keeps_calendar_event() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    ws.sync(&calendar).await.unwrap();
    ws.write_notes(&without_meeting(NOTES)).await;
    let options = policies(DeletionPolicy::Ask, DeletionPolicy::Never);

    // Act
    let first = ws
        .sync_with(&calendar, options, &mut FixedDecision(true))
        .await
        .unwrap();
    let second = ws
        .sync_with(&calendar, options, &mut FixedDecision(true))
        .await
        .unwrap();

    // Assert
    assert_actions(&first, "meeting-1", &[SyncAction::KeptInCal]);
    assert_actions(&second, "meeting-1", &[SyncAction::KeptInCal]);
    assert_eq!(calendar.uids(), vec!["meeting-1".to_string()]);
    assert_eq!(calendar.delete_count(), 0);
    assert!(ws.inbox_text().await.is_empty());
}

#[tokio::test]
async fn deletion_on_both_sides_is_forgotten_quietly() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    ws.sync(&calendar).await.unwrap();
    ws.write_notes(&without_meeting(NOTES)).await;
    calendar.remove("meeting-1");

    // Act
    let report = ws.sync(&calendar).await.unwrap();

    // Assert
    assert!(report.is_empty(), "unexpected actions: {report:?}");
    assert_eq!(calendar.delete_count(), 0);
    assert!(ws.db(&calendar).await.is_empty());
}

#[tokio::test]
async fn edited_entry_deleted_on_calendar_is_pushed_again() {
    // Arrange
    let ws = Workspace::new(NOTES).await;
    let calendar = MemoryCalendar::new();
    ws.sync(&calendar).await.unwrap();
    ws.write_notes(&retitle(NOTES, "Planning meeting moved")).await;
    calendar.remove("meeting-1");
    let options = policies(DeletionPolicy::Always, DeletionPolicy::Always);

    // Act
    let report = ws
        .sync_with(&calendar, options, &mut FixedDecision(true))
        .await
        .unwrap();

    // Assert
    assert_actions(&report, "meeting-1", &[SyncAction::Pushed]);
    assert_eq!(
        report.for_uid("meeting-1").next().unwrap().status,
        EventStatus::ChangedInLocal
    );
    assert!(ws.notes_text().await.contains("* Planning meeting moved <"));
    let blob = calendar.blob("meeting-1").expect("event should be recreated");
    assert!(blob.contains("SUMMARY:Planning meeting moved"), "{blob}");
    assert_synced(&ws.db(&calendar).await, "meeting-1", 2);
    assert_eq!(calendar.put_count(), 2);
}
