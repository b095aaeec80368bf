// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Events travelling from one set of Org files through the calendar into another.

use orgdav_core::{LocalStore, SyncAction};

use crate::common::{MemoryCalendar, Workspace, assert_actions, assert_synced};

const LAPTOP: &str = "\
* TODO [#A] Review budget <2024-05-06 Mon 13:00-14:30>  :work:
:PROPERTIES:
:ID:       budget-1
:END:
Bring the spreadsheet.

Second paragraph.
* Holiday
:PROPERTIES:
:ID:       holiday-1
:END:
<2024-05-20 Mon>--<2024-05-24 Fri>
";

#[tokio::test]
async fn events_survive_the_calendar_unchanged() {
    // Arrange
    let laptop = Workspace::new(LAPTOP).await;
    let desktop = Workspace::new("").await;
    let calendar = MemoryCalendar::new();

    // Act
    laptop.sync(&calendar).await.unwrap();
    let report = desktop.sync(&calendar).await.unwrap();

    // Assert
    assert_actions(&report, "budget-1", &[SyncAction::AddedToOrg]);
    assert_actions(&report, "holiday-1", &[SyncAction::AddedToOrg]);

    let source = laptop.open().await;
    let copy = desktop.open().await;
    for uid in ["budget-1", "holiday-1"] {
        assert_eq!(copy.export_event(uid), source.export_event(uid), "{uid}");
    }

    let inbox = desktop.inbox_text().await;
    assert!(inbox.contains("<2024-05-20 Mon>--<2024-05-24 Fri>"), "{inbox}");

    let db = desktop.db(&calendar).await;
    assert_synced(&db, "budget-1", 1);
    assert_synced(&db, "holiday-1", 1);
}

#[tokio::test]
async fn both_sides_settle_after_round_trip() {
    // Arrange
    let laptop = Workspace::new(LAPTOP).await;
    let desktop = Workspace::new("").await;
    let calendar = MemoryCalendar::new();
    laptop.sync(&calendar).await.unwrap();
    desktop.sync(&calendar).await.unwrap();

    // Act
    let laptop_again = laptop.sync(&calendar).await.unwrap();
    let desktop_again = desktop.sync(&calendar).await.unwrap();

    // Assert
    assert!(laptop_again.is_empty(), "{laptop_again:?}");
    assert!(desktop_again.is_empty(), "{desktop_again:?}");
    assert_eq!(calendar.put_count(), 2);
}
