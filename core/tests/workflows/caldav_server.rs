// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Syncing against a CalDAV server simulated with wiremock.

use orgdav_caldav::{AuthMethod, CalDavClient, CalDavConfig};
use orgdav_core::{SyncAction, SyncError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{Workspace, assert_actions, assert_synced, event_ics};

const COLLECTION: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/calendars/user/personal/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Personal</D:displayname>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

const LISTING: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/calendars/user/personal/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/user/personal/standup.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>"7"</D:getetag>
        <D:resourcetype/>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

fn client_for(server: &MockServer) -> CalDavClient {
    let config = CalDavConfig {
        url: format!("{}/calendars/user", server.uri()),
        calendar_id: "personal".to_string(),
        auth: AuthMethod::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        },
        ..Default::default()
    };
    CalDavClient::new(config).expect("Failed to create client")
}

#[tokio::test]
async fn server_event_is_pulled_once() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .and(path("/calendars/user/personal/"))
        .and(header("Depth", "0"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(COLLECTION, "application/xml"))
        .mount(&server)
        .await;
    Mock::given(method("PROPFIND"))
        .and(path("/calendars/user/personal/"))
        .and(header("Depth", "1"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(LISTING, "application/xml"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/calendars/user/personal/standup.ics"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"7\"")
                .set_body_raw(
                    event_ics(
                        "standup",
                        "Daily standup",
                        "20240115T091500",
                        "20240115T093000",
                        3,
                    ),
                    "text/calendar",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ws = Workspace::new("").await;

    // Act
    let first = ws.sync(&client).await.unwrap();
    let second = ws.sync(&client).await.unwrap();

    // Assert
    assert_actions(&first, "standup", &[SyncAction::AddedToOrg]);
    assert!(second.is_empty(), "unexpected actions: {second:?}");

    let inbox = ws.inbox_text().await;
    assert!(inbox.contains("* Daily standup\n"), "{inbox}");
    assert!(inbox.contains("<2024-01-15 Mon 09:15-09:30>"), "{inbox}");

    let db = ws.db(&client).await;
    assert_synced(&db, "standup", 3);
    assert_eq!(db.find("standup").unwrap().token(), Some("\"7\""));
}

#[tokio::test]
async fn plain_collection_is_rejected_before_any_change() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .and(path("/calendars/user/personal/"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/calendars/user/personal/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#,
            "application/xml",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ws = Workspace::new("* Call plumber <2024-03-04 Mon 08:00>\n").await;

    // Act
    let result = ws.sync(&client).await;

    // Assert
    assert!(matches!(result, Err(SyncError::Connectivity(_))), "{result:?}");
    assert!(!ws.state_for(&client).path().exists());
    assert!(!ws.notes_text().await.contains(":ID:"));
}
