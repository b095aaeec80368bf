// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use indexmap::IndexMap;
use orgdav_caldav::{CalDavClient, CalDavError};

/// Current entity tags of the calendar, keyed by event uid.
pub type ChangeTokens = IndexMap<String, String>;

/// The remote calendar holding one resource per event.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// A stable name for the calendar, used to pick the state file.
    fn calendar_identity(&self) -> String;

    /// Verifies that the calendar exists and accepts the credentials.
    async fn check_reachable(&self) -> Result<(), CalDavError>;

    async fn list_change_tokens(&self) -> Result<ChangeTokens, CalDavError>;

    /// Fetches the iCalendar text of one event.
    async fn fetch_resource(&self, uid: &str) -> Result<String, CalDavError>;

    /// Creates or replaces one event.
    async fn put_resource(&self, uid: &str, blob: String) -> Result<(), CalDavError>;

    async fn delete_resource(&self, uid: &str) -> Result<(), CalDavError>;
}

#[async_trait]
impl RemoteStore for CalDavClient {
    fn calendar_identity(&self) -> String {
        self.calendar_url()
    }

    async fn check_reachable(&self) -> Result<(), CalDavError> {
        self.check_calendar().await
    }

    async fn list_change_tokens(&self) -> Result<ChangeTokens, CalDavError> {
        let entries = self.list_etags().await?;
        let mut tokens = ChangeTokens::with_capacity(entries.len());
        for entry in entries {
            if tokens.contains_key(&entry.uid) {
                tracing::warn!(uid = entry.uid, href = %entry.href, "duplicate event uid in listing");
                continue;
            }
            tokens.insert(entry.uid, entry.etag.as_str().to_string());
        }
        Ok(tokens)
    }

    async fn fetch_resource(&self, uid: &str) -> Result<String, CalDavError> {
        Ok(self.get_event(uid).await?.data)
    }

    async fn put_resource(&self, uid: &str, blob: String) -> Result<(), CalDavError> {
        self.put_event(uid, blob).await.map(|_| ())
    }

    async fn delete_resource(&self, uid: &str) -> Result<(), CalDavError> {
        self.delete_event(uid).await
    }
}
