// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! An in-memory calendar standing in for a CalDAV server.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use indexmap::IndexMap;
use orgdav_caldav::{CalDavError, Href};
use orgdav_core::{ChangeTokens, RemoteStore};

#[derive(Debug, Default)]
struct Inner {
    /// uid -> (etag, iCalendar text)
    resources: IndexMap<String, (String, String)>,
    next_etag: u64,
    failing_puts: HashSet<String>,
    /// Uploads that are acknowledged but never stored.
    lost_puts: HashSet<String>,
    offline: bool,
    puts: usize,
    deletes: usize,
}

impl Inner {
    fn store(&mut self, uid: &str, blob: String) {
        self.next_etag += 1;
        let etag = format!("\"{}\"", self.next_etag);
        self.resources.insert(uid.to_string(), (etag, blob));
    }
}

/// A calendar that keeps its events in memory and counts the writes it receives.
#[derive(Debug, Default)]
pub struct MemoryCalendar {
    inner: Mutex<Inner>,
}

#[allow(dead_code)]
impl MemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or edits an event as another client would, giving it a new entity tag.
    pub fn insert(&self, uid: &str, blob: impl Into<String>) {
        self.inner.lock().unwrap().store(uid, blob.into());
    }

    /// Deletes an event as another client would.
    pub fn remove(&self, uid: &str) {
        self.inner.lock().unwrap().resources.shift_remove(uid);
    }

    pub fn blob(&self, uid: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.resources.get(uid).map(|(_, blob)| blob.clone())
    }

    pub fn etag(&self, uid: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.resources.get(uid).map(|(etag, _)| etag.clone())
    }

    pub fn uids(&self) -> Vec<String> {
        self.inner.lock().unwrap().resources.keys().cloned().collect()
    }

    pub fn put_count(&self) -> usize {
        self.inner.lock().unwrap().puts
    }

    pub fn delete_count(&self) -> usize {
        self.inner.lock().unwrap().deletes
    }

    /// Makes every upload of `uid` fail with a server error.
    pub fn fail_puts_for(&self, uid: &str) {
        self.inner.lock().unwrap().failing_puts.insert(uid.to_string());
    }

    /// Makes every upload of `uid` succeed without the event ever showing up.
    pub fn lose_puts_for(&self, uid: &str) {
        self.inner.lock().unwrap().lost_puts.insert(uid.to_string());
    }

    pub fn clear_failures(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.failing_puts.clear();
        inner.lost_puts.clear();
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap().offline = offline;
    }

    fn href(uid: &str) -> Href {
        Href::from(format!("/calendars/user/memory/{uid}.ics"))
    }
}

#[async_trait]
impl RemoteStore for MemoryCalendar {
    fn calendar_identity(&self) -> String {
        "memory://calendars/user/memory/".to_string()
    }

    async fn check_reachable(&self) -> Result<(), CalDavError> {
        if self.inner.lock().unwrap().offline {
            return Err(CalDavError::Http("connection refused".to_string()));
        }
        Ok(())
    }

    async fn list_change_tokens(&self) -> Result<ChangeTokens, CalDavError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .resources
            .iter()
            .map(|(uid, (etag, _))| (uid.clone(), etag.clone()))
            .collect())
    }

    async fn fetch_resource(&self, uid: &str) -> Result<String, CalDavError> {
        let inner = self.inner.lock().unwrap();
        inner
            .resources
            .get(uid)
            .map(|(_, blob)| blob.clone())
            .ok_or_else(|| CalDavError::NotFound(Self::href(uid)))
    }

    async fn put_resource(&self, uid: &str, blob: String) -> Result<(), CalDavError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing_puts.contains(uid) {
            return Err(CalDavError::Http(
                "unexpected status 503 Service Unavailable".to_string(),
            ));
        }
        inner.puts += 1;
        if !inner.lost_puts.contains(uid) {
            inner.store(uid, blob);
        }
        Ok(())
    }

    async fn delete_resource(&self, uid: &str) -> Result<(), CalDavError> {
        let mut inner = self.inner.lock().unwrap();
        inner.deletes += 1;
        match inner.resources.shift_remove(uid) {
            Some(_) => Ok(()),
            None => Err(CalDavError::NotFound(Self::href(uid))),
        }
    }
}
