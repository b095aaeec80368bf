// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `CalDAV` client for calendar operations.

use std::sync::Arc;

use reqwest::Method;

use crate::config::CalDavConfig;
use crate::error::CalDavError;
use crate::http::HttpClient;
use crate::request::{Prop, PropFindRequest};
use crate::response::MultiStatusResponse;
use crate::types::{CalendarResource, ETag, EtagEntry, Href};

/// `CalDAV` client bound to a single calendar collection.
///
/// # Example
///
/// ```ignore
/// use orgdav_caldav::{AuthMethod, CalDavClient, CalDavConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CalDavConfig {
///     url: "https://caldav.example.com/dav/calendars/user".to_string(),
///     calendar_id: "personal".to_string(),
///     auth: AuthMethod::Basic {
///         username: "user".to_string(),
///         password: "pass".to_string(),
///     },
///     ..Default::default()
/// };
///
/// let client = CalDavClient::new(config)?;
/// client.check_calendar().await?;
/// let etags = client.list_etags().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CalDavClient {
    http: Arc<HttpClient>,
    config: CalDavConfig,
}

impl CalDavClient {
    /// Creates a new `CalDAV` client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or HTTP client
    /// initialization fails.
    pub fn new(config: CalDavConfig) -> Result<Self, CalDavError> {
        if config.url.trim().is_empty() {
            return Err(CalDavError::Config("url must not be empty".to_string()));
        }
        if config.calendar_id.trim_matches('/').is_empty() {
            return Err(CalDavError::Config(
                "calendar_id must not be empty".to_string(),
            ));
        }

        let http = HttpClient::new(config.clone())?;
        Ok(Self {
            http: Arc::new(http),
            config,
        })
    }

    /// The client configuration.
    #[must_use]
    pub const fn config(&self) -> &CalDavConfig {
        &self.config
    }

    /// The URL of the calendar collection.
    #[must_use]
    pub fn calendar_url(&self) -> String {
        self.config.calendar_url()
    }

    /// The URL of the resource holding the event `uid`.
    #[must_use]
    pub fn event_url(&self, uid: &str) -> String {
        format!("{}{}.ics", self.calendar_url(), urlencoding::encode(uid))
    }

    /// Checks that the calendar collection is reachable and is a calendar.
    ///
    /// # Errors
    ///
    /// Returns an error if the server can't be reached, rejects the request,
    /// or the collection is not a calendar.
    #[tracing::instrument(skip(self), fields(url = %self.calendar_url()))]
    pub async fn check_calendar(&self) -> Result<(), CalDavError> {
        let url = self.calendar_url();

        let mut propfind = PropFindRequest::new();
        propfind.add_property(Prop::ResourceType);
        propfind.add_property(Prop::DisplayName);

        let resp = self
            .http
            .execute(self.http.propfind(&url, 0, propfind.build()?)?)
            .await?;

        let xml = resp.text().await?;
        let multistatus = MultiStatusResponse::from_xml(&xml)?;
        let props = multistatus
            .responses
            .iter()
            .find_map(|r| r.ok_props())
            .ok_or_else(|| {
                CalDavError::InvalidResponse("No properties for calendar collection".to_string())
            })?;

        if !props.is_calendar {
            return Err(CalDavError::NotACalendar(Href::new(url)));
        }

        tracing::debug!(display_name = ?props.display_name, "calendar reachable");
        Ok(())
    }

    /// Lists the entity tags of all event resources in the calendar.
    ///
    /// An empty vector means the calendar holds no events.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the listing is malformed,
    /// including a multistatus without any response at all, which can't be
    /// told apart from a broken server answer.
    #[tracing::instrument(skip(self))]
    pub async fn list_etags(&self) -> Result<Vec<EtagEntry>, CalDavError> {
        let url = self.calendar_url();

        let mut propfind = PropFindRequest::new();
        propfind.add_property(Prop::GetETag);
        propfind.add_property(Prop::ResourceType);

        let resp = self
            .http
            .execute(self.http.propfind(&url, 1, propfind.build()?)?)
            .await?;

        let xml = resp.text().await?;
        let multistatus = MultiStatusResponse::from_xml(&xml)?;
        if multistatus.responses.is_empty() {
            return Err(CalDavError::InvalidResponse(format!(
                "Empty property listing for {url}"
            )));
        }

        let entries = multistatus.into_etag_entries();
        tracing::debug!(count = entries.len(), "listed event etags");
        Ok(entries)
    }

    /// Gets the event resource for `uid`.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::NotFound`] if the resource doesn't exist, or
    /// another error if the request fails.
    pub async fn get_event(&self, uid: &str) -> Result<CalendarResource, CalDavError> {
        let url = self.event_url(uid);
        let resp = self
            .http
            .execute(self.http.build_request(Method::GET, &url))
            .await?;

        let href = Href::new(resp.url().path().to_string());
        let etag = HttpClient::extract_etag(&resp);
        let data = resp.text().await?;
        if !data.contains("BEGIN:VCALENDAR") {
            return Err(CalDavError::InvalidResponse(format!(
                "No calendar data found at {href}"
            )));
        }

        Ok(CalendarResource::new(href, etag, data))
    }

    /// Creates or replaces the event resource for `uid`.
    ///
    /// Returns the new `ETag` if the server sent one with the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn put_event(&self, uid: &str, data: String) -> Result<Option<ETag>, CalDavError> {
        let url = self.event_url(uid);
        let resp = self
            .http
            .execute(
                self.http
                    .build_request(Method::PUT, &url)
                    .header("Content-Type", "text/calendar; charset=utf-8")
                    .body(data),
            )
            .await?;

        Ok(HttpClient::extract_etag(&resp))
    }

    /// Deletes the event resource for `uid`.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::NotFound`] if the resource doesn't exist, or
    /// another error if the request fails.
    pub async fn delete_event(&self, uid: &str) -> Result<(), CalDavError> {
        let url = self.event_url(uid);

        self.http
            .execute(self.http.build_request(Method::DELETE, &url))
            .await?;

        Ok(())
    }
}
