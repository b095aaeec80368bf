// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Response parsers for `WebDAV` operations.

use quick_xml::events::Event;

use crate::error::CalDavError;
use crate::types::{ETag, EtagEntry, Href};

/// `WebDAV` multistatus response.
#[derive(Debug, Clone)]
pub struct MultiStatusResponse {
    /// The response items.
    pub responses: Vec<ResponseItem>,
}

/// Individual response in multistatus.
#[derive(Debug, Clone)]
pub struct ResponseItem {
    /// The href the response is about.
    pub href: Href,
    /// The property stats of the response.
    pub prop_stats: Vec<PropStat>,
    /// The response-level status, sent instead of prop stats for e.g. deleted members.
    pub status: Option<String>,
}

/// Property stat with status and value.
#[derive(Debug, Clone)]
pub struct PropStat {
    /// The properties reported with this status.
    pub props: Properties,
    /// The status line, e.g. `HTTP/1.1 200 OK`.
    pub status: String,
}

/// `WebDAV` properties.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    /// `displayname`.
    pub display_name: Option<String>,
    /// `getetag`.
    pub get_etag: Option<ETag>,
    /// `resourcetype` contains `calendar`.
    pub is_calendar: bool,
    /// `resourcetype` contains `collection`.
    pub is_collection: bool,
}

impl PropStat {
    fn is_ok(&self) -> bool {
        self.status.contains("200")
    }
}

impl ResponseItem {
    /// The properties of the first successful prop stat.
    #[must_use]
    pub fn ok_props(&self) -> Option<&Properties> {
        self.prop_stats.iter().find(|p| p.is_ok()).map(|p| &p.props)
    }
}

impl MultiStatusResponse {
    /// Parses multistatus response from XML.
    ///
    /// # Errors
    ///
    /// Returns an error if XML parsing fails.
    pub fn from_xml(xml: &str) -> Result<Self, CalDavError> {
        let mut reader = quick_xml::Reader::from_str(xml);
        // Configure reader to trim text and check namespaces
        reader.config_mut().trim_text(true);
        reader.config_mut().check_end_names = true;

        let mut responses = Vec::new();
        let mut current_response: Option<ResponseItem> = None;
        let mut current_prop_stats: Vec<PropStat> = Vec::new();
        let mut current_props: Properties = Properties::default();
        let mut in_prop = false;
        let mut in_response = false;
        let mut in_propstat = false;
        let mut seen_multistatus = false;

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::End(ref e) if e.name().local_name().into_inner() == b"multistatus" => break,
                Event::Eof => break,

                Event::Start(ref e) => match e.name().local_name().into_inner() {
                    b"multistatus" => seen_multistatus = true,
                    b"response" => {
                        in_response = true;
                        current_response = Some(ResponseItem {
                            href: Href::new(String::new()),
                            prop_stats: Vec::new(),
                            status: None,
                        });
                    }
                    b"href" if in_response && !in_propstat => {
                        if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                            let href = text.unescape()?.to_string();
                            if let Some(ref mut resp) = current_response {
                                resp.href = Href::new(href);
                            }
                        }
                    }
                    b"propstat" if in_response => {
                        in_propstat = true;
                        current_props = Properties::default();
                    }
                    b"prop" => in_prop = true,

                    b"displayname" if in_prop => {
                        if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                            current_props.display_name = Some(text.unescape()?.to_string());
                        }
                    }
                    b"resourcetype" if in_prop => loop {
                        match reader.read_event_into(&mut buf)? {
                            Event::End(ref e)
                                if e.name().local_name().into_inner() == b"resourcetype" =>
                            {
                                break;
                            }
                            Event::Start(ref e) | Event::Empty(ref e) => {
                                match e.name().local_name().into_inner() {
                                    b"calendar" => current_props.is_calendar = true,
                                    b"collection" => current_props.is_collection = true,
                                    _ => {}
                                }
                            }
                            Event::Eof => {
                                return Err(CalDavError::Xml("Unexpected EOF".to_string()));
                            }
                            _ => {}
                        }
                    },
                    b"getetag" if in_prop => {
                        if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                            current_props.get_etag = Some(ETag::new(text.unescape()?.to_string()));
                        }
                    }
                    b"status" if in_propstat => {
                        if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                            let status = text.unescape()?.to_string();
                            current_prop_stats.push(PropStat {
                                props: current_props.clone(),
                                status,
                            });
                        }
                    }
                    b"status" if in_response => {
                        if let Event::Text(text) = reader.read_event_into(&mut buf)? {
                            let status = text.unescape()?.to_string();
                            if let Some(ref mut resp) = current_response {
                                resp.status = Some(status);
                            }
                        }
                    }
                    _ => {}
                },
                Event::End(ref e) => match e.name().local_name().into_inner() {
                    b"response" if in_response => {
                        in_response = false;
                        if let Some(mut resp) = current_response.take() {
                            resp.prop_stats.clone_from(&current_prop_stats);
                            current_prop_stats.clear();
                            responses.push(resp);
                        }
                    }
                    b"propstat" if in_propstat => {
                        in_propstat = false;
                    }
                    b"prop" => {
                        in_prop = false;
                    }
                    _ => {}
                },
                _ => {}
            }
            buf.clear();
        }

        if !seen_multistatus {
            return Err(CalDavError::InvalidResponse(
                "Missing multistatus element".to_string(),
            ));
        }

        Ok(Self { responses })
    }

    /// Converts the listing of a calendar collection into event entries.
    ///
    /// Collections (including the listed calendar itself), non-`.ics` members
    /// and members without an `ETag` are skipped.
    #[must_use]
    pub fn into_etag_entries(self) -> Vec<EtagEntry> {
        let mut entries = Vec::new();

        for response in self.responses {
            let Some(props) = response.ok_props() else {
                continue;
            };
            if props.is_collection {
                continue;
            }
            let (Some(uid), Some(etag)) = (response.href.event_uid(), props.get_etag.clone())
            else {
                tracing::debug!(href = %response.href, "skipping non-event member");
                continue;
            };
            entries.push(EtagEntry {
                href: response.href.clone(),
                uid,
                etag,
            });
        }

        entries
    }
}
