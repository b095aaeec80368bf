// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Minimal `CalDAV` client used as the remote store of an orgdav sync (RFC 4791).
//!
//! Only the operations needed to reconcile a single calendar collection are
//! provided: listing resource entity tags, and fetching, storing and deleting
//! `<uid>.ics` resources.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(clippy::similar_names, clippy::single_match_else)]

mod client;
mod config;
mod error;
mod http;
mod request;
mod response;
mod types;

pub use crate::client::CalDavClient;
pub use crate::config::{AuthMethod, CalDavConfig};
pub use crate::error::CalDavError;
pub use crate::request::{Prop, PropFindRequest};
pub use crate::response::MultiStatusResponse;
pub use crate::types::{CalendarResource, ETag, EtagEntry, Href};
