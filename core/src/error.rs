// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use orgdav_caldav::CalDavError;

/// Errors that abort a synchronization run.
///
/// Per-event failures (a single PUT or GET going wrong) never surface here; they are recorded
/// in the [`crate::SyncReport`] and the run continues with the next event.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The calendar could not be reached, or refused the credentials.
    #[error("calendar unreachable: {0}")]
    Connectivity(#[source] CalDavError),

    /// The calendar answered with a listing that could not be understood.
    #[error("malformed calendar listing: {0}")]
    ProtocolShape(String),

    /// An event the database expects to exist in the Org files is missing.
    #[error("event {uid} not found in the local Org files")]
    LocalLookup { uid: String },

    /// The event database reached a state the reconciler does not know how to handle.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Reading or writing the Org files failed.
    #[error("local store error: {0}")]
    Local(String),

    /// Reading or writing the persisted sync state failed.
    #[error("state file error: {0}")]
    State(String),
}

impl SyncError {
    pub(crate) fn lookup(uid: impl Into<String>) -> Self {
        SyncError::LocalLookup { uid: uid.into() }
    }

    /// Classifies a failed calendar listing.
    pub(crate) fn from_listing(err: CalDavError) -> Self {
        match err {
            CalDavError::InvalidResponse(msg) => SyncError::ProtocolShape(msg),
            CalDavError::Xml(msg) => SyncError::ProtocolShape(msg),
            err => SyncError::Connectivity(err),
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Local(err.to_string())
    }
}
