// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! The reconciler driving one sync run between the Org files and the calendar.

use crate::event_db::EventStatus::{
    ChangedInLocal, ChangedInRemote, DeletedInLocal, DeletedInRemote, InLocal, NewInLocal,
    NewInRemote, Synced,
};
use crate::ics::{self, RemoteEvent};
use crate::remote::ChangeTokens;
use crate::{
    DeletionDecider, DeletionPolicy, DeletionRequest, DeletionTarget, EventDb, EventStatus,
    LocalStore, RemoteStore, StateFile, SyncAction, SyncChangesMode, SyncError, SyncOutcome,
    SyncReport,
};

/// Policies of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Which parts of an Org entry a remote change rewrites.
    pub sync_changes_to_org: SyncChangesMode,

    /// What to do with Org entries whose event was deleted on the calendar.
    pub delete_org_entries: DeletionPolicy,

    /// What to do with calendar events whose Org entry was deleted.
    pub delete_calendar_entries: DeletionPolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            sync_changes_to_org: SyncChangesMode::default(),
            delete_org_entries: DeletionPolicy::Ask,
            delete_calendar_entries: DeletionPolicy::Always,
        }
    }
}

/// Runs one full sync of `local` against `remote`, persisting the result to `state`.
///
/// A fatal error leaves the state file as it was, so the run can simply be retried.
#[tracing::instrument(skip_all, fields(calendar = %remote.calendar_identity()))]
pub async fn sync_calendar<L, R>(
    local: &mut L,
    remote: &R,
    state: &StateFile,
    options: SyncOptions,
    decider: &mut dyn DeletionDecider,
) -> Result<SyncReport, SyncError>
where
    L: LocalStore + ?Sized,
    R: RemoteStore + ?Sized,
{
    remote
        .check_reachable()
        .await
        .map_err(SyncError::Connectivity)?;

    let db = state.load().await?;
    let (db, report) = Synchronizer::new(local, remote, db, options, decider)
        .run()
        .await?;
    state.save(&db).await?;

    tracing::info!(actions = report.outcomes.len(), "sync finished");
    Ok(report)
}

/// Classifies every event and carries changes across, one phase at a time.
///
/// The database is owned for the duration of the run and handed back by [`Synchronizer::run`].
pub struct Synchronizer<'a, L: ?Sized, R: ?Sized> {
    local: &'a mut L,
    remote: &'a R,
    db: EventDb,
    options: SyncOptions,
    decider: &'a mut dyn DeletionDecider,
    tokens: ChangeTokens,
    report: SyncReport,
}

impl<'a, L, R> Synchronizer<'a, L, R>
where
    L: LocalStore + ?Sized,
    R: RemoteStore + ?Sized,
{
    pub fn new(
        local: &'a mut L,
        remote: &'a R,
        db: EventDb,
        options: SyncOptions,
        decider: &'a mut dyn DeletionDecider,
    ) -> Self {
        let report = SyncReport::new(remote.calendar_identity());
        Self {
            local,
            remote,
            db,
            options,
            decider,
            tokens: ChangeTokens::new(),
            report,
        }
    }

    pub fn db(&self) -> &EventDb {
        &self.db
    }

    pub fn report(&self) -> &SyncReport {
        &self.report
    }

    /// Runs every phase and saves the Org files; returns the database to persist.
    pub async fn run(mut self) -> Result<(EventDb, SyncReport), SyncError> {
        self.scan_local()?;
        let tokens = self.fetch_tokens().await?;
        self.scan_remote(tokens)?;
        self.push_local_changes().await?;
        self.pull_remote_changes().await?;
        self.local.save().await?;
        Ok((self.db, self.report))
    }

    /// Resets every status, then classifies the events the Org files report.
    #[tracing::instrument(skip(self))]
    pub fn scan_local(&mut self) -> Result<(), SyncError> {
        self.db.reset_statuses();

        for uid in self.local.event_uids() {
            let fingerprint = self
                .local
                .fingerprint_of(&uid)
                .ok_or_else(|| SyncError::lookup(&uid))?;

            match self.db.find_mut(&uid) {
                None => {
                    tracing::debug!(uid = %uid, "new in Org");
                    self.db
                        .add(uid, Some(fingerprint), None, None, Some(NewInLocal))?;
                }
                Some(record) if record.status().is_some() => {
                    tracing::warn!(uid = %uid, "listed twice by the Org files, ignoring");
                }
                Some(record) if record.fingerprint() != Some(fingerprint.as_str()) => {
                    tracing::debug!(uid = %uid, "changed in Org");
                    record.set_fingerprint(Some(fingerprint));
                    record.set_status(Some(ChangedInLocal));
                }
                Some(record) => record.set_status(Some(InLocal)),
            }
        }

        for record in self.db.iter_mut().filter(|r| r.status().is_none()) {
            tracing::debug!(uid = record.uid(), "deleted in Org");
            record.set_status(Some(DeletedInLocal));
        }
        Ok(())
    }

    /// Classifies events against the calendar listing.
    ///
    /// Events changed or deleted in Org are left alone: the local side wins a conflict.
    #[tracing::instrument(skip_all, fields(count = tokens.len()))]
    pub fn scan_remote(&mut self, tokens: ChangeTokens) -> Result<(), SyncError> {
        for (uid, token) in &tokens {
            match self.db.find_mut(uid) {
                None => {
                    tracing::debug!(uid = %uid, "new on the calendar");
                    self.db
                        .add(uid.clone(), None, Some(token.clone()), None, Some(NewInRemote))?;
                }
                Some(record) => match record.status() {
                    Some(ChangedInLocal | DeletedInLocal) => {
                        tracing::debug!(uid = %uid, status = ?record.status(), "local side wins");
                    }
                    _ if record.token() != Some(token.as_str()) => {
                        tracing::debug!(uid = %uid, "changed on the calendar");
                        record.set_token(Some(token.clone()));
                        record.set_status(Some(ChangedInRemote));
                    }
                    None => record.set_status(Some(DeletedInLocal)),
                    Some(InLocal) => record.set_status(Some(Synced)),
                    Some(status) => {
                        return Err(SyncError::Invariant(format!(
                            "event {uid} has status {status} during the calendar scan"
                        )));
                    }
                },
            }
        }

        for record in self.db.iter_mut().filter(|r| r.status() == Some(InLocal)) {
            tracing::debug!(uid = record.uid(), "deleted on the calendar");
            record.set_status(Some(DeletedInRemote));
        }

        self.tokens = tokens;
        Ok(())
    }

    /// Uploads new and changed Org entries, then carries Org deletions to the calendar.
    #[tracing::instrument(skip(self))]
    pub async fn push_local_changes(&mut self) -> Result<(), SyncError> {
        let mut pushed = Vec::new();
        for uid in self.db.uids_with(&[NewInLocal, ChangedInLocal]) {
            let Some(record) = self.db.find(&uid) else {
                continue;
            };
            let Some(status) = record.status() else {
                continue;
            };
            let revision = record.revision().map_or(1, |r| r + 1);

            let fields = self
                .local
                .export_event(&uid)
                .ok_or_else(|| SyncError::lookup(&uid))?;
            let blob = ics::encode(&uid, &fields, revision);

            match self.push_event(&uid, blob, revision).await {
                Ok(revision) => {
                    if let Some(record) = self.db.find_mut(&uid) {
                        record.set_revision(Some(revision));
                    }
                    pushed.push((uid, status, fields.title));
                }
                Err(detail) => self.fail(&uid, status, Some(fields.title), detail),
            }
        }

        self.delete_calendar_entries().await;

        if pushed.is_empty() {
            return Ok(());
        }

        // The server assigns entity tags, so read them back after writing.
        let tokens = self.fetch_tokens().await?;
        for (uid, status, title) in pushed {
            let Some(token) = tokens.get(&uid) else {
                self.fail(
                    &uid,
                    status,
                    Some(title),
                    "missing from the calendar listing after upload".to_string(),
                );
                continue;
            };
            if let Some(record) = self.db.find_mut(&uid) {
                record.set_token(Some(token.clone()));
                record.set_status(Some(Synced));
            }
            self.report.push(SyncOutcome {
                uid,
                status,
                action: SyncAction::Pushed,
                title: Some(title),
                detail: None,
            });
        }
        self.tokens = tokens;
        Ok(())
    }

    /// Writes calendar changes into the Org files, then carries calendar deletions over.
    #[tracing::instrument(skip(self))]
    pub async fn pull_remote_changes(&mut self) -> Result<(), SyncError> {
        for uid in self.db.uids_with(&[NewInRemote, ChangedInRemote]) {
            let Some(status) = self.db.find(&uid).and_then(|r| r.status()) else {
                continue;
            };
            if status == NewInRemote && self.local.is_excluded(&uid) {
                tracing::debug!(uid = %uid, "held by an excluded Org entry, skipping");
                self.db.remove(&uid);
                continue;
            }

            let event = match self.fetch_event(&uid).await {
                Ok(event) => event,
                Err(detail) => {
                    self.fail(&uid, status, None, detail);
                    continue;
                }
            };

            let action = if status == NewInRemote {
                self.local.write_new_entry(&uid, &event.fields)?;
                SyncAction::AddedToOrg
            } else {
                if self.local.locate_entry(&uid).is_none() {
                    return Err(SyncError::lookup(&uid));
                }
                self.local
                    .rewrite_entry(&uid, &event.fields, self.options.sync_changes_to_org)?;
                SyncAction::UpdatedInOrg
            };

            let fingerprint = self
                .local
                .fingerprint_of(&uid)
                .ok_or_else(|| SyncError::lookup(&uid))?;
            if let Some(record) = self.db.find_mut(&uid) {
                record.set_fingerprint(Some(fingerprint));
                record.set_revision(event.revision);
                record.set_status(Some(Synced));
            }

            tracing::debug!(uid = %uid, %action, "pulled event");
            self.report.push(SyncOutcome {
                uid,
                status,
                action,
                title: Some(event.fields.title),
                detail: None,
            });
        }

        self.delete_org_entries()
    }

    async fn fetch_tokens(&self) -> Result<ChangeTokens, SyncError> {
        self.remote
            .list_change_tokens()
            .await
            .map_err(SyncError::from_listing)
    }

    /// Uploads one event and returns the revision the calendar reports for it.
    async fn push_event(&self, uid: &str, blob: String, revision: u32) -> Result<u32, String> {
        self.remote
            .put_resource(uid, blob)
            .await
            .map_err(|e| format!("upload failed: {e}"))?;

        let confirmed = self
            .remote
            .fetch_resource(uid)
            .await
            .map_err(|e| format!("confirm fetch failed: {e}"))?;
        let event = ics::decode(&confirmed)
            .map_err(|e| format!("confirm fetch returned unreadable data: {e}"))?;

        Ok(event.revision.unwrap_or_else(|| {
            tracing::debug!(uid, revision, "calendar dropped SEQUENCE, keeping ours");
            revision
        }))
    }

    async fn fetch_event(&self, uid: &str) -> Result<RemoteEvent, String> {
        let blob = self
            .remote
            .fetch_resource(uid)
            .await
            .map_err(|e| format!("fetch failed: {e}"))?;
        ics::decode(&blob).map_err(|e| format!("unreadable calendar data: {e}"))
    }

    async fn delete_calendar_entries(&mut self) {
        for uid in self.db.uids_with(&[DeletedInLocal]) {
            if !self.tokens.contains_key(&uid) {
                tracing::debug!(uid = %uid, "gone from both sides, forgetting");
                self.db.remove(&uid);
                continue;
            }

            let request = DeletionRequest {
                uid: uid.clone(),
                title: None,
                target: DeletionTarget::Remote,
            };
            if !self
                .options
                .delete_calendar_entries
                .allows(&mut *self.decider, &request)
            {
                self.report.push(SyncOutcome {
                    uid,
                    status: DeletedInLocal,
                    action: SyncAction::KeptInCal,
                    title: None,
                    detail: None,
                });
                continue;
            }

            let (action, detail) = match self.remote.delete_resource(&uid).await {
                Ok(()) => (SyncAction::RemovedFromCal, None),
                Err(e) if e.is_not_found() => (SyncAction::RemovedFromCal, None),
                Err(e) => {
                    tracing::warn!(uid = %uid, err = %e, "failed to delete from the calendar");
                    (SyncAction::Error, Some(format!("delete failed: {e}")))
                }
            };
            if action == SyncAction::RemovedFromCal {
                self.db.remove(&uid);
            }
            self.report.push(SyncOutcome {
                uid,
                status: DeletedInLocal,
                action,
                title: None,
                detail,
            });
        }
    }

    fn delete_org_entries(&mut self) -> Result<(), SyncError> {
        for uid in self.db.uids_with(&[DeletedInRemote]) {
            let title = self.local.export_event(&uid).map(|f| f.title);
            let request = DeletionRequest {
                uid: uid.clone(),
                title: title.clone(),
                target: DeletionTarget::Local,
            };

            let action = if self
                .options
                .delete_org_entries
                .allows(&mut *self.decider, &request)
            {
                // Already gone if it sat below another removed entry.
                if self.local.locate_entry(&uid).is_some() {
                    self.local.delete_entry(&uid)?;
                }
                self.db.remove(&uid);
                SyncAction::RemovedFromOrg
            } else {
                SyncAction::KeptInOrg
            };

            tracing::debug!(uid = %uid, %action, "handled calendar deletion");
            self.report.push(SyncOutcome {
                uid,
                status: DeletedInRemote,
                action,
                title,
                detail: None,
            });
        }
        Ok(())
    }

    /// Marks an event as failed and drops it, so the next run rediscovers it from scratch.
    fn fail(&mut self, uid: &str, status: EventStatus, title: Option<String>, detail: String) {
        tracing::warn!(uid, %status, %detail, "event not synced");
        if let Some(record) = self.db.find_mut(uid) {
            record.set_status(Some(EventStatus::Error));
        }
        self.db.remove(uid);
        self.report.push(SyncOutcome {
            uid: uid.to_string(),
            status,
            action: SyncAction::Error,
            title,
            detail: Some(detail),
        });
    }
}
