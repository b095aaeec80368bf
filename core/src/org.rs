// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! The Org files side of a sync.
//!
//! An event is an Org heading carrying an `:ID:` property and an active timestamp. The store
//! keeps every file in memory as lines; edits mark a file dirty and [`OrgStore::save`] writes
//! the dirty ones back.

mod heading;
mod timestamp;

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::Local;
use regex::Regex;
use sha2::{Digest, Sha256};
use tokio::fs;

pub use crate::org::timestamp::OrgTimestamp;
use crate::org::heading::{Heading, heading_level, is_heading, one_line};
use crate::{EntryLocation, EventFields, LocalStore, SyncChangesMode, SyncError};

static ID_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*:ID:[ \t]+(\S+)[ \t]*$").expect("ID property regex must compile")
});

const PLANNING_KEYWORDS: [&str; 3] = ["SCHEDULED:", "DEADLINE:", "CLOSED:"];

/// Options controlling which entries are synced and how removed text is kept.
#[derive(Debug, Clone, Default)]
pub struct OrgOptions {
    /// Entries tagged with any of these are not synced.
    pub exclude_tags: Vec<String>,

    /// File receiving a copy of every entry before it is rewritten or deleted.
    pub backup_file: Option<PathBuf>,
}

#[derive(Debug)]
struct OrgFile {
    path: PathBuf,
    lines: Vec<String>,
    dirty: bool,
}

#[derive(Debug, Clone, Copy)]
struct EntryPos {
    file: usize,
    heading: usize,
}

/// The line layout of one entry.
///
/// The entry owns its whole subtree (`heading..end`); its own text stops at the first child
/// heading (`section_end`), which bounds the timestamp search and the body.
#[derive(Debug, Clone)]
struct Layout {
    heading: usize,
    /// `:PROPERTIES:` and `:END:` line indices.
    drawer: Option<(usize, usize)>,
    /// First line after the heading, planning line and property drawer.
    body: usize,
    section_end: usize,
    end: usize,
}

impl Layout {
    fn of(lines: &[String], heading: usize) -> Self {
        let level = heading_level(&lines[heading]).unwrap_or(1);
        let next_heading = |deepest: usize| {
            lines
                .iter()
                .enumerate()
                .skip(heading + 1)
                .find(|(_, line)| heading_level(line).is_some_and(|l| l <= deepest))
                .map_or(lines.len(), |(i, _)| i)
        };
        let section_end = next_heading(usize::MAX);
        let end = next_heading(level);

        let mut cursor = heading + 1;
        if cursor < section_end && is_planning(&lines[cursor]) {
            cursor += 1;
        }

        let mut drawer = None;
        if cursor < section_end && lines[cursor].trim() == ":PROPERTIES:" {
            if let Some(close) = (cursor + 1..section_end).find(|&i| lines[i].trim() == ":END:") {
                drawer = Some((cursor, close));
                cursor = close + 1;
            }
        }

        Self {
            heading,
            drawer,
            body: cursor,
            section_end,
            end,
        }
    }

    fn id<'a>(&self, lines: &'a [String]) -> Option<&'a str> {
        let (open, close) = self.drawer?;
        lines[open + 1..close]
            .iter()
            .find_map(|l| ID_PROPERTY.captures(l)?.get(1).map(|m| m.as_str()))
    }

    /// Finds the event timestamp: first in the heading, then in the body.
    fn timestamp(&self, lines: &[String]) -> Option<(usize, OrgTimestamp, Range<usize>)> {
        std::iter::once(self.heading)
            .chain(self.body..self.section_end)
            .find_map(|i| OrgTimestamp::find(&lines[i]).map(|(ts, span)| (i, ts, span)))
    }
}

/// Org files exposed as a [`LocalStore`].
#[derive(Debug)]
pub struct OrgStore {
    files: Vec<OrgFile>,
    inbox: usize,
    options: OrgOptions,
    index: HashMap<String, EntryPos>,
    order: Vec<String>,
    /// IDs of timestamped entries kept out of sync by their tags.
    excluded: HashSet<String>,
    backup: Vec<String>,
}

impl OrgStore {
    /// Reads `files` and the `inbox` from disk.
    ///
    /// The inbox is created on save if it does not exist yet; any other missing file is an error.
    #[tracing::instrument(skip(options))]
    pub async fn open(
        files: &[PathBuf],
        inbox: &Path,
        options: OrgOptions,
    ) -> Result<Self, SyncError> {
        let mut contents = Vec::with_capacity(files.len() + 1);
        for path in files {
            let text = fs::read_to_string(path)
                .await
                .map_err(|e| SyncError::Local(format!("failed to read {}: {e}", path.display())))?;
            contents.push((path.clone(), text));
        }

        if !files.iter().any(|p| p == inbox) {
            let text = match fs::read_to_string(inbox).await {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::info!(path = %inbox.display(), "inbox does not exist yet");
                    String::new()
                }
                Err(e) => {
                    return Err(SyncError::Local(format!(
                        "failed to read inbox {}: {e}",
                        inbox.display()
                    )));
                }
            };
            contents.push((inbox.to_path_buf(), text));
        }

        Self::from_texts(contents, inbox, options)
    }

    /// Builds a store from in-memory file contents.
    ///
    /// Timestamped headings without an `:ID:` get a fresh one, which marks their file dirty.
    pub fn from_texts(
        contents: Vec<(PathBuf, String)>,
        inbox: &Path,
        options: OrgOptions,
    ) -> Result<Self, SyncError> {
        let inbox = contents
            .iter()
            .position(|(path, _)| path == inbox)
            .ok_or_else(|| {
                SyncError::Local(format!("inbox {} is not among the files", inbox.display()))
            })?;

        let files = contents
            .into_iter()
            .map(|(path, text)| OrgFile {
                path,
                lines: text.lines().map(str::to_string).collect(),
                dirty: false,
            })
            .collect();

        let mut store = Self {
            files,
            inbox,
            options,
            index: HashMap::new(),
            order: Vec::new(),
            excluded: HashSet::new(),
            backup: Vec::new(),
        };
        store.assign_missing_ids();
        store.reindex();
        Ok(store)
    }

    /// The current text of a file, as it would be saved.
    pub fn text_of(&self, path: &Path) -> Option<String> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| render_file(&f.lines))
    }

    fn has_excluded_tag(&self, heading: &Heading) -> bool {
        heading
            .tags
            .iter()
            .any(|tag| self.options.exclude_tags.contains(tag))
    }

    fn assign_missing_ids(&mut self) {
        let exclude = self.options.exclude_tags.clone();
        for file in &mut self.files {
            // Bottom-up so insertions don't shift headings still to visit.
            let headings: Vec<usize> = (0..file.lines.len())
                .rev()
                .filter(|&i| is_heading(&file.lines[i]))
                .collect();

            for heading in headings {
                let layout = Layout::of(&file.lines, heading);
                if layout.id(&file.lines).is_some() || layout.timestamp(&file.lines).is_none() {
                    continue;
                }
                let excluded = Heading::parse(&file.lines[heading])
                    .is_some_and(|h| h.tags.iter().any(|t| exclude.contains(t)));
                if excluded {
                    continue;
                }

                let uid = uuid::Uuid::new_v4().to_string();
                tracing::debug!(path = %file.path.display(), line = heading + 1, uid, "assigning ID");
                let property = format!(":ID:       {uid}");
                match layout.drawer {
                    Some((open, _)) => file.lines.insert(open + 1, property),
                    None => {
                        let at = layout.body;
                        file.lines.splice(
                            at..at,
                            [":PROPERTIES:".to_string(), property, ":END:".to_string()],
                        );
                    }
                }
                file.dirty = true;
            }
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        self.order.clear();
        self.excluded.clear();
        for (file_idx, file) in self.files.iter().enumerate() {
            for heading in (0..file.lines.len()).filter(|&i| is_heading(&file.lines[i])) {
                let layout = Layout::of(&file.lines, heading);
                let Some(uid) = layout.id(&file.lines) else {
                    continue;
                };
                if layout.timestamp(&file.lines).is_none() {
                    continue;
                }
                let Some(parsed) = Heading::parse(&file.lines[heading]) else {
                    continue;
                };
                if self.has_excluded_tag(&parsed) {
                    self.excluded.insert(uid.to_string());
                    continue;
                }
                if self.index.contains_key(uid) {
                    tracing::warn!(uid, path = %file.path.display(), line = heading + 1, "duplicate ID, ignoring entry");
                    continue;
                }

                self.index.insert(
                    uid.to_string(),
                    EntryPos {
                        file: file_idx,
                        heading,
                    },
                );
                self.order.push(uid.to_string());
            }
        }
    }

    fn layout(&self, uid: &str) -> Option<(EntryPos, Layout)> {
        let pos = *self.index.get(uid)?;
        let layout = Layout::of(&self.files[pos.file].lines, pos.heading);
        Some((pos, layout))
    }

    fn keep_backup(&mut self, uid: &str, action: &str, pos: EntryPos, layout: &Layout) {
        if self.options.backup_file.is_none() {
            return;
        }
        let file = &self.files[pos.file];
        let mut chunk = format!(
            "# {} {action} {uid} from {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            file.path.display()
        );
        for line in &file.lines[layout.heading..layout.end] {
            chunk.push_str(line);
            chunk.push('\n');
        }
        self.backup.push(chunk);
    }

    fn export(&self, pos: EntryPos, layout: &Layout) -> Option<EventFields> {
        let lines = &self.files[pos.file].lines;
        let heading = Heading::parse(&lines[layout.heading])?;
        let (ts_line, ts, _) = layout.timestamp(lines)?;

        let body: Vec<&str> = (layout.body..layout.section_end)
            .filter(|&i| !(i == ts_line && is_bare_timestamp(&lines[i])))
            .map(|i| lines[i].as_str())
            .collect();

        Some(EventFields {
            title: heading.title(),
            start: ts.start,
            end: ts.end,
            body: trim_blank_lines(&body),
        })
    }
}

#[async_trait]
impl LocalStore for OrgStore {
    fn event_uids(&self) -> Vec<String> {
        self.order.clone()
    }

    fn fingerprint_of(&self, uid: &str) -> Option<String> {
        let (pos, layout) = self.layout(uid)?;
        let mut hasher = Sha256::new();
        for line in &self.files[pos.file].lines[layout.heading..layout.end] {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        Some(hex::encode(hasher.finalize()))
    }

    fn export_event(&self, uid: &str) -> Option<EventFields> {
        let (pos, layout) = self.layout(uid)?;
        self.export(pos, &layout)
    }

    fn export_all(&self) -> Vec<(String, EventFields)> {
        self.order
            .iter()
            .filter_map(|uid| Some((uid.clone(), self.export_event(uid)?)))
            .collect()
    }

    fn is_excluded(&self, uid: &str) -> bool {
        self.excluded.contains(uid)
    }

    fn write_new_entry(&mut self, uid: &str, fields: &EventFields) -> Result<(), SyncError> {
        if self.index.contains_key(uid) || self.excluded.contains(uid) {
            return Err(SyncError::Local(format!("entry {uid} already exists")));
        }

        let mut entry = vec![
            format!("* {}", one_line(&fields.title)),
            ":PROPERTIES:".to_string(),
            format!(":ID:       {uid}"),
            ":END:".to_string(),
            OrgTimestamp::new(fields.start, fields.end).to_string(),
        ];
        entry.extend(body_lines(&fields.body));

        let inbox = &mut self.files[self.inbox];
        tracing::debug!(uid, path = %inbox.path.display(), "appending entry to inbox");
        inbox.lines.extend(entry);
        inbox.dirty = true;
        self.reindex();
        Ok(())
    }

    fn rewrite_entry(
        &mut self,
        uid: &str,
        fields: &EventFields,
        mode: SyncChangesMode,
    ) -> Result<(), SyncError> {
        let (pos, layout) = self.layout(uid).ok_or_else(|| SyncError::lookup(uid))?;
        self.keep_backup(uid, "rewrote", pos, &layout);

        let file = &mut self.files[pos.file];
        let (ts_line, _, span) = layout
            .timestamp(&file.lines)
            .ok_or_else(|| SyncError::lookup(uid))?;
        let timestamp = OrgTimestamp::new(fields.start, fields.end).to_string();

        if mode.updates_timestamp() {
            file.lines[ts_line].replace_range(span, &timestamp);
        }

        if mode.updates_title() {
            let heading = Heading::parse(&file.lines[layout.heading])
                .ok_or_else(|| SyncError::lookup(uid))?;
            file.lines[layout.heading] = heading.render(&fields.title);
        }

        if mode.updates_body() {
            let mut region = Vec::new();
            if ts_line != layout.heading {
                region.push(timestamp);
            }
            region.extend(body_lines(&fields.body));
            file.lines.splice(layout.body..layout.section_end, region);
        }

        file.dirty = true;
        self.reindex();
        Ok(())
    }

    fn delete_entry(&mut self, uid: &str) -> Result<(), SyncError> {
        let (pos, layout) = self.layout(uid).ok_or_else(|| SyncError::lookup(uid))?;
        self.keep_backup(uid, "removed", pos, &layout);

        let file = &mut self.files[pos.file];
        tracing::debug!(uid, path = %file.path.display(), line = layout.heading + 1, "removing entry");
        file.lines.drain(layout.heading..layout.end);
        file.dirty = true;
        self.reindex();
        Ok(())
    }

    fn locate_entry(&self, uid: &str) -> Option<EntryLocation> {
        let (pos, layout) = self.layout(uid)?;
        Some(EntryLocation {
            path: self.files[pos.file].path.clone(),
            lines: layout.heading..layout.end,
        })
    }

    async fn save(&mut self) -> Result<(), SyncError> {
        for file in self.files.iter_mut().filter(|f| f.dirty) {
            if let Some(parent) = file.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file.path, render_file(&file.lines))
                .await
                .map_err(|e| {
                    SyncError::Local(format!("failed to write {}: {e}", file.path.display()))
                })?;
            tracing::info!(path = %file.path.display(), "saved Org file");
            file.dirty = false;
        }

        if let Some(path) = &self.options.backup_file
            && !self.backup.is_empty()
        {
            let mut content = match fs::read_to_string(path).await {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
                Err(e) => return Err(e.into()),
            };
            for chunk in self.backup.drain(..) {
                content.push_str(&chunk);
            }
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            fs::write(path, content).await?;
        }
        Ok(())
    }
}

fn is_planning(line: &str) -> bool {
    let line = line.trim_start();
    PLANNING_KEYWORDS.iter().any(|k| line.starts_with(k))
}

fn is_bare_timestamp(line: &str) -> bool {
    let line = line.trim();
    OrgTimestamp::find(line).is_some_and(|(_, span)| span == (0..line.len()))
}

/// Splits an event body into entry lines, indenting anything that would read as a heading.
fn body_lines(body: &str) -> Vec<String> {
    let body = body.trim_matches('\n');
    if body.trim().is_empty() {
        return Vec::new();
    }
    body.lines()
        .map(|line| {
            if is_heading(line) {
                format!(" {line}")
            } else {
                line.to_string()
            }
        })
        .collect()
}

fn trim_blank_lines(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e].join("\n"),
        _ => String::new(),
    }
}

fn render_file(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
