// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The record store: a vault directory holding one Markdown file per record.

use std::path::Path;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use walkdir::WalkDir;

use crate::config::VaultConfig;
use crate::error::Fallible;
use crate::error::fail;
use crate::records::DrillRecord;
use crate::records::MasteryRecord;
use crate::records::PracticeLogRecord;
use crate::records::Record;
use crate::records::SourceRecord;
use crate::types::date::Date;
use crate::types::kind::RecordKind;
use crate::types::record_id::RecordId;

/// Archived drills are moved here, keeping their filename.
pub const ARCHIVE_DIR: &str = "90_Archive";

/// Full-text attachments of sources, under the source directory.
pub const ATTACHMENTS_DIR: &str = "_attachments";

/// A handle on a vault. Every operation takes one, so nothing in the core
/// depends on process-wide state.
#[derive(Clone, Debug)]
pub struct Vault {
    root: PathBuf,
    config: VaultConfig,
}

impl Vault {
    /// Opens the vault at `root`, reading its configuration file if present.
    pub fn open(root: impl Into<PathBuf>) -> Fallible<Self> {
        let root: PathBuf = root.into();
        if !root.is_dir() {
            return fail("vault directory does not exist.");
        }
        let config = VaultConfig::load(&root)?;
        Ok(Self { root, config })
    }

    pub fn with_config(root: impl Into<PathBuf>, config: VaultConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// The directory holding records of the given kind.
    pub fn dir(&self, kind: RecordKind) -> PathBuf {
        self.root.join(kind.directory())
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.root.join(ARCHIVE_DIR)
    }

    pub fn attachments_dir(&self) -> PathBuf {
        self.dir(RecordKind::Source).join(ATTACHMENTS_DIR)
    }

    /// Paths of the records of a kind, sorted by filename. A missing
    /// directory holds no records.
    pub fn record_paths(&self, kind: RecordKind) -> Fallible<Vec<PathBuf>> {
        list_records(&self.dir(kind), kind)
    }

    pub fn archived_drill_paths(&self) -> Fallible<Vec<PathBuf>> {
        list_records(&self.archive_dir(), RecordKind::Drill)
    }

    pub fn count(&self, kind: RecordKind) -> Fallible<usize> {
        Ok(self.record_paths(kind)?.len())
    }

    /// Loads every record at `paths`. Records that cannot be read or whose
    /// header does not parse are skipped with a warning, so one bad file
    /// never hides the rest of the vault.
    fn scan<H: DeserializeOwned>(&self, paths: Vec<PathBuf>) -> Vec<Record<H>> {
        paths
            .into_iter()
            .filter_map(|path| match Record::load(&path) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping {}: {e}", path.display());
                    None
                }
            })
            .collect()
    }

    /// All drills in the active collection.
    pub fn drills(&self) -> Fallible<Vec<DrillRecord>> {
        let paths = self.record_paths(RecordKind::Drill)?;
        Ok(self.scan(paths).into_iter().map(with_fallback_id).collect())
    }

    pub fn archived_drills(&self) -> Fallible<Vec<DrillRecord>> {
        let paths = self.archived_drill_paths()?;
        Ok(self.scan(paths).into_iter().map(with_fallback_id).collect())
    }

    /// Looks up an active drill by id.
    pub fn find_drill(&self, id: &RecordId) -> Fallible<Option<DrillRecord>> {
        Ok(self.drills()?.into_iter().find(|drill| drill.id() == id))
    }

    pub fn practice_logs(&self) -> Fallible<Vec<PracticeLogRecord>> {
        let paths = self.record_paths(RecordKind::PracticeLog)?;
        Ok(self.scan(paths))
    }

    /// The date of every practice log, one entry per log, read from the
    /// filenames alone.
    pub fn practice_log_dates(&self) -> Fallible<Vec<Date>> {
        Ok(self
            .record_paths(RecordKind::PracticeLog)?
            .iter()
            .filter_map(|path| path.file_name()?.to_str().and_then(Date::from_prefix))
            .collect())
    }

    pub fn mastery_notes(&self) -> Fallible<Vec<MasteryRecord>> {
        let paths = self.record_paths(RecordKind::Mastery)?;
        Ok(self.scan(paths))
    }

    pub fn sources(&self) -> Fallible<Vec<SourceRecord>> {
        let paths = self.record_paths(RecordKind::Source)?;
        Ok(self.scan(paths))
    }

    pub fn find_source(&self, id: &RecordId) -> Fallible<Option<SourceRecord>> {
        Ok(self
            .sources()?
            .into_iter()
            .find(|source| &source.header.id == id))
    }
}

/// Records written by hand may lack an id. Their file stem stands in, so
/// id-based lookup still reaches them.
fn with_fallback_id(mut drill: DrillRecord) -> DrillRecord {
    if drill.header.id.is_empty() {
        drill.header.id = RecordId::new(drill.file_stem());
    }
    drill
}

fn list_records(dir: &Path, kind: RecordKind) -> Fallible<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if kind.matches_file_name(name) {
                paths.push(entry.into_path());
            }
        }
    }
    Ok(paths)
}

/// A path in `dir` for a new file named after `stem` that does not clobber an
/// existing one: `stem.md`, then `stem--2.md`, `stem--3.md`, and so on.
pub(crate) fn vacant_path(dir: &Path, stem: &str) -> PathBuf {
    let first = dir.join(format!("{stem}.md"));
    if !first.exists() {
        return first;
    }
    let mut n: usize = 2;
    loop {
        let candidate = dir.join(format!("{stem}--{n}.md"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
