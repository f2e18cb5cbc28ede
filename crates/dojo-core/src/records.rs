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

//! Typed views of the records in a vault.
//!
//! Headers are read leniently: every key a hand-edited record might lack has
//! a default, and topic lists may be written as a single string.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Fallible;
use crate::frontmatter::Document;
use crate::sections;
use crate::sections::Sections;
use crate::slug::title_from_slug;
use crate::types::date::Date;
use crate::types::kind::RecordKind;
use crate::types::record_id::RecordId;
use crate::types::status::DrillStatus;
use crate::types::status::Outcome;
use crate::types::timestamp::Timestamp;

/// A record on disk: where it lives, its typed header, and its body.
#[derive(Clone, Debug, PartialEq)]
pub struct Record<H> {
    pub path: PathBuf,
    pub header: H,
    pub body: String,
}

pub type DrillRecord = Record<DrillHeader>;
pub type PracticeLogRecord = Record<PracticeLogHeader>;
pub type MasteryRecord = Record<MasteryHeader>;
pub type SourceRecord = Record<SourceHeader>;
pub type TopicRecord = Record<TopicHeader>;

impl<H: DeserializeOwned> Record<H> {
    pub fn load(path: &Path) -> Fallible<Self> {
        let document = Document::read(path)?;
        let header: H = document.header_as()?;
        Ok(Self {
            path: path.to_path_buf(),
            header,
            body: document.body,
        })
    }
}

impl<H: Serialize> Record<H> {
    pub fn write(&self) -> Fallible<()> {
        Document::from_typed(&self.header, self.body.as_str())?.write(&self.path)
    }
}

impl<H> Record<H> {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    pub fn file_stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
    }

    pub fn sections(&self) -> Sections {
        Sections::parse(&self.body)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(single) if single.trim().is_empty() => Vec::new(),
        OneOrMany::One(single) => vec![single.trim().to_string()],
        OneOrMany::Many(many) => many,
    })
}

fn drill_kind() -> RecordKind {
    RecordKind::Drill
}

fn practice_log_kind() -> RecordKind {
    RecordKind::PracticeLog
}

fn mastery_kind() -> RecordKind {
    RecordKind::Mastery
}

fn source_kind() -> RecordKind {
    RecordKind::Source
}

fn topic_kind() -> RecordKind {
    RecordKind::TopicIndex
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrillHeader {
    #[serde(default)]
    pub id: RecordId,
    #[serde(rename = "type", default = "drill_kind")]
    pub kind: RecordKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub status: DrillStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<RecordId>,
    /// A drill without a review date is due immediately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<Date>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timebox_min: Option<u32>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub prereqs: Vec<String>,
}

impl Record<DrillHeader> {
    pub fn id(&self) -> &RecordId {
        &self.header.id
    }

    pub fn status(&self) -> DrillStatus {
        self.header.status
    }

    pub fn slug(&self) -> &str {
        RecordKind::Drill.slug_of(self.file_stem())
    }

    /// The drill's title: from the header, else from the body's first
    /// heading, else recovered from the filename.
    pub fn title(&self) -> String {
        self.header
            .title
            .clone()
            .or_else(|| sections::title(&self.body))
            .unwrap_or_else(|| title_from_slug(self.slug()))
    }

    pub fn next_review(&self, today: Date) -> Date {
        self.header.next_review.unwrap_or(today)
    }

    /// Whether the drill should be practiced on `today`.
    pub fn is_due(&self, today: Date) -> bool {
        self.status().is_active() && self.next_review(today) <= today
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PracticeLogHeader {
    #[serde(rename = "type", default = "practice_log_kind")]
    pub kind: RecordKind,
    #[serde(default)]
    pub drill_id: RecordId,
    #[serde(default)]
    pub drill_title: String,
    pub result: Outcome,
    /// Quality rating from 1 to 5. Zero means unrated.
    #[serde(default)]
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl Record<PracticeLogHeader> {
    /// The practice date, taken from the filename.
    pub fn date(&self) -> Option<Date> {
        Date::from_prefix(self.file_name())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MasteryHeader {
    #[serde(rename = "type", default = "mastery_kind")]
    pub kind: RecordKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub source_drill_id: RecordId,
    #[serde(default, deserialize_with = "one_or_many")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<Timestamp>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Manual,
    Youtube,
    Reddit,
    Blog,
    /// Captured for later; content not fetched yet.
    Pending,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    #[default]
    Ready,
    Pending,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceHeader {
    #[serde(default)]
    pub id: RecordId,
    #[serde(rename = "type", default = "source_kind")]
    pub kind: RecordKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub source_kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<Timestamp>,
    #[serde(default)]
    pub fetch_method: String,
    /// Vault-relative path of the full-text attachment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub status: SourceStatus,
    /// Whatever extra metadata the ingestion step collected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<toml::Table>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicHeader {
    #[serde(rename = "type", default = "topic_kind")]
    pub kind: RecordKind,
    pub name: String,
    pub pass_rate: String,
}
