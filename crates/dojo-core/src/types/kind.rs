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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::types::date::Date;

/// The kind of a record in the vault.
///
/// The kind is stored in the `type` header key. Directory and filename prefix
/// are derived from it and are never used to decide what a record is.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Source,
    Drill,
    PracticeLog,
    Mastery,
    #[serde(rename = "topic")]
    TopicIndex,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Source => "source",
            RecordKind::Drill => "drill",
            RecordKind::PracticeLog => "practice_log",
            RecordKind::Mastery => "mastery",
            RecordKind::TopicIndex => "topic",
        }
    }

    /// The vault-relative directory holding records of this kind.
    pub fn directory(&self) -> &'static str {
        match self {
            RecordKind::Source => "00_Inbox",
            RecordKind::Drill => "01_Drills",
            RecordKind::PracticeLog => "02_Practice_Logs",
            RecordKind::Mastery => "10_Mastery",
            RecordKind::TopicIndex => "11_Topics",
        }
    }

    /// The filename prefix, for kinds that have one. Practice logs are keyed
    /// by date instead, and topic indexes by the bare topic name.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            RecordKind::Source => Some("SOURCE__"),
            RecordKind::Drill => Some("DRILL__"),
            RecordKind::Mastery => Some("MASTERY__"),
            RecordKind::PracticeLog | RecordKind::TopicIndex => None,
        }
    }

    /// The file stem for a record of this kind with the given slug.
    pub fn file_stem(&self, slug: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{prefix}{slug}"),
            None => slug.to_string(),
        }
    }

    /// Whether a filename in this kind's directory names a record of this
    /// kind.
    pub fn matches_file_name(&self, name: &str) -> bool {
        let Some(stem) = name.strip_suffix(".md") else {
            return false;
        };
        match self {
            RecordKind::PracticeLog => {
                Date::from_prefix(stem).is_some() && stem.get(10..12) == Some("__")
            }
            RecordKind::TopicIndex => !stem.is_empty(),
            _ => self.prefix().is_some_and(|prefix| stem.starts_with(prefix)),
        }
    }

    /// Strips the prefix from a file stem, yielding the slug.
    pub fn slug_of<'a>(&self, stem: &'a str) -> &'a str {
        match self {
            RecordKind::PracticeLog => stem.get(12..).unwrap_or(stem),
            _ => match self.prefix() {
                Some(prefix) => stem.strip_prefix(prefix).unwrap_or(stem),
                None => stem,
            },
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_file_name() {
        assert!(RecordKind::Drill.matches_file_name("DRILL__closures.md"));
        assert!(!RecordKind::Drill.matches_file_name("MASTERY__closures.md"));
        assert!(!RecordKind::Drill.matches_file_name("DRILL__closures.txt"));
        assert!(RecordKind::PracticeLog.matches_file_name("2024-01-02__closures.md"));
        assert!(!RecordKind::PracticeLog.matches_file_name("notes.md"));
        assert!(RecordKind::TopicIndex.matches_file_name("Rust.md"));
    }

    #[test]
    fn test_slug_of() {
        assert_eq!(RecordKind::Drill.slug_of("DRILL__closures"), "closures");
        assert_eq!(
            RecordKind::PracticeLog.slug_of("2024-01-02__closures--2"),
            "closures--2"
        );
        assert_eq!(RecordKind::TopicIndex.slug_of("Rust"), "Rust");
    }

    #[test]
    fn test_serialized_names() -> crate::error::Fallible<()> {
        assert_eq!(serde_json::to_string(&RecordKind::TopicIndex)?, "\"topic\"");
        assert_eq!(
            serde_json::to_string(&RecordKind::PracticeLog)?,
            "\"practice_log\""
        );
        Ok(())
    }
}
