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

//! Creating new records: drills and sources.

use std::fs::create_dir_all;
use std::fs::read_to_string;
use std::fs::write;

use crate::error::Fallible;
use crate::frontmatter;
use crate::frontmatter::Header;
use crate::records::DrillHeader;
use crate::records::DrillRecord;
use crate::records::SourceHeader;
use crate::records::SourceKind;
use crate::records::SourceRecord;
use crate::records::SourceStatus;
use crate::slug::slugify;
use crate::store::ATTACHMENTS_DIR;
use crate::store::Vault;
use crate::store::vacant_path;
use crate::types::kind::RecordKind;
use crate::types::record_id::RecordId;
use crate::types::status::DrillStatus;
use crate::types::timestamp::Timestamp;

/// Number of characters of a source shown in its preview section.
const PREVIEW_CHARS: usize = 300;

/// Number of characters used for a title derived from content.
const DERIVED_TITLE_CHARS: usize = 50;

/// Everything needed to write a new drill. Empty lists are filled with
/// placeholder lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrillDraft {
    pub title: String,
    pub pattern: Vec<String>,
    pub drill_goal: String,
    pub drill_steps: Vec<String>,
    pub validation: Vec<String>,
    pub snippet_type: String,
    pub snippet_content: String,
    pub failure_modes: Vec<String>,
    pub next_variations: Vec<String>,
    pub topics: Vec<String>,
    pub prereqs: Vec<String>,
    /// Falls back to the vault's default timebox.
    pub timebox_min: Option<u32>,
    pub source_id: Option<RecordId>,
}

impl DrillDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

fn or_placeholder(items: &[String], placeholder: &str) -> Vec<String> {
    if items.is_empty() {
        vec![placeholder.to_string()]
    } else {
        items.to_vec()
    }
}

fn bullets(items: &[String], marker: &str) -> String {
    items
        .iter()
        .map(|item| format!("{marker}{item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn drill_body(draft: &DrillDraft) -> String {
    let pattern = or_placeholder(&draft.pattern, "Pattern to be filled in");
    let steps = or_placeholder(&draft.drill_steps, "Step to be filled in");
    let validation = or_placeholder(&draft.validation, "Validation check to be filled in");
    let failure_modes = if draft.failure_modes.is_empty() {
        vec!["Common pitfall 1".to_string(), "Common pitfall 2".to_string()]
    } else {
        draft.failure_modes.clone()
    };
    let variations = if draft.next_variations.is_empty() {
        vec!["Try variation 1".to_string(), "Try variation 2".to_string()]
    } else {
        draft.next_variations.clone()
    };
    let goal = if draft.drill_goal.is_empty() {
        "To be defined"
    } else {
        draft.drill_goal.as_str()
    };
    let snippet_type = if draft.snippet_type.is_empty() {
        "code"
    } else {
        draft.snippet_type.as_str()
    };
    let snippet = if draft.snippet_content.is_empty() {
        "# Code/prompt to be added"
    } else {
        draft.snippet_content.trim_end()
    };
    let steps = steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {step}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "\n# {title}\n\n## Pattern\n{pattern}\n\n## Drill\n**Goal:** {goal}\n\n**Steps:**\n{steps}\n\n## Snippet\n```{snippet_type}\n{snippet}\n```\n\n## Validation\n{validation}\n\n## Failure Modes\n{failure_modes}\n\n## Next Variation\n{variations}\n",
        title = draft.title,
        pattern = bullets(&pattern, "- "),
        validation = bullets(&validation, "- [ ] "),
        failure_modes = bullets(&failure_modes, "- "),
        variations = bullets(&variations, "- "),
    )
}

impl Vault {
    /// Writes a new untried drill, due for practice today.
    pub fn create_drill(&self, draft: &DrillDraft, now: Timestamp) -> Fallible<DrillRecord> {
        let dir = self.dir(RecordKind::Drill);
        create_dir_all(&dir)?;
        let slug = slugify(&draft.title);
        let path = vacant_path(&dir, &RecordKind::Drill.file_stem(&slug));
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        let header = DrillHeader {
            id: RecordId::generate(RecordKind::Drill, &stem, now),
            kind: RecordKind::Drill,
            title: Some(draft.title.clone()),
            status: DrillStatus::Untried,
            created: Some(now),
            source_id: draft.source_id.clone(),
            next_review: Some(now.date()),
            review_count: 0,
            timebox_min: Some(
                draft
                    .timebox_min
                    .filter(|min| *min > 0)
                    .unwrap_or(self.config().defaults.timebox_min),
            ),
            topics: draft.topics.clone(),
            prereqs: draft.prereqs.clone(),
        };
        let drill = DrillRecord {
            path,
            header,
            body: drill_body(draft),
        };
        drill.write()?;
        log::debug!("Created drill {} at {}", drill.id(), drill.path.display());
        Ok(drill)
    }
}

/// Raw material handed over by an ingestion step. The core never fetches
/// anything itself: a capture either carries its content or is pending.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceCapture {
    pub kind: SourceKind,
    pub url: Option<String>,
    pub title: Option<String>,
    /// `None` records a pending capture.
    pub content: Option<String>,
    pub fetch_method: String,
    pub metadata: Option<Header>,
}

impl SourceCapture {
    /// A capture of text typed or pasted by hand.
    pub fn manual(content: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Manual,
            url: None,
            title: None,
            content: Some(content.into()),
            fetch_method: "manual".to_string(),
            metadata: None,
        }
    }

    /// A URL saved for later processing.
    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Pending,
            url: Some(url.into()),
            title: None,
            content: None,
            fetch_method: "pending".to_string(),
            metadata: None,
        }
    }

    fn derived_title(&self) -> String {
        if let Some(title) = self.title.as_ref().filter(|t| !t.trim().is_empty()) {
            return title.trim().to_string();
        }
        if let Some(url) = &self.url {
            let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
            if !last.is_empty() {
                return last.chars().take(DERIVED_TITLE_CHARS).collect();
            }
        }
        if let Some(content) = &self.content {
            let title: String = content
                .chars()
                .take(DERIVED_TITLE_CHARS)
                .map(|c| if c == '\n' { ' ' } else { c })
                .collect();
            if !title.trim().is_empty() {
                return title.trim().to_string();
            }
        }
        "untitled".to_string()
    }
}

/// A source together with its full text.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceContent {
    pub source: SourceRecord,
    pub text: String,
}

fn source_body(title: &str, header: &SourceHeader, content: Option<&str>) -> String {
    let origin = header.url.as_deref().unwrap_or("Manual entry");
    let captured = header
        .captured_at
        .map(|ts| ts.to_string())
        .unwrap_or_default();
    let preview = match content {
        Some(content) => {
            let preview: String = content.chars().take(PREVIEW_CHARS).collect();
            format!("{preview}...")
        }
        None => "*Pending capture, content not fetched yet.*".to_string(),
    };
    let attachment = header.transcript_path.as_deref().unwrap_or_default();
    format!(
        "\n# {title}\n\n**Source:** {origin}\n**Captured:** {captured}\n\n## Content Preview\n{preview}\n\n---\n*Full content in: `{attachment}`*\n"
    )
}

impl Vault {
    /// Writes a source record, plus its full-text attachment when the
    /// capture has content.
    pub fn create_source(&self, capture: &SourceCapture, now: Timestamp) -> Fallible<SourceRecord> {
        let dir = self.dir(RecordKind::Source);
        create_dir_all(self.attachments_dir())?;
        let title = capture.derived_title();
        let path = vacant_path(&dir, &RecordKind::Source.file_stem(&slugify(&title)));
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        let id = RecordId::generate(RecordKind::Source, &stem, now);
        let transcript_path = format!(
            "{}/{ATTACHMENTS_DIR}/{id}.txt",
            RecordKind::Source.directory()
        );
        let status = match capture.content {
            Some(_) => SourceStatus::Ready,
            None => SourceStatus::Pending,
        };
        let header = SourceHeader {
            id,
            kind: RecordKind::Source,
            title: Some(title.clone()),
            source_kind: capture.kind,
            url: capture.url.clone(),
            captured_at: Some(now),
            fetch_method: capture.fetch_method.clone(),
            transcript_path: Some(transcript_path.clone()),
            status,
            metadata: capture.metadata.clone(),
        };
        if let Some(content) = &capture.content {
            write(self.root().join(&transcript_path), content)?;
        }
        let source = SourceRecord {
            body: source_body(&title, &header, capture.content.as_deref()),
            path,
            header,
        };
        source.write()?;
        log::debug!("Created source {} at {}", source.header.id, source.path.display());
        Ok(source)
    }

    /// Completes a pending capture: writes its attachment and flips its
    /// status to ready. This is the only change a source ever sees.
    pub fn mark_source_ready(
        &self,
        id: &RecordId,
        content: &str,
    ) -> Fallible<Option<SourceRecord>> {
        let Some(source) = self.find_source(id)? else {
            return Ok(None);
        };
        let transcript_path = source.header.transcript_path.clone().unwrap_or_else(|| {
            format!("{}/{ATTACHMENTS_DIR}/{id}.txt", RecordKind::Source.directory())
        });
        create_dir_all(self.attachments_dir())?;
        write(self.root().join(&transcript_path), content)?;
        let mut updates = Header::new();
        updates.insert("status".into(), "ready".into());
        updates.insert("transcript_path".into(), transcript_path.into());
        frontmatter::update(&source.path, updates)?;
        Ok(self.find_source(id)?)
    }

    /// Loads a source by id with its full text. When the attachment is
    /// missing the record's own text stands in.
    pub fn load_source(&self, id: &RecordId) -> Fallible<Option<SourceContent>> {
        let Some(source) = self.find_source(id)? else {
            return Ok(None);
        };
        let attachment = source
            .header
            .transcript_path
            .as_deref()
            .map(|path| self.root().join(path.trim_start_matches(['/', '\\'])))
            .filter(|path| path.is_file());
        let text = match attachment {
            Some(path) => read_to_string(path)?,
            None => {
                log::warn!(
                    "Attachment of source {id} not found, using the note itself."
                );
                read_to_string(&source.path)?
            }
        };
        Ok(Some(SourceContent { source, text }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::Document;
    use crate::testing::tmp_vault;
    use crate::testing::ts;

    #[test]
    fn test_create_drill() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-05-01T09:30:00.000");
        let draft = DrillDraft {
            pattern: vec!["Pattern 1".to_string()],
            drill_goal: "Learn something".to_string(),
            topics: vec!["testing".to_string()],
            ..DrillDraft::new("Test Drill")
        };
        let drill = vault.create_drill(&draft, now)?;

        assert_eq!(drill.file_name(), "DRILL__test-drill.md");
        let reloaded = DrillRecord::load(&drill.path)?;
        assert_eq!(reloaded.header, drill.header);
        assert_eq!(reloaded.status(), DrillStatus::Untried);
        assert_eq!(reloaded.header.next_review, Some(now.date()));
        assert_eq!(reloaded.header.review_count, 0);
        assert_eq!(reloaded.header.timebox_min, Some(10));
        assert_eq!(reloaded.title(), "Test Drill");

        let sections = reloaded.sections();
        assert_eq!(sections.text("Pattern"), "- Pattern 1");
        assert!(sections.text("Drill").contains("**Goal:** Learn something"));
        assert!(sections.text("Validation").starts_with("- [ ] "));
        Ok(())
    }

    #[test]
    fn test_same_title_does_not_clobber() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-05-01T09:30:00.000");
        let first = vault.create_drill(&DrillDraft::new("Twice"), now)?;
        let second = vault.create_drill(&DrillDraft::new("Twice"), now)?;
        assert_eq!(second.file_name(), "DRILL__twice--2.md");
        assert_ne!(first.id(), second.id());
        assert_eq!(vault.drills()?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_zero_timebox_uses_default() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let draft = DrillDraft {
            timebox_min: Some(0),
            ..DrillDraft::new("Quick")
        };
        let drill = vault.create_drill(&draft, ts("2024-05-01T09:30:00.000"))?;
        assert_eq!(drill.header.timebox_min, Some(10));
        Ok(())
    }

    #[test]
    fn test_create_and_load_manual_source() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let capture = SourceCapture::manual("Ownership rules:\neach value has one owner.");
        let source = vault.create_source(&capture, ts("2024-05-01T09:30:00.000"))?;

        assert!(source.file_name().starts_with("SOURCE__ownership-rules"));
        assert_eq!(source.header.status, SourceStatus::Ready);
        let loaded = vault.load_source(&source.header.id)?.unwrap();
        assert_eq!(loaded.text, "Ownership rules:\neach value has one owner.");
        assert_eq!(vault.load_source(&RecordId::new("nope"))?, None);
        Ok(())
    }

    #[test]
    fn test_pending_source_becomes_ready() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let capture = SourceCapture::pending("https://example.com/posts/lifetimes/");
        let source = vault.create_source(&capture, ts("2024-05-01T09:30:00.000"))?;
        assert_eq!(source.file_name(), "SOURCE__lifetimes.md");
        assert_eq!(source.header.status, SourceStatus::Pending);

        let ready = vault
            .mark_source_ready(&source.header.id, "Full article text.")?
            .unwrap();
        assert_eq!(ready.header.status, SourceStatus::Ready);
        assert_eq!(ready.header.source_kind, SourceKind::Pending);
        let loaded = vault.load_source(&source.header.id)?.unwrap();
        assert_eq!(loaded.text, "Full article text.");

        let document = Document::read(&source.path)?;
        assert_eq!(document.header["url"].as_str(), Some("https://example.com/posts/lifetimes/"));
        Ok(())
    }
}
