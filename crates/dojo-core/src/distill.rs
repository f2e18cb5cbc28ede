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

//! Turning sources into drills.
//!
//! The work of reading a source and proposing drills is done by an outside
//! collaborator (usually a language model) behind the [`Distiller`] trait.
//! An optional [`SimilaritySearch`] collaborator helps describe what the
//! vault already covers, so the proposals do not repeat it.

use std::fs::metadata;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::records::DrillRecord;
use crate::store::Vault;
use crate::types::kind::RecordKind;
use crate::types::record_id::RecordId;
use crate::types::timestamp::Timestamp;
use crate::writer::DrillDraft;
use crate::writer::SourceContent;

/// Characters of source text used as the similarity query.
const QUERY_PREVIEW_CHARS: usize = 2000;

const SIMILAR_LIMIT: usize = 10;

const SIMILAR_THRESHOLD: f64 = 0.6;

const RECENT_MASTERY_LIMIT: usize = 20;

/// A drill as proposed by a distiller. Only the title is required.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrillProposal {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pattern: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub drill_goal: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub drill_steps: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub validation: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub snippet_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub snippet_content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    #[serde(default)]
    pub timebox_min: Option<u32>,
    /// How actionable the distiller judged the drill, 1 to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<u8>,
}

/// Distillers often send `null` for fields they have nothing for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl DrillProposal {
    pub fn to_draft(&self, source_id: Option<RecordId>) -> DrillDraft {
        DrillDraft {
            title: self.title.trim().to_string(),
            pattern: self.pattern.clone(),
            drill_goal: self.drill_goal.clone(),
            drill_steps: self.drill_steps.clone(),
            validation: self.validation.clone(),
            snippet_type: self.snippet_type.clone(),
            snippet_content: self.snippet_content.clone(),
            topics: self.topics.clone(),
            timebox_min: self.timebox_min,
            source_id,
            ..DrillDraft::default()
        }
    }
}

/// Reads a JSON array of proposals. Markdown code fences around the array
/// are ignored, and an array cut short mid-object is salvaged up to the
/// last complete proposal.
pub fn parse_proposals(text: &str) -> Fallible<Vec<DrillProposal>> {
    let text = strip_fences(text);
    if text.is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str(text) {
        Ok(proposals) => Ok(proposals),
        // Only a response cut off mid-array is worth salvaging. Anything
        // else would silently drop the proposals that failed to parse.
        Err(error) if !error.is_eof() => {
            fail(format!("failed to parse drill proposals: {error}"))
        }
        Err(error) => match salvage(text) {
            Some(proposals) => {
                log::warn!(
                    "Salvaged {} proposals from a truncated response.",
                    proposals.len()
                );
                Ok(proposals)
            }
            None => fail(format!("failed to parse drill proposals: {error}")),
        },
    }
}

fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn salvage(text: &str) -> Option<Vec<DrillProposal>> {
    let start = text.find('[')?;
    let end = text.rfind("},").or_else(|| text.rfind('}'))?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&format!("{}]", &text[start..=end])).ok()
}

/// Proposes drills for a source.
pub trait Distiller {
    /// `existing_context` describes what the vault already covers and may be
    /// empty.
    fn distill(
        &self,
        source: &SourceContent,
        existing_context: &str,
    ) -> Fallible<Vec<DrillProposal>>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimilarItem {
    pub path: PathBuf,
    pub score: f64,
    pub kind: RecordKind,
}

/// Finds vault records similar to a piece of text.
pub trait SimilaritySearch {
    /// Up to `limit` items scoring at least `threshold`, best first.
    fn find_similar(
        &self,
        query: &str,
        limit: usize,
        threshold: f64,
    ) -> Fallible<Vec<SimilarItem>>;
}

fn display_name(path: &Path, kind: RecordKind) -> String {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    kind.slug_of(stem).replace('-', " ")
}

/// A short description of what the vault already covers: the records most
/// similar to `query` when a search collaborator finds any, else the most
/// recently mastered notes. Empty when the vault has neither.
pub fn existing_context(
    vault: &Vault,
    search: Option<&dyn SimilaritySearch>,
    query: &str,
) -> Fallible<String> {
    if let Some(search) = search.filter(|_| !query.trim().is_empty()) {
        let similar = search.find_similar(query, SIMILAR_LIMIT, SIMILAR_THRESHOLD)?;
        if !similar.is_empty() {
            let mut lines = vec!["RELATED EXISTING CONTENT (DO NOT DUPLICATE):".to_string()];
            for item in similar {
                let label = if item.kind == RecordKind::Mastery {
                    "Mastered"
                } else {
                    "In Progress Drill"
                };
                lines.push(format!("- [{label}] {}", display_name(&item.path, item.kind)));
            }
            return Ok(lines.join("\n"));
        }
    }

    let mut notes: Vec<(SystemTime, PathBuf)> = Vec::new();
    for path in vault.record_paths(RecordKind::Mastery)? {
        let modified = metadata(&path)?.modified()?;
        notes.push((modified, path));
    }
    notes.sort_by(|a, b| b.0.cmp(&a.0));
    let names: Vec<String> = notes
        .iter()
        .take(RECENT_MASTERY_LIMIT)
        .map(|(_, path)| display_name(path, RecordKind::Mastery))
        .collect();
    if names.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("RECENTLY MASTERED: {}", names.join(", ")))
    }
}

/// Distills the source with the given id into new drills. Returns `None`
/// when there is no such source. Proposals without a title are skipped.
pub fn create_drills_from_source(
    vault: &Vault,
    source_id: &RecordId,
    distiller: &dyn Distiller,
    search: Option<&dyn SimilaritySearch>,
    now: Timestamp,
) -> Fallible<Option<Vec<DrillRecord>>> {
    let Some(source) = vault.load_source(source_id)? else {
        return Ok(None);
    };
    let query: String = source.text.chars().take(QUERY_PREVIEW_CHARS).collect();
    let context = existing_context(vault, search, &query)?;
    let proposals = distiller.distill(&source, &context)?;

    let mut drills = Vec::with_capacity(proposals.len());
    for proposal in proposals {
        if proposal.title.trim().is_empty() {
            log::warn!("Skipping an untitled drill proposal for source {source_id}.");
            continue;
        }
        let draft = proposal.to_draft(Some(source_id.clone()));
        drills.push(vault.create_drill(&draft, now)?);
    }
    log::info!(
        "Created {} drills from source {source_id}.",
        drills.len()
    );
    Ok(Some(drills))
}
