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

//! Promotion of a passed drill into a permanent mastery note.

use std::fs::create_dir_all;

use crate::error::Fallible;
use crate::records::DrillRecord;
use crate::records::MasteryHeader;
use crate::records::MasteryRecord;
use crate::slug::slugify;
use crate::store::Vault;
use crate::topics;
use crate::types::kind::RecordKind;
use crate::types::record_id::RecordId;
use crate::types::status::DrillStatus;
use crate::types::timestamp::Timestamp;

const DEFAULT_PITFALLS: &str =
    "- Check for early exit conditions\n- Ensure all dependencies are initialized";

const DEFAULT_VARIATION: &str = "Try combining this with another pattern";

/// Promotes the active drill with the given id. Returns `None` when there
/// is no such drill.
pub fn promote(
    vault: &Vault,
    drill_id: &RecordId,
    reflection: Option<&str>,
    now: Timestamp,
) -> Fallible<Option<MasteryRecord>> {
    match vault.find_drill(drill_id)? {
        Some(drill) => promote_drill(vault, &drill, reflection, now).map(Some),
        None => Ok(None),
    }
}

/// Writes the mastery note for `drill`, replacing any earlier note with the
/// same title, and refreshes the topic indexes. A non-blank `reflection`
/// becomes the concept definition instead of the drill's pattern.
pub fn promote_drill(
    vault: &Vault,
    drill: &DrillRecord,
    reflection: Option<&str>,
    now: Timestamp,
) -> Fallible<MasteryRecord> {
    if drill.status() != DrillStatus::Passed {
        log::warn!(
            "Promoting {} although its status is {}.",
            drill.id(),
            drill.status()
        );
    }
    let dir = vault.dir(RecordKind::Mastery);
    create_dir_all(&dir)?;

    let title = drill.title();
    let sections = drill.sections();
    let concept = reflection
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(sections.text("Pattern"));
    let pitfalls = non_empty_or(sections.text("Failure Modes"), DEFAULT_PITFALLS);
    let variation = non_empty_or(sections.text("Next Variation"), DEFAULT_VARIATION);
    let topics = drill
        .header
        .topics
        .iter()
        .map(|topic| format!("[[{topic}]]"))
        .collect::<Vec<_>>()
        .join(", ");
    let body = format!(
        "\n# {title}\n\n## Concept Definition\n{concept}\n\n## When to Use\n- **Primary Use Case:** [Identify when this pattern is the most effective solution]\n- **Constraints:** [When is this NOT the right tool?]\n\n## Minimal Working Example\n{snippet}\n\n## Pitfalls & Gotchas\n{pitfalls}\n\n## Verification Protocol\n{verification}\n\n## Knowledge Graph\n- **Related Topics:** {topics}\n- **Proof:** [[{proof}]]\n- **Harder Variation:** {variation}\n\n---\n*Promoted on {date}*\n",
        snippet = sections.text("Snippet"),
        verification = sections.text("Drill"),
        proof = drill.file_name(),
        date = now.date(),
    );

    let note = MasteryRecord {
        path: dir.join(format!(
            "{}.md",
            RecordKind::Mastery.file_stem(&slugify(&title))
        )),
        header: MasteryHeader {
            kind: RecordKind::Mastery,
            title: Some(title),
            source_drill_id: drill.id().clone(),
            topics: drill.header.topics.clone(),
            verified_at: Some(now),
        },
        body,
    };
    note.write()?;
    log::info!("Promoted {} to {}", drill.id(), note.path.display());

    topics::rebuild_all(vault)?;
    Ok(note)
}

fn non_empty_or<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.is_empty() { fallback } else { text }
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use super::*;
    use crate::scheduler::mark;
    use crate::testing::drill;
    use crate::testing::tmp_vault;
    use crate::testing::ts;
    use crate::types::status::Outcome;
    use crate::writer::DrillDraft;

    fn pattern_drill(vault: &Vault, now: Timestamp) -> Fallible<DrillRecord> {
        let draft = DrillDraft {
            pattern: vec!["Pattern 1".to_string()],
            snippet_type: "python".to_string(),
            snippet_content: "assert add(1, 2) == 3".to_string(),
            failure_modes: vec!["Forgetting the base case".to_string()],
            topics: vec!["testing".to_string()],
            ..DrillDraft::new("Test Drill")
        };
        let created = vault.create_drill(&draft, now)?;
        mark(vault, created.id(), Outcome::Passed, "", 5, now)?;
        Ok(created)
    }

    #[test]
    fn test_promotion_scenario() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-04-01T09:30:00.000");
        let d = pattern_drill(&vault, now)?;
        let note = promote(&vault, d.id(), None, now)?.unwrap();

        assert_eq!(note.file_name(), "MASTERY__test-drill.md");
        let reloaded = MasteryRecord::load(&note.path)?;
        assert!(reloaded.body.contains("Pattern 1"));
        assert!(reloaded.body.contains("assert add(1, 2) == 3"));
        assert!(reloaded.body.contains("Forgetting the base case"));
        assert!(reloaded.body.contains("[[DRILL__test-drill.md]]"));
        assert_eq!(reloaded.header.topics, vec!["testing".to_string()]);
        assert_eq!(&reloaded.header.source_drill_id, d.id());
        assert_eq!(reloaded.header.verified_at, Some(now));
        assert_eq!(
            reloaded.sections().text("Concept Definition"),
            "- Pattern 1"
        );
        Ok(())
    }

    #[test]
    fn test_reflection_replaces_pattern() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-04-01T09:30:00.000");
        let d = pattern_drill(&vault, now)?;
        let note = promote(&vault, d.id(), Some("Tests pin behavior."), now)?.unwrap();
        assert_eq!(
            note.sections().text("Concept Definition"),
            "Tests pin behavior."
        );

        let blank = promote(&vault, d.id(), Some("   "), now)?.unwrap();
        assert_eq!(blank.sections().text("Concept Definition"), "- Pattern 1");
        Ok(())
    }

    #[test]
    fn test_repromotion_overwrites() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-04-01T09:30:00.000");
        let d = pattern_drill(&vault, now)?;
        let first = promote(&vault, d.id(), Some("First."), now)?.unwrap();
        let second = promote(&vault, d.id(), Some("Second."), now)?.unwrap();
        assert_eq!(first.path, second.path);
        assert_eq!(vault.count(RecordKind::Mastery)?, 1);
        assert!(read_to_string(&second.path)?.contains("Second."));
        Ok(())
    }

    #[test]
    fn test_promotion_refreshes_topics() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-04-01T09:30:00.000");
        let d = pattern_drill(&vault, now)?;
        promote(&vault, d.id(), None, now)?;
        let index = read_to_string(vault.dir(RecordKind::TopicIndex).join("testing.md"))?;
        assert!(index.contains("[[MASTERY__test-drill.md]]"));
        Ok(())
    }

    #[test]
    fn test_missing_sections_and_drill() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-04-01T09:30:00.000");
        let d = drill(&vault, "Bare", &[], now)?;
        let bare = DrillRecord {
            body: "\n# Bare\n".to_string(),
            ..d
        };
        let note = promote_drill(&vault, &bare, None, now)?;
        assert_eq!(note.sections().text("Concept Definition"), "");
        assert!(note.body.contains(DEFAULT_VARIATION));

        assert_eq!(promote(&vault, &RecordId::new("nope"), None, now)?, None);
        Ok(())
    }
}
