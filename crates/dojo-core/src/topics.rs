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

//! Topic index notes, one per topic tag, rebuilt from scratch from the
//! drills and mastery notes that carry the tag.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs::create_dir_all;
use std::fs::remove_file;
use std::path::PathBuf;

use crate::error::Fallible;
use crate::frontmatter::Document;
use crate::records::TopicHeader;
use crate::records::TopicRecord;
use crate::slug::topic_file_stem;
use crate::store::Vault;
use crate::types::kind::RecordKind;
use crate::types::status::DrillStatus;

#[derive(Clone, Debug, PartialEq)]
pub struct TopicDrill {
    pub file_name: String,
    pub title: String,
    pub status: DrillStatus,
}

/// Everything known about one topic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TopicRollup {
    pub name: String,
    /// Filenames of the mastery notes tagged with the topic.
    pub mastery: Vec<String>,
    pub drills: Vec<TopicDrill>,
}

impl TopicRollup {
    pub fn passed(&self) -> usize {
        self.drills
            .iter()
            .filter(|drill| drill.status == DrillStatus::Passed)
            .count()
    }

    /// Percentage of the topic's drills that are passed; zero without drills.
    pub fn pass_rate(&self) -> f64 {
        if self.drills.is_empty() {
            0.0
        } else {
            self.passed() as f64 / self.drills.len() as f64 * 100.0
        }
    }

    fn render(&self) -> String {
        let name = &self.name;
        let mastery = if self.mastery.is_empty() {
            "*No mastery notes yet.*".to_string()
        } else {
            self.mastery
                .iter()
                .map(|note| format!("- [[{note}]]"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let drills = if self.drills.is_empty() {
            "*No drills found for this topic.*".to_string()
        } else {
            self.drills
                .iter()
                .map(|drill| format!("- [[{}]] ({})", drill.file_name, drill.status))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let beginner = self
            .drills
            .first()
            .map(|drill| drill.title.as_str())
            .unwrap_or("N/A");
        format!(
            "\n# Topic Index: {name}\n\n## Definition\n[Add a 1-2 sentence definition of {name} here]\n\n## Mastery Notes\n{mastery}\n\n## Practice Drills\n**Pass Rate:** {:.1}% ({}/{})\n\n{drills}\n\n## Learning Path\n1. **Beginner:** {beginner}\n2. **Intermediate:** ...\n3. **Advanced:** ...\n",
            self.pass_rate(),
            self.passed(),
            self.drills.len(),
        )
    }
}

fn rollup_for<'a>(
    rollups: &'a mut BTreeMap<String, TopicRollup>,
    topic: &str,
) -> &'a mut TopicRollup {
    rollups
        .entry(topic.to_string())
        .or_insert_with(|| TopicRollup {
            name: topic.to_string(),
            ..TopicRollup::default()
        })
}

/// Groups the vault's active drills and mastery notes by topic, in topic
/// name order.
pub fn collect_rollups(vault: &Vault) -> Fallible<Vec<TopicRollup>> {
    let mut rollups: BTreeMap<String, TopicRollup> = BTreeMap::new();
    for note in vault.mastery_notes()? {
        for topic in &note.header.topics {
            rollup_for(&mut rollups, topic)
                .mastery
                .push(note.file_name().to_string());
        }
    }
    for drill in vault.drills()? {
        for topic in &drill.header.topics {
            rollup_for(&mut rollups, topic).drills.push(TopicDrill {
                file_name: drill.file_name().to_string(),
                title: drill.title(),
                status: drill.status(),
            });
        }
    }
    Ok(rollups.into_values().collect())
}

/// Rewrites every topic index and deletes the ones whose topic no longer
/// appears anywhere. Notes in the topic directory that are not topic
/// indexes are left alone. Returns the paths written.
pub fn rebuild_all(vault: &Vault) -> Fallible<Vec<PathBuf>> {
    let dir = vault.dir(RecordKind::TopicIndex);
    create_dir_all(&dir)?;
    let mut written: BTreeSet<PathBuf> = BTreeSet::new();
    for rollup in collect_rollups(vault)? {
        let path = dir.join(format!("{}.md", topic_file_stem(&rollup.name)));
        if written.contains(&path) {
            log::warn!(
                "Topic '{}' shares an index file with another topic: {}",
                rollup.name,
                path.display()
            );
        }
        let record = TopicRecord {
            header: TopicHeader {
                kind: RecordKind::TopicIndex,
                name: rollup.name.clone(),
                pass_rate: format!("{:.1}%", rollup.pass_rate()),
            },
            body: rollup.render(),
            path,
        };
        record.write()?;
        written.insert(record.path);
    }
    for path in vault.record_paths(RecordKind::TopicIndex)? {
        if written.contains(&path) {
            continue;
        }
        let is_index = Document::read(&path)
            .map(|doc| {
                doc.header.get("type").and_then(|v| v.as_str())
                    == Some(RecordKind::TopicIndex.as_str())
            })
            .unwrap_or(false);
        if is_index {
            log::debug!("Removing stale topic index: {}", path.display());
            remove_file(&path)?;
        }
    }
    log::info!("Rebuilt {} topic indexes.", written.len());
    Ok(written.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;
    use std::fs::write;

    use super::*;
    use crate::records::MasteryHeader;
    use crate::records::MasteryRecord;
    use crate::scheduler::mark;
    use crate::testing::drill;
    use crate::testing::tmp_vault;
    use crate::testing::ts;
    use crate::types::record_id::RecordId;
    use crate::types::status::Outcome;

    #[test]
    fn test_rebuild_is_byte_stable() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-06-01T12:00:00.000");
        let d = drill(&vault, "Borrowing", &["Rust", "Memory Safety"], now)?;
        drill(&vault, "Lifetimes", &["Rust"], now)?;
        mark(&vault, d.id(), Outcome::Passed, "", 0, now)?;

        let first = rebuild_all(&vault)?;
        let before: Vec<String> = first
            .iter()
            .map(read_to_string)
            .collect::<Result<_, _>>()?;
        let second = rebuild_all(&vault)?;
        let after: Vec<String> = second
            .iter()
            .map(read_to_string)
            .collect::<Result<_, _>>()?;
        assert_eq!(first, second);
        assert_eq!(before, after);
        Ok(())
    }

    #[test]
    fn test_index_contents() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-06-01T12:00:00.000");
        let d = drill(&vault, "Borrowing", &["Rust", "Memory Safety"], now)?;
        drill(&vault, "Lifetimes", &["Rust"], now)?;
        mark(&vault, d.id(), Outcome::Passed, "", 0, now)?;
        rebuild_all(&vault)?;

        let dir = vault.dir(RecordKind::TopicIndex);
        let rust = TopicRecord::load(&dir.join("Rust.md"))?;
        assert_eq!(rust.header.name, "Rust");
        assert_eq!(rust.header.pass_rate, "50.0%");
        assert!(rust.body.contains("[[DRILL__borrowing.md]] (passed)"));
        assert!(rust.body.contains("[[DRILL__lifetimes.md]] (untried)"));
        assert!(rust.body.contains("*No mastery notes yet.*"));

        let memory = TopicRecord::load(&dir.join("Memory_Safety.md"))?;
        assert_eq!(memory.header.pass_rate, "100.0%");
        Ok(())
    }

    #[test]
    fn test_topic_only_on_mastery_notes() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-06-01T12:00:00.000");
        drill(&vault, "Borrowing", &["Rust"], now)?;
        let mastery_dir = vault.dir(RecordKind::Mastery);
        create_dir_all(&mastery_dir)?;
        MasteryRecord {
            path: mastery_dir.join("Pinning.md"),
            header: MasteryHeader {
                kind: RecordKind::Mastery,
                title: Some("Pinning".to_string()),
                source_drill_id: RecordId::new("0123456789abcdef0123456789"),
                topics: vec!["Async".to_string()],
                verified_at: Some(now),
            },
            body: "\n# Pinning\n".to_string(),
        }
        .write()?;
        rebuild_all(&vault)?;

        let topic = TopicRecord::load(&vault.dir(RecordKind::TopicIndex).join("Async.md"))?;
        assert_eq!(topic.header.pass_rate, "0.0%");
        assert!(topic.body.contains("- [[Pinning.md]]"));
        assert!(topic.body.contains("*No drills found for this topic.*"));
        Ok(())
    }

    #[test]
    fn test_stale_indexes_are_removed() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-06-01T12:00:00.000");
        let d = drill(&vault, "Fads", &["Hype"], now)?;
        drill(&vault, "Basics", &["Fundamentals"], now)?;
        rebuild_all(&vault)?;
        let dir = vault.dir(RecordKind::TopicIndex);
        let notes = dir.join("notes.md");
        write(&notes, "# My own notes\n")?;
        assert!(dir.join("Hype.md").exists());

        mark(&vault, d.id(), Outcome::Outdated, "", 0, now)?;
        let written = rebuild_all(&vault)?;
        assert_eq!(written, vec![dir.join("Fundamentals.md")]);
        assert!(!dir.join("Hype.md").exists());
        assert!(notes.exists());
        Ok(())
    }
}
