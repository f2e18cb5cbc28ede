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

//! The `_Dashboard.md` note at the vault root.

use std::fmt::Display;
use std::fmt::Formatter;
use std::fs::write;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::Fallible;
use crate::stats::streak;
use crate::stats::topics_stats;
use crate::stats::upcoming_drills;
use crate::stats::vault_stats;
use crate::store::Vault;
use crate::types::date::Date;

pub const DASHBOARD_FILE: &str = "_Dashboard.md";

const UPCOMING_ON_DASHBOARD: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Beginner,
    Apprentice,
    Expert,
}

impl Rank {
    pub fn from_mastery(count: usize) -> Self {
        if count >= 16 {
            Rank::Expert
        } else if count >= 6 {
            Rank::Apprentice
        } else {
            Rank::Beginner
        }
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Rank::Beginner => "Beginner",
            Rank::Apprentice => "Apprentice",
            Rank::Expert => "Expert",
        };
        write!(f, "{name}")
    }
}

/// Renders the dashboard as of `today` and writes it to the vault root.
pub fn write_dashboard(vault: &Vault, today: Date) -> Fallible<PathBuf> {
    let stats = vault_stats(vault)?;
    let streak = streak(vault, today)?;
    let rank = Rank::from_mastery(stats.mastery);

    let upcoming = upcoming_drills(vault, today, UPCOMING_ON_DASHBOARD)?;
    let upcoming = if upcoming.is_empty() {
        "*Nothing scheduled.*".to_string()
    } else {
        upcoming
            .iter()
            .map(|drill| {
                let when = if drill.is_due {
                    "due".to_string()
                } else {
                    drill.next_review.to_string()
                };
                format!(
                    "- [[{}|{}]] ({}, {when})",
                    drill.file_name, drill.title, drill.status
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let topics = topics_stats(vault)?;
    let topics = if topics.is_empty() {
        "*No topics yet.*".to_string()
    } else {
        topics
            .iter()
            .map(|topic| {
                format!(
                    "- {}: {} mastered, {}/{} drills passed",
                    topic.name, topic.mastery, topic.passed, topic.total
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let content = format!(
        "# Dojo Dashboard\n\n## Quick Stats\n- **Rank:** {rank}\n- **Mastery:** {} notes verified\n- **Streak:** {streak} days\n- **Total Drills:** {}\n\n## Due for Practice\n{upcoming}\n\n## Knowledge Topics\n{topics}\n\n---\n*Dashboard as of {today}*\n",
        stats.mastery, stats.drills.total,
    );
    let path = vault.root().join(DASHBOARD_FILE);
    write(&path, content)?;
    log::debug!("Wrote dashboard: {}", path.display());
    Ok(path)
}
