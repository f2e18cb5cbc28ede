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

//! Read-only aggregates over a vault: counts, streaks, topic rollups and the
//! upcoming-drill queue.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;

use serde::Serialize;

use crate::error::Fallible;
use crate::store::Vault;
use crate::types::date::Date;
use crate::types::kind::RecordKind;
use crate::types::record_id::RecordId;
use crate::types::status::DrillStatus;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DrillCounts {
    pub untried: usize,
    pub passed: usize,
    pub failed: usize,
    /// Every drill file, including ones whose header could not be read.
    pub total: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VaultStats {
    pub drills: DrillCounts,
    pub mastery: usize,
    pub sources: usize,
}

pub fn vault_stats(vault: &Vault) -> Fallible<VaultStats> {
    let mut drills = DrillCounts {
        total: vault.count(RecordKind::Drill)?,
        ..DrillCounts::default()
    };
    for drill in vault.drills()? {
        match drill.status() {
            DrillStatus::Untried => drills.untried += 1,
            DrillStatus::Passed => drills.passed += 1,
            DrillStatus::Failed => drills.failed += 1,
            DrillStatus::Bullshit | DrillStatus::Outdated => {}
        }
    }
    Ok(VaultStats {
        drills,
        mastery: vault.count(RecordKind::Mastery)?,
        sources: vault.count(RecordKind::Source)?,
    })
}

/// The number of consecutive days with at least one practice log, ending
/// today, or yesterday if nothing has been practiced yet today. Anything
/// before the first gap does not count.
pub fn streak(vault: &Vault, today: Date) -> Fallible<u32> {
    let dates: BTreeSet<Date> = vault.practice_log_dates()?.into_iter().collect();
    Ok(streak_from(&dates, today))
}

fn streak_from(dates: &BTreeSet<Date>, today: Date) -> u32 {
    let mut day = if dates.contains(&today) {
        today
    } else if dates.contains(&today.yesterday()) {
        today.yesterday()
    } else {
        return 0;
    };
    let mut streak = 0;
    while dates.contains(&day) {
        streak += 1;
        day = day.yesterday();
    }
    streak
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopicStats {
    pub name: String,
    /// Active drills carrying the topic.
    pub total: usize,
    pub passed: usize,
    pub mastery: usize,
    /// Mean of the non-zero ratings logged against the topic's drills, or
    /// zero when none were rated.
    pub avg_rating: f64,
}

#[derive(Default)]
struct TopicTally {
    total: usize,
    passed: usize,
    mastery: usize,
    ratings: Vec<u8>,
}

/// Per-topic rollups, most mastered first. Topics with equal mastery are in
/// name order.
pub fn topics_stats(vault: &Vault) -> Fallible<Vec<TopicStats>> {
    let mut ratings: HashMap<RecordId, Vec<u8>> = HashMap::new();
    for log in vault.practice_logs()? {
        if log.header.drill_id.is_empty() || log.header.rating == 0 {
            continue;
        }
        ratings
            .entry(log.header.drill_id)
            .or_default()
            .push(log.header.rating);
    }

    let mut tallies: BTreeMap<String, TopicTally> = BTreeMap::new();
    for drill in vault.drills()? {
        let drill_ratings = ratings.get(drill.id());
        for topic in &drill.header.topics {
            let tally = tallies.entry(topic.clone()).or_default();
            tally.total += 1;
            if drill.status() == DrillStatus::Passed {
                tally.passed += 1;
            }
            if let Some(drill_ratings) = drill_ratings {
                tally.ratings.extend(drill_ratings);
            }
        }
    }
    for note in vault.mastery_notes()? {
        for topic in &note.header.topics {
            tallies.entry(topic.clone()).or_default().mastery += 1;
        }
    }

    let mut stats: Vec<TopicStats> = tallies
        .into_iter()
        .map(|(name, tally)| {
            let avg_rating = if tally.ratings.is_empty() {
                0.0
            } else {
                let sum: u32 = tally.ratings.iter().map(|r| u32::from(*r)).sum();
                f64::from(sum) / tally.ratings.len() as f64
            };
            TopicStats {
                name,
                total: tally.total,
                passed: tally.passed,
                mastery: tally.mastery,
                avg_rating,
            }
        })
        .collect();
    stats.sort_by(|a, b| b.mastery.cmp(&a.mastery));
    Ok(stats)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpcomingDrill {
    pub id: RecordId,
    pub title: String,
    pub file_name: String,
    pub status: DrillStatus,
    pub next_review: Date,
    pub topics: Vec<String>,
    pub is_due: bool,
}

/// The next `count` drills in practice order, ignoring the daily cap. Due
/// drills always come first; within each group drills are ordered by status
/// priority, then review date, then title.
pub fn upcoming_drills(vault: &Vault, today: Date, count: usize) -> Fallible<Vec<UpcomingDrill>> {
    let mut upcoming: Vec<UpcomingDrill> = vault
        .drills()?
        .into_iter()
        .filter(|drill| drill.status().is_active())
        .map(|drill| UpcomingDrill {
            id: drill.id().clone(),
            title: drill.title(),
            file_name: drill.file_name().to_string(),
            status: drill.status(),
            next_review: drill.next_review(today),
            is_due: drill.is_due(today),
            topics: drill.header.topics,
        })
        .collect();
    upcoming.sort_by(|a, b| {
        (!a.is_due, a.status.priority(), a.next_review, &a.title).cmp(&(
            !b.is_due,
            b.status.priority(),
            b.next_review,
            &b.title,
        ))
    });
    upcoming.truncate(count);
    Ok(upcoming)
}
