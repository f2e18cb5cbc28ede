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

//! The trainer: which drill is due next, and what happens when a drill is
//! marked.
//!
//! Review intervals follow a fixed ladder rather than an adaptive model: a
//! drill passed for the first time comes back after a week, then after three
//! weeks, then two months, then every ninety days. A failed drill comes back
//! the next day.

use std::fs::create_dir_all;
use std::fs::rename;
use std::path::PathBuf;

use crate::error::Fallible;
use crate::error::fail;
use crate::frontmatter;
use crate::frontmatter::Header;
use crate::records::DrillRecord;
use crate::records::PracticeLogHeader;
use crate::records::PracticeLogRecord;
use crate::slug::slugify;
use crate::store::Vault;
use crate::store::vacant_path;
use crate::types::date::Date;
use crate::types::kind::RecordKind;
use crate::types::record_id::RecordId;
use crate::types::status::DrillStatus;
use crate::types::status::Outcome;
use crate::types::timestamp::Timestamp;

/// Days until the next review, indexed by how many times the drill has been
/// passed before.
const INTERVAL_LADDER: [i64; 3] = [7, 21, 60];

/// The interval once the ladder is exhausted.
const MAX_INTERVAL: i64 = 90;

/// Failed drills come back after this many days.
const RETRY_INTERVAL: i64 = 1;

const MAX_RATING: u8 = 5;

/// The review interval in days after a pass, given the review count before
/// the pass.
pub fn interval(review_count: u32) -> i64 {
    INTERVAL_LADDER
        .get(review_count as usize)
        .copied()
        .unwrap_or(MAX_INTERVAL)
}

/// How many practice logs are dated `today`.
pub fn count_today_logs(vault: &Vault, today: Date) -> Fallible<usize> {
    Ok(vault
        .practice_log_dates()?
        .into_iter()
        .filter(|date| *date == today)
        .count())
}

/// Active drills due on `today`, best first: untried before failed before
/// passed, ties broken by filename.
pub fn due_drills(vault: &Vault, today: Date) -> Fallible<Vec<DrillRecord>> {
    let mut due: Vec<DrillRecord> = vault
        .drills()?
        .into_iter()
        .filter(|drill| drill.is_due(today))
        .collect();
    due.sort_by(|a, b| {
        (a.status().priority(), a.file_name()).cmp(&(b.status().priority(), b.file_name()))
    });
    Ok(due)
}

/// The drill to practice next, or `None` when nothing is due or today's cap
/// has been reached. Callers that need to tell the two apart can compare
/// [`count_today_logs`] against the cap.
pub fn next_drill(vault: &Vault, today: Date) -> Fallible<Option<DrillRecord>> {
    let practiced = count_today_logs(vault, today)?;
    let cap = vault.config().defaults.max_drills_per_day;
    if practiced >= cap {
        log::debug!("Daily cap reached: {practiced} of {cap} drills practiced.");
        return Ok(None);
    }
    Ok(due_drills(vault, today)?.into_iter().next())
}

/// Whether today's cap has been reached.
pub fn daily_cap_reached(vault: &Vault, today: Date) -> Fallible<bool> {
    Ok(count_today_logs(vault, today)? >= vault.config().defaults.max_drills_per_day)
}

/// What marking a drill did.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkReceipt {
    pub log_path: PathBuf,
    /// Where the drill lives now. Archived drills have moved.
    pub drill_path: PathBuf,
    pub status: DrillStatus,
    /// `None` for archived drills, which are never reviewed again.
    pub next_review: Option<Date>,
    pub review_count: u32,
}

/// Marks the active drill with the given id. Returns `None`, and writes
/// nothing, when there is no such drill.
pub fn mark(
    vault: &Vault,
    drill_id: &RecordId,
    outcome: Outcome,
    notes: &str,
    rating: u8,
    now: Timestamp,
) -> Fallible<Option<MarkReceipt>> {
    validate_rating(rating)?;
    match vault.find_drill(drill_id)? {
        Some(drill) => mark_drill(vault, &drill, outcome, notes, rating, now).map(Some),
        None => Ok(None),
    }
}

fn validate_rating(rating: u8) -> Fallible<()> {
    if rating > MAX_RATING {
        return fail(format!(
            "invalid rating: {rating} (expected 1 to {MAX_RATING}, or 0 for none)"
        ));
    }
    Ok(())
}

/// Records a practice attempt on `drill` and applies the outcome: a log is
/// always written first, then the drill's header is updated, and archival
/// outcomes finally move the drill into the archive.
pub fn mark_drill(
    vault: &Vault,
    drill: &DrillRecord,
    outcome: Outcome,
    notes: &str,
    rating: u8,
    now: Timestamp,
) -> Fallible<MarkReceipt> {
    validate_rating(rating)?;
    let log = write_practice_log(vault, drill, outcome, notes, rating, now)?;
    let today = now.date();
    let review_count = drill.header.review_count;

    let mut updates = Header::new();
    updates.insert("status".into(), outcome.status().as_str().into());

    let receipt = match outcome {
        Outcome::Passed => {
            let next_review = today.add_days(interval(review_count));
            let review_count = review_count + 1;
            updates.insert("review_count".into(), i64::from(review_count).into());
            updates.insert("next_review".into(), next_review.to_string().into());
            frontmatter::update(&drill.path, updates)?;
            MarkReceipt {
                log_path: log.path,
                drill_path: drill.path.clone(),
                status: DrillStatus::Passed,
                next_review: Some(next_review),
                review_count,
            }
        }
        Outcome::Failed => {
            let next_review = today.add_days(RETRY_INTERVAL);
            updates.insert("next_review".into(), next_review.to_string().into());
            frontmatter::update(&drill.path, updates)?;
            MarkReceipt {
                log_path: log.path,
                drill_path: drill.path.clone(),
                status: DrillStatus::Failed,
                next_review: Some(next_review),
                review_count,
            }
        }
        Outcome::Bullshit | Outcome::Outdated => {
            // The header is updated in place first, so the archived copy
            // carries the new status.
            frontmatter::update(&drill.path, updates)?;
            let archive = vault.archive_dir();
            create_dir_all(&archive)?;
            // An earlier drill archived under the same name keeps its file.
            let target = vacant_path(&archive, drill.file_stem());
            rename(&drill.path, &target)?;
            log::debug!(
                "Archived {} as {outcome}: {}",
                drill.id(),
                target.display()
            );
            MarkReceipt {
                log_path: log.path,
                drill_path: target,
                status: outcome.status(),
                next_review: None,
                review_count,
            }
        }
    };
    log::debug!(
        "Marked {} as {outcome}, now {}.",
        drill.id(),
        receipt.status
    );
    Ok(receipt)
}

/// Writes the log of one practice attempt. Several attempts at the same
/// drill on the same day get numbered filenames instead of overwriting each
/// other.
pub fn write_practice_log(
    vault: &Vault,
    drill: &DrillRecord,
    outcome: Outcome,
    notes: &str,
    rating: u8,
    now: Timestamp,
) -> Fallible<PracticeLogRecord> {
    let dir = vault.dir(RecordKind::PracticeLog);
    create_dir_all(&dir)?;
    let date = now.date();
    let path = vacant_path(&dir, &format!("{date}__{}", slugify(drill.slug())));
    let title = drill.title();
    let notes = if notes.trim().is_empty() {
        "No notes provided."
    } else {
        notes.trim()
    };
    let body = format!(
        "\n# Practice Log: {title}\n\n**Date:** {date}\n**Result:** {outcome}\n\n## Notes\n{notes}\n\n---\n*Drill: [[{}]]*\n",
        drill.file_name()
    );
    let log = PracticeLogRecord {
        path,
        header: PracticeLogHeader {
            kind: RecordKind::PracticeLog,
            drill_id: drill.id().clone(),
            drill_title: title,
            result: outcome,
            rating,
            timestamp: Some(now),
        },
        body,
    };
    log.write()?;
    Ok(log)
}
