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

//! Shared fixtures for unit tests.

use tempfile::TempDir;
use tempfile::tempdir;

use crate::error::Fallible;
use crate::frontmatter;
use crate::frontmatter::Header;
use crate::records::DrillRecord;
use crate::store::Vault;
use crate::types::date::Date;
use crate::types::status::DrillStatus;
use crate::types::timestamp::Timestamp;
use crate::writer::DrillDraft;

/// A fresh, empty vault in a temporary directory. Keep the `TempDir` alive
/// for as long as the vault is used.
pub fn tmp_vault() -> Fallible<(TempDir, Vault)> {
    let dir = tempdir()?;
    let vault = Vault::open(dir.path())?;
    Ok((dir, vault))
}

pub fn ts(s: &str) -> Timestamp {
    Timestamp::try_from(s.to_string()).unwrap()
}

pub fn date(s: &str) -> Date {
    Date::try_from(s.to_string()).unwrap()
}

/// Creates a drill with the given title and topics.
pub fn drill(vault: &Vault, title: &str, topics: &[&str], now: Timestamp) -> Fallible<DrillRecord> {
    let draft = DrillDraft {
        topics: topics.iter().map(|t| t.to_string()).collect(),
        ..DrillDraft::new(title)
    };
    vault.create_drill(&draft, now)
}

/// Overwrites the status and review date of a drill, the way a hand edit
/// would.
pub fn set_state(
    drill: &DrillRecord,
    status: DrillStatus,
    next_review: Date,
) -> Fallible<DrillRecord> {
    let mut updates = Header::new();
    updates.insert("status".into(), status.as_str().into());
    updates.insert("next_review".into(), next_review.to_string().into());
    frontmatter::update(&drill.path, updates)?;
    DrillRecord::load(&drill.path)
}
