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

pub mod maintenance;
pub mod mark;
pub mod next;
pub mod promote;
pub mod stats;

use std::env::current_dir;
use std::path::PathBuf;

use dojo_core::Fallible;
use dojo_core::Vault;

/// Opens the vault at `directory`, or the current working directory if
/// none is given.
pub fn open_vault(directory: Option<String>) -> Fallible<Vault> {
    let directory: PathBuf = match directory {
        Some(directory) => PathBuf::from(directory),
        None => current_dir()?,
    };
    log::debug!("Opening vault: {}", directory.display());
    Vault::open(directory)
}

#[cfg(test)]
pub mod helper {
    use dojo_core::DrillDraft;
    use dojo_core::DrillRecord;
    use dojo_core::Fallible;
    use dojo_core::Timestamp;
    use dojo_core::Vault;
    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::open_vault;

    pub fn tmp_vault() -> Fallible<(TempDir, Vault)> {
        let dir = tempdir()?;
        let vault = open_vault(Some(dir.path().display().to_string()))?;
        Ok((dir, vault))
    }

    pub fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    pub fn drill(vault: &Vault, title: &str, topics: &[&str], now: Timestamp) -> Fallible<DrillRecord> {
        let draft = DrillDraft {
            topics: topics.iter().map(|t| t.to_string()).collect(),
            ..DrillDraft::new(title)
        };
        vault.create_drill(&draft, now)
    }
}
