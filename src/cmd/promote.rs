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

use dojo_core::Fallible;
use dojo_core::RecordId;
use dojo_core::Timestamp;
use dojo_core::Vault;
use dojo_core::fail;
use dojo_core::promote;

pub fn promote_drill(
    vault: &Vault,
    drill: &str,
    reflection: Option<&str>,
    now: Timestamp,
) -> Fallible<()> {
    let id = RecordId::new(drill);
    match promote(vault, &id, reflection, now)? {
        Some(note) => {
            println!("Promoted to {}", note.path.display());
            Ok(())
        }
        None => fail(format!("no active drill with id '{id}'.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::helper::tmp_vault;
    use crate::cmd::helper::ts;

    #[test]
    fn test_promote_unknown_drill() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-09-01T10:00:00.000");
        let err = promote_drill(&vault, "nope", None, now).err().unwrap();
        assert_eq!(err.to_string(), "error: no active drill with id 'nope'.");
        Ok(())
    }
}
