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
use dojo_core::MarkReceipt;
use dojo_core::Outcome;
use dojo_core::RecordId;
use dojo_core::Timestamp;
use dojo_core::Vault;
use dojo_core::daily_cap_reached;
use dojo_core::fail;
use dojo_core::mark;
use dojo_core::next_drill;

/// Marks the drill with id `drill`, or the next due drill when no id is
/// given.
pub fn mark_drill(
    vault: &Vault,
    result: &str,
    drill: Option<String>,
    notes: &str,
    rating: u8,
    now: Timestamp,
) -> Fallible<()> {
    println!("{}", run_mark(vault, result, drill, notes, rating, now)?);
    Ok(())
}

fn run_mark(
    vault: &Vault,
    result: &str,
    drill: Option<String>,
    notes: &str,
    rating: u8,
    now: Timestamp,
) -> Fallible<String> {
    let outcome: Outcome = result.parse()?;
    let id = match drill {
        Some(id) => RecordId::new(id),
        None => match next_drill(vault, now.date())? {
            Some(drill) => drill.header.id,
            None if daily_cap_reached(vault, now.date())? => {
                return fail(format!(
                    "no drill to mark: daily limit of {} reached. Pass --drill to mark one anyway.",
                    vault.config().defaults.max_drills_per_day
                ));
            }
            None => return fail("no drill to mark: nothing is due."),
        },
    };
    match mark(vault, &id, outcome, notes, rating, now)? {
        Some(receipt) => Ok(render_receipt(outcome, &receipt)),
        None => fail(format!("no active drill with id '{id}'.")),
    }
}

fn render_receipt(outcome: Outcome, receipt: &MarkReceipt) -> String {
    let mut lines = vec![format!("Marked as {outcome}.")];
    if outcome.archives() {
        lines.push(format!("Archived to {}", receipt.drill_path.display()));
    }
    if let Some(next_review) = receipt.next_review {
        lines.push(format!("Next review: {next_review}"));
    }
    lines.push(format!("Log: {}", receipt.log_path.display()));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use dojo_core::DrillRecord;
    use dojo_core::DrillStatus;
    use dojo_core::VaultConfig;
    use tempfile::tempdir;

    use super::*;
    use crate::cmd::helper::drill;
    use crate::cmd::helper::tmp_vault;
    use crate::cmd::helper::ts;

    #[test]
    fn test_mark_next_due_drill() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-09-01T10:00:00.000");
        let d = drill(&vault, "Shadowing", &[], now)?;
        let out = run_mark(&vault, "passed", None, "Smooth", 4, now)?;
        assert!(out.starts_with("Marked as passed."));
        assert!(out.contains("Next review: 2024-09-08"));
        assert_eq!(DrillRecord::load(&d.path)?.status(), DrillStatus::Passed);
        Ok(())
    }

    #[test]
    fn test_mark_by_id_and_archive() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-09-01T10:00:00.000");
        let d = drill(&vault, "Hype", &[], now)?;
        let out = run_mark(&vault, "outdated", Some(d.id().to_string()), "", 0, now)?;
        assert!(out.contains("Archived to"));
        assert!(!d.path.exists());
        Ok(())
    }

    #[test]
    fn test_daily_limit_is_named_when_marking_next() -> Fallible<()> {
        let dir = tempdir()?;
        let mut config = VaultConfig::default();
        config.defaults.max_drills_per_day = 1;
        config.save(dir.path())?;
        let vault = Vault::open(dir.path())?;
        let now = ts("2024-09-01T10:00:00.000");

        let err = run_mark(&vault, "passed", None, "", 0, now).err().unwrap();
        assert!(err.to_string().contains("nothing is due"));

        drill(&vault, "Once", &[], now)?;
        let twice = drill(&vault, "Twice", &[], now)?;
        run_mark(&vault, "passed", None, "", 0, now)?;
        let err = run_mark(&vault, "passed", None, "", 0, now).err().unwrap();
        assert!(err.to_string().contains("daily limit of 1 reached"));

        run_mark(&vault, "failed", Some(twice.id().to_string()), "", 0, now)?;
        assert_eq!(DrillRecord::load(&twice.path)?.status(), DrillStatus::Failed);
        Ok(())
    }

    #[test]
    fn test_bad_input() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-09-01T10:00:00.000");
        assert!(run_mark(&vault, "passed", None, "", 0, now).is_err());
        drill(&vault, "Real", &[], now)?;
        let err = run_mark(&vault, "maybe", None, "", 0, now).err().unwrap();
        assert!(err.to_string().contains("invalid result: 'maybe'"));
        assert!(run_mark(&vault, "passed", Some("nope".to_string()), "", 0, now).is_err());
        assert_eq!(dojo_core::count_today_logs(&vault, now.date())?, 0);
        Ok(())
    }
}
