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

use dojo_core::Date;
use dojo_core::DrillRecord;
use dojo_core::Fallible;
use dojo_core::Vault;
use dojo_core::count_today_logs;
use dojo_core::next_drill;

pub fn print_next(vault: &Vault, today: Date) -> Fallible<()> {
    println!("{}", render_next(vault, today)?);
    Ok(())
}

fn render_drill(drill: &DrillRecord) -> String {
    let mut lines = vec![
        format!("Next drill: {}", drill.title()),
        format!("  id:      {}", drill.id()),
        format!("  status:  {}", drill.status()),
    ];
    if let Some(timebox) = drill.header.timebox_min {
        lines.push(format!("  timebox: {timebox} min"));
    }
    lines.push(format!("  file:    {}", drill.path.display()));
    let sections = drill.sections();
    let task = sections.text("Drill");
    if !task.is_empty() {
        lines.push(String::new());
        lines.push(task.to_string());
    }
    lines.join("\n")
}

/// The next drill, or why there is none.
pub fn render_next(vault: &Vault, today: Date) -> Fallible<String> {
    if let Some(drill) = next_drill(vault, today)? {
        return Ok(render_drill(&drill));
    }
    let practiced = count_today_logs(vault, today)?;
    let cap = vault.config().defaults.max_drills_per_day;
    if practiced >= cap {
        Ok(format!(
            "Daily limit reached: {practiced} of {cap} drills practiced today. Come back tomorrow."
        ))
    } else {
        Ok("No drills due. Distill a source or come back later.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use dojo_core::Outcome;
    use dojo_core::VaultConfig;
    use dojo_core::mark;
    use tempfile::tempdir;

    use super::*;
    use crate::cmd::helper::drill;
    use crate::cmd::helper::tmp_vault;
    use crate::cmd::helper::ts;

    #[test]
    fn test_next_drill_is_shown() -> Fallible<()> {
        let (_dir, vault) = tmp_vault()?;
        let now = ts("2024-09-01T10:00:00.000");
        let d = drill(&vault, "Pattern Matching", &[], now)?;
        let out = render_next(&vault, now.date())?;
        assert!(out.starts_with("Next drill: Pattern Matching"));
        assert!(out.contains(d.id().as_str()));
        assert!(out.contains("timebox: 10 min"));
        assert!(out.contains("**Goal:**"));
        Ok(())
    }

    #[test]
    fn test_nothing_due_and_daily_limit_differ() -> Fallible<()> {
        let dir = tempdir()?;
        let mut config = VaultConfig::default();
        config.defaults.max_drills_per_day = 1;
        config.save(dir.path())?;
        let vault = Vault::open(dir.path())?;
        let now = ts("2024-09-01T10:00:00.000");

        assert!(render_next(&vault, now.date())?.starts_with("No drills due."));

        let d = drill(&vault, "Once", &[], now)?;
        drill(&vault, "Twice", &[], now)?;
        mark(&vault, d.id(), Outcome::Passed, "", 0, now)?;
        assert!(render_next(&vault, now.date())?.starts_with("Daily limit reached: 1 of 1"));
        Ok(())
    }
}
