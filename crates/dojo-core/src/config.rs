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

use std::fs::read_to_string;
use std::fs::write;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// Name of the configuration file at the root of a vault.
pub const CONFIG_FILE: &str = "dojo.toml";

const DEFAULT_MAX_DRILLS_PER_DAY: usize = 5;
const DEFAULT_TIMEBOX_MIN: u32 = 10;

/// Per-vault configuration, read from `dojo.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub defaults: Defaults,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Once this many practice logs exist for today, no further drill is
    /// handed out.
    pub max_drills_per_day: usize,
    /// Timebox for drills that do not specify one.
    pub timebox_min: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            max_drills_per_day: DEFAULT_MAX_DRILLS_PER_DAY,
            timebox_min: DEFAULT_TIMEBOX_MIN,
        }
    }
}

impl VaultConfig {
    /// Loads the configuration of the vault at `root`. A missing file means
    /// defaults; a malformed one is an error.
    pub fn load(root: &Path) -> Fallible<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No {CONFIG_FILE} in {}, using defaults.", root.display());
            return Ok(Self::default());
        }
        let text = read_to_string(&path)?;
        toml::from_str(&text)
            .map_err(|e| ErrorReport::new(format!("Failed to parse {}: {e}", path.display())))
    }

    pub fn save(&self, root: &Path) -> Fallible<()> {
        write(root.join(CONFIG_FILE), toml::to_string(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() -> Fallible<()> {
        let dir = tempdir()?;
        let config = VaultConfig::load(dir.path())?;
        assert_eq!(config.defaults.max_drills_per_day, 5);
        assert_eq!(config.defaults.timebox_min, 10);
        Ok(())
    }

    #[test]
    fn test_partial_file() -> Fallible<()> {
        let dir = tempdir()?;
        write(
            dir.path().join(CONFIG_FILE),
            "[defaults]\nmax_drills_per_day = 2\n",
        )?;
        let config = VaultConfig::load(dir.path())?;
        assert_eq!(config.defaults.max_drills_per_day, 2);
        assert_eq!(config.defaults.timebox_min, 10);
        Ok(())
    }

    #[test]
    fn test_malformed_file() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join(CONFIG_FILE), "[defaults\n")?;
        assert!(VaultConfig::load(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Fallible<()> {
        let dir = tempdir()?;
        let mut config = VaultConfig::default();
        config.defaults.timebox_min = 25;
        config.save(dir.path())?;
        assert_eq!(VaultConfig::load(dir.path())?, config);
        Ok(())
    }
}
