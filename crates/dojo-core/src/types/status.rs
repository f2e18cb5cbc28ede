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

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;

/// Where a drill is in its lifecycle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrillStatus {
    #[default]
    Untried,
    Passed,
    Failed,
    /// Archived: the drill turned out to be wrong or useless.
    Bullshit,
    /// Archived: the drill no longer applies.
    Outdated,
}

impl DrillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrillStatus::Untried => "untried",
            DrillStatus::Passed => "passed",
            DrillStatus::Failed => "failed",
            DrillStatus::Bullshit => "bullshit",
            DrillStatus::Outdated => "outdated",
        }
    }

    /// Active drills take part in scheduling. Archived ones never do.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            DrillStatus::Untried | DrillStatus::Passed | DrillStatus::Failed
        )
    }

    /// Scheduling priority, lower first: untried, then failed, then passed.
    pub fn priority(&self) -> u8 {
        match self {
            DrillStatus::Untried => 0,
            DrillStatus::Failed => 1,
            DrillStatus::Passed => 2,
            DrillStatus::Bullshit | DrillStatus::Outdated => 3,
        }
    }
}

impl Display for DrillStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The result of one practice attempt.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Bullshit,
    Outdated,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Bullshit => "bullshit",
            Outcome::Outdated => "outdated",
        }
    }

    /// The status a drill takes on after this outcome.
    pub fn status(&self) -> DrillStatus {
        match self {
            Outcome::Passed => DrillStatus::Passed,
            Outcome::Failed => DrillStatus::Failed,
            Outcome::Bullshit => DrillStatus::Bullshit,
            Outcome::Outdated => DrillStatus::Outdated,
        }
    }

    /// Whether this outcome moves the drill into the archive.
    pub fn archives(&self) -> bool {
        matches!(self, Outcome::Bullshit | Outcome::Outdated)
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ErrorReport;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "passed" => Ok(Outcome::Passed),
            "failed" => Ok(Outcome::Failed),
            "bullshit" => Ok(Outcome::Bullshit),
            "outdated" => Ok(Outcome::Outdated),
            _ => fail(format!(
                "invalid result: '{value}' (expected passed, failed, bullshit or outdated)"
            )),
        }
    }
}
