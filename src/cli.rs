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

use clap::Parser;
use clap::Subcommand;
use dojo_core::Fallible;
use dojo_core::Timestamp;

use crate::cmd::maintenance::reindex;
use crate::cmd::maintenance::update_dashboard;
use crate::cmd::mark::mark_drill;
use crate::cmd::next::print_next;
use crate::cmd::open_vault;
use crate::cmd::promote::promote_drill;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::cmd::stats::print_streak;
use crate::cmd::stats::print_topics;
use crate::cmd::stats::print_upcoming;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the vault directory. By default, the current working directory is used.
    #[arg(long, global = true)]
    vault: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the next drill due for practice.
    Next,
    /// Record the result of a practice attempt.
    Mark {
        /// One of: passed, failed, bullshit, outdated.
        result: String,
        /// Id of the drill to mark. By default, the next due drill is marked.
        #[arg(long)]
        drill: Option<String>,
        /// Free-text notes for the practice log.
        #[arg(long, default_value = "")]
        notes: String,
        /// Quality rating from 1 to 5. Zero means unrated.
        #[arg(long, default_value_t = 0)]
        rating: u8,
    },
    /// Turn a drill into a permanent mastery note.
    Promote {
        /// Id of the drill to promote.
        drill: String,
        /// Reflection to use as the concept definition instead of the drill's pattern.
        #[arg(long)]
        reflection: Option<String>,
    },
    /// Print vault statistics.
    Stats {
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Print the current practice streak.
    Streak,
    /// Print per-topic statistics.
    Topics,
    /// List the drills coming up for practice.
    Upcoming {
        /// How many drills to list.
        #[arg(long, default_value_t = 3)]
        count: usize,
    },
    /// Rebuild every topic index.
    Reindex,
    /// Write the vault dashboard note.
    Dashboard,
}

pub fn entrypoint() -> Fallible<()> {
    let cli = Cli::parse();
    let vault = open_vault(cli.vault)?;
    let now = Timestamp::now();
    let today = now.date();
    match cli.command {
        Command::Next => print_next(&vault, today),
        Command::Mark {
            result,
            drill,
            notes,
            rating,
        } => mark_drill(&vault, &result, drill, &notes, rating, now),
        Command::Promote { drill, reflection } => {
            promote_drill(&vault, &drill, reflection.as_deref(), now)
        }
        Command::Stats { format } => print_stats(&vault, today, format),
        Command::Streak => print_streak(&vault, today),
        Command::Topics => print_topics(&vault),
        Command::Upcoming { count } => print_upcoming(&vault, today, count),
        Command::Reindex => reindex(&vault),
        Command::Dashboard => update_dashboard(&vault, today),
    }
}
