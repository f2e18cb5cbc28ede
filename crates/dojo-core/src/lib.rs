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

//! dojo-core: the trainer engine behind the dojo practice vault.
//!
//! This library provides:
//! - Reading and writing vault records (sources, drills, practice logs,
//!   mastery notes, topic indexes) as Markdown with a TOML header
//! - Picking the next due drill and applying practice outcomes
//! - Streaks, vault counts and per-topic statistics
//! - Promotion of passed drills into mastery notes
//! - Seams for the distillation and similarity-search collaborators

pub mod config;
pub mod dashboard;
pub mod distill;
pub mod error;
pub mod frontmatter;
pub mod promote;
pub mod records;
pub mod scheduler;
pub mod sections;
pub mod slug;
pub mod stats;
pub mod store;
pub mod topics;
pub mod types;
pub mod writer;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::VaultConfig;
pub use dashboard::write_dashboard;
pub use distill::{Distiller, DrillProposal, SimilarItem, SimilaritySearch};
pub use error::{ErrorReport, Fallible, fail};
pub use promote::promote;
pub use records::{DrillRecord, MasteryRecord, PracticeLogRecord, SourceRecord};
pub use scheduler::{MarkReceipt, count_today_logs, daily_cap_reached, mark, next_drill};
pub use stats::{
    TopicStats, UpcomingDrill, VaultStats, streak, topics_stats, upcoming_drills, vault_stats,
};
pub use store::Vault;
pub use types::date::Date;
pub use types::kind::RecordKind;
pub use types::record_id::RecordId;
pub use types::status::{DrillStatus, Outcome};
pub use types::timestamp::Timestamp;
pub use writer::{DrillDraft, SourceCapture};
