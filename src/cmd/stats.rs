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

use clap::ValueEnum;
use dojo_core::Date;
use dojo_core::Fallible;
use dojo_core::TopicStats;
use dojo_core::UpcomingDrill;
use dojo_core::Vault;
use dojo_core::VaultStats;
use dojo_core::streak;
use dojo_core::topics_stats;
use dojo_core::upcoming_drills;
use dojo_core::vault_stats;
use maud::DOCTYPE;
use maud::Markup;
use maud::html;
use serde::Serialize;

/// Drills listed in the full statistics report.
const UPCOMING_IN_REPORT: usize = 5;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsFormat {
    Text,
    Json,
    Html,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatsFormat::Text => "text",
            StatsFormat::Json => "json",
            StatsFormat::Html => "html",
        };
        write!(f, "{name}")
    }
}

#[derive(Serialize)]
struct StatsReport {
    today: Date,
    #[serde(flatten)]
    vault: VaultStats,
    streak: u32,
    topics: Vec<TopicStats>,
    upcoming: Vec<UpcomingDrill>,
}

fn collect_report(vault: &Vault, today: Date) -> Fallible<StatsReport> {
    Ok(StatsReport {
        today,
        vault: vault_stats(vault)?,
        streak: streak(vault, today)?,
        topics: topics_stats(vault)?,
        upcoming: upcoming_drills(vault, today, UPCOMING_IN_REPORT)?,
    })
}

pub fn print_stats(vault: &Vault, today: Date, format: StatsFormat) -> Fallible<()> {
    let report = collect_report(vault, today)?;
    let output = match format {
        StatsFormat::Text => render_text(&report),
        StatsFormat::Json => serde_json::to_string_pretty(&report)?,
        StatsFormat::Html => render_html(&report).into_string(),
    };
    println!("{output}");
    Ok(())
}

pub fn print_streak(vault: &Vault, today: Date) -> Fallible<()> {
    println!("{}", render_streak(streak(vault, today)?));
    Ok(())
}

pub fn print_topics(vault: &Vault) -> Fallible<()> {
    println!("{}", render_topics(&topics_stats(vault)?));
    Ok(())
}

pub fn print_upcoming(vault: &Vault, today: Date, count: usize) -> Fallible<()> {
    println!("{}", render_upcoming(&upcoming_drills(vault, today, count)?));
    Ok(())
}

fn render_streak(days: u32) -> String {
    match days {
        0 => "No current streak.".to_string(),
        1 => "Streak: 1 day".to_string(),
        n => format!("Streak: {n} days"),
    }
}

fn render_topics(topics: &[TopicStats]) -> String {
    if topics.is_empty() {
        return "No topics yet.".to_string();
    }
    topics
        .iter()
        .map(|topic| {
            format!(
                "{:<24} mastery {:>3}  passed {:>3}/{:<3}  avg rating {:.1}",
                topic.name, topic.mastery, topic.passed, topic.total, topic.avg_rating
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_upcoming(upcoming: &[UpcomingDrill]) -> String {
    if upcoming.is_empty() {
        return "No drills scheduled.".to_string();
    }
    upcoming
        .iter()
        .map(|drill| {
            let when = if drill.is_due {
                "due".to_string()
            } else {
                drill.next_review.to_string()
            };
            format!(
                "{:<10} {:<8} {} ({})",
                when,
                drill.status.as_str(),
                drill.title,
                drill.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_text(report: &StatsReport) -> String {
    let drills = &report.vault.drills;
    format!(
        "Drills: {} total ({} untried, {} passed, {} failed)\nMastery notes: {}\nSources: {}\n{}\n\nTopics:\n{}\n\nUpcoming:\n{}",
        drills.total,
        drills.untried,
        drills.passed,
        drills.failed,
        report.vault.mastery,
        report.vault.sources,
        render_streak(report.streak),
        render_topics(&report.topics),
        render_upcoming(&report.upcoming),
    )
}

fn render_html(report: &StatsReport) -> Markup {
    let drills = &report.vault.drills;
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "dojo stats" }
            }
            body {
                h1 { "Vault statistics as of " (report.today) }
                table {
                    tr { th { "Drills" } td { (drills.total) } }
                    tr { th { "Untried" } td { (drills.untried) } }
                    tr { th { "Passed" } td { (drills.passed) } }
                    tr { th { "Failed" } td { (drills.failed) } }
                    tr { th { "Mastery notes" } td { (report.vault.mastery) } }
                    tr { th { "Sources" } td { (report.vault.sources) } }
                    tr { th { "Streak" } td { (report.streak) } }
                }
                h2 { "Topics" }
                @if report.topics.is_empty() {
                    p { "No topics yet." }
                } @else {
                    table {
                        tr { th { "Topic" } th { "Mastery" } th { "Passed" } th { "Avg. rating" } }
                        @for topic in &report.topics {
                            tr {
                                td { (topic.name) }
                                td { (topic.mastery) }
                                td { (topic.passed) "/" (topic.total) }
                                td { (format!("{:.1}", topic.avg_rating)) }
                            }
                        }
                    }
                }
                h2 { "Upcoming" }
                ul {
                    @for drill in &report.upcoming {
                        li {
                            (drill.title) " "
                            @if drill.is_due {
                                strong { "due" }
                            } @else {
                                "(" (drill.next_review) ")"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use dojo_core::Outcome;
    use dojo_core::mark;

    use super::*;
    use crate::cmd::helper::drill;
    use crate::cmd::helper::tmp_vault;
    use crate::cmd::helper::ts;

    fn sample() -> Fallible<(tempfile::TempDir, StatsReport)> {
        let (dir, vault) = tmp_vault()?;
        let now = ts("2024-09-01T10:00:00.000");
        let d = drill(&vault, "Iterators", &["Rust"], now)?;
        drill(&vault, "Generics & Bounds", &["Rust"], now)?;
        mark(&vault, d.id(), Outcome::Passed, "", 5, now)?;
        let report = collect_report(&vault, now.date())?;
        Ok((dir, report))
    }

    #[test]
    fn test_text_report() -> Fallible<()> {
        let (_dir, report) = sample()?;
        let text = render_text(&report);
        assert!(text.starts_with("Drills: 2 total (1 untried, 1 passed, 0 failed)"));
        assert!(text.contains("Streak: 1 day"));
        assert!(text.contains("avg rating 5.0"));
        assert!(text.contains("2024-09-08 passed   Iterators"));
        Ok(())
    }

    #[test]
    fn test_json_report() -> Fallible<()> {
        let (_dir, report) = sample()?;
        let value: serde_json::Value = serde_json::from_str(&serde_json::to_string(&report)?)?;
        assert_eq!(value["drills"]["total"], 2);
        assert_eq!(value["streak"], 1);
        assert_eq!(value["topics"][0]["name"], "Rust");
        assert_eq!(value["upcoming"][0]["status"], "untried");
        assert_eq!(value["today"], "2024-09-01");
        Ok(())
    }

    #[test]
    fn test_html_report_escapes_titles() -> Fallible<()> {
        let (_dir, report) = sample()?;
        let html = render_html(&report).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Generics &amp; Bounds"));
        Ok(())
    }

    #[test]
    fn test_streak_wording() {
        assert_eq!(render_streak(0), "No current streak.");
        assert_eq!(render_streak(1), "Streak: 1 day");
        assert_eq!(render_streak(3), "Streak: 3 days");
    }
}
