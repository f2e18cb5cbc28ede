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

use chrono::Duration;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;

/// A calendar date, written as `YYYY-MM-DD` in record headers and log
/// filenames.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Date(NaiveDate);

impl Date {
    pub fn new(naive_date: NaiveDate) -> Self {
        Self(naive_date)
    }

    #[cfg(feature = "clock")]
    pub fn today() -> Self {
        Self(chrono::Local::now().naive_local().date())
    }

    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// The date `days` days after this one. Negative values go backwards.
    pub fn add_days(self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    pub fn yesterday(self) -> Self {
        self.add_days(-1)
    }

    /// Parses a date from the first ten bytes of a string, as in a practice
    /// log filename like `2024-01-02__some-drill.md`.
    pub fn from_prefix(s: &str) -> Option<Self> {
        let prefix = s.get(..10)?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok().map(Self)
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl TryFrom<String> for Date {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        // Tolerate a time component, which hand-edited headers sometimes carry.
        let date_part = value.split('T').next().unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|_| ErrorReport::new(format!("invalid date: {}", value)))?;
        Ok(Date(date))
    }
}

impl From<Date> for String {
    fn from(date: Date) -> String {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_serialize() -> Fallible<()> {
        let serialized = serde_json::to_string(&ymd(2024, 1, 2))?;
        assert_eq!(serialized, "\"2024-01-02\"");
        Ok(())
    }

    #[test]
    fn test_deserialize_with_time_component() -> Fallible<()> {
        let date: Date = serde_json::from_str("\"2024-03-09T08:15:00\"")?;
        assert_eq!(date, ymd(2024, 3, 9));
        Ok(())
    }

    #[test]
    fn test_add_days_crosses_month() {
        assert_eq!(ymd(2024, 1, 30).add_days(7), ymd(2024, 2, 6));
        assert_eq!(ymd(2024, 3, 1).yesterday(), ymd(2024, 2, 29));
    }

    #[test]
    fn test_from_prefix() {
        assert_eq!(
            Date::from_prefix("2024-05-06__closures.md"),
            Some(ymd(2024, 5, 6))
        );
        assert_eq!(Date::from_prefix("DRILL__closures.md"), None);
        assert_eq!(Date::from_prefix("2024"), None);
    }
}
