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

use serde::Deserialize;
use serde::Serialize;

use crate::types::kind::RecordKind;
use crate::types::timestamp::Timestamp;

/// Number of hex digits kept from the digest.
const ID_LEN: usize = 26;

/// The durable identifier of a record. Records reference each other by id,
/// never by filename.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives a fresh id from the record's kind, its file stem, and the
    /// moment it was created.
    pub fn generate(kind: RecordKind, stem: &str, created_at: Timestamp) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(kind.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(stem.as_bytes());
        hasher.update(b"\0");
        hasher.update(created_at.to_string().as_bytes());
        let hex = hasher.finalize().to_hex();
        Self(hex[..ID_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    #[test]
    fn test_generate_is_stable() {
        let at = ts("2024-06-01T10:00:00.000");
        let a = RecordId::generate(RecordKind::Drill, "DRILL__closures", at);
        let b = RecordId::generate(RecordKind::Drill, "DRILL__closures", at);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), ID_LEN);
    }

    #[test]
    fn test_generate_depends_on_inputs() {
        let at = ts("2024-06-01T10:00:00.000");
        let later = ts("2024-06-01T10:00:00.001");
        let a = RecordId::generate(RecordKind::Drill, "DRILL__closures", at);
        assert_ne!(a, RecordId::generate(RecordKind::Drill, "DRILL__closures", later));
        assert_ne!(a, RecordId::generate(RecordKind::Source, "DRILL__closures", at));
        assert_ne!(a, RecordId::generate(RecordKind::Drill, "DRILL__traits", at));
    }
}
