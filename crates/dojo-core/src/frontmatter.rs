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

//! The header block at the top of every record.
//!
//! A record is a Markdown document that may open with a TOML header fenced by
//! two lines containing only `---`:
//!
//! ```text
//! ---
//! id = "4f0c..."
//! status = "untried"
//! topics = ["Rust"]
//! ---
//! # Closures
//! ```
//!
//! Text without an opening fence, or with an opening fence that is never
//! closed, has no header: the whole text is the body. Only a properly fenced
//! header that fails to parse is an error.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fs::read_to_string;
use std::fs::write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// A record header: string keys mapped to TOML values.
pub type Header = toml::Table;

const DELIMITER: &str = "---";

#[derive(Debug)]
pub struct FrontmatterError {
    pub message: String,
}

impl Display for FrontmatterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for FrontmatterError {}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == DELIMITER
}

/// Splits a record into its header and body.
pub fn parse(text: &str) -> Result<(Header, String), FrontmatterError> {
    let mut lines = text.split_inclusive('\n');
    match lines.next() {
        Some(first) if is_delimiter(first) => {}
        _ => return Ok((Header::new(), text.to_string())),
    }
    let header_start = text.find('\n').map(|pos| pos + 1).unwrap_or(text.len());
    let mut offset = header_start;
    for line in lines {
        let line_start = offset;
        offset += line.len();
        if is_delimiter(line) {
            let header_text = &text[header_start..line_start];
            let header: Header = toml::from_str(header_text).map_err(|e| FrontmatterError {
                message: format!("failed to parse TOML header: {e}"),
            })?;
            return Ok((header, text[offset..].to_string()));
        }
    }
    // An opening fence that is never closed is just text.
    Ok((Header::new(), text.to_string()))
}

/// Renders a header and body back into record text.
pub fn serialize(header: &Header, body: &str) -> Fallible<String> {
    let header_text = toml::to_string(header)?;
    Ok(format!("{DELIMITER}\n{header_text}{DELIMITER}\n{body}"))
}

/// Merges `updates` into the header of the record at `path`, overwriting
/// keys that already exist, and writes the record back.
///
/// This is a plain read-modify-write: two processes updating the same record
/// at once can lose one of the updates.
pub fn update(path: &Path, updates: Header) -> Fallible<()> {
    let mut document = Document::read(path)?;
    document.header.extend(updates);
    document.write(path)
}

/// A record as it sits on disk: header plus body.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub header: Header,
    pub body: String,
}

impl Document {
    pub fn new(header: Header, body: impl Into<String>) -> Self {
        Self {
            header,
            body: body.into(),
        }
    }

    /// Builds a document whose header is the serialized form of `value`.
    pub fn from_typed<T: Serialize>(value: &T, body: impl Into<String>) -> Fallible<Self> {
        Ok(Self::new(to_header(value)?, body))
    }

    pub fn parse(text: &str) -> Fallible<Self> {
        let (header, body) = parse(text)?;
        Ok(Self { header, body })
    }

    pub fn read(path: &Path) -> Fallible<Self> {
        let text = read_to_string(path)?;
        Self::parse(&text).map_err(|e| ErrorReport::new(format!("{}: {e}", path.display())))
    }

    pub fn render(&self) -> Fallible<String> {
        serialize(&self.header, &self.body)
    }

    pub fn write(&self, path: &Path) -> Fallible<()> {
        write(path, self.render()?)?;
        Ok(())
    }

    /// Deserializes the header into a typed structure.
    pub fn header_as<T: DeserializeOwned>(&self) -> Fallible<T> {
        let value = toml::Value::Table(self.header.clone());
        Ok(value.try_into()?)
    }
}

/// Serializes a typed structure into a header table.
pub fn to_header<T: Serialize>(value: &T) -> Fallible<Header> {
    match toml::Value::try_from(value)? {
        toml::Value::Table(table) => Ok(table),
        other => Err(ErrorReport::new(format!(
            "header must serialize to a table, got {}",
            other.type_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_header() -> Fallible<()> {
        let text = "---\nid = \"test123\"\nstatus = \"untried\"\n---\n\n# Test Content\n";
        let (header, body) = parse(text)?;
        assert_eq!(header["id"].as_str(), Some("test123"));
        assert_eq!(header["status"].as_str(), Some("untried"));
        assert_eq!(body, "\n# Test Content\n");
        Ok(())
    }

    #[test]
    fn test_no_header() -> Fallible<()> {
        let text = "# Just a note\n\nWith text.\n";
        let (header, body) = parse(text)?;
        assert!(header.is_empty());
        assert_eq!(body, text);
        Ok(())
    }

    #[test]
    fn test_text_before_delimiter_means_no_header() -> Fallible<()> {
        let text = "preamble\n---\nid = \"x\"\n---\nbody\n";
        let (header, body) = parse(text)?;
        assert!(header.is_empty());
        assert_eq!(body, text);
        Ok(())
    }

    #[test]
    fn test_unterminated_header_is_body() -> Fallible<()> {
        let text = "---\nid = \"x\"\nno closing fence\n";
        let (header, body) = parse(text)?;
        assert!(header.is_empty());
        assert_eq!(body, text);
        Ok(())
    }

    #[test]
    fn test_corrupt_header_is_an_error() {
        let text = "---\nid = = nonsense\n---\nbody\n";
        assert!(parse(text).is_err());
    }

    #[test]
    fn test_empty_header() -> Fallible<()> {
        let (header, body) = parse("---\n---\nbody")?;
        assert!(header.is_empty());
        assert_eq!(body, "body");
        Ok(())
    }

    #[test]
    fn test_crlf_delimiters() -> Fallible<()> {
        let (header, body) = parse("---\r\nid = \"x\"\r\n---\r\nbody\r\n")?;
        assert_eq!(header["id"].as_str(), Some("x"));
        assert_eq!(body, "body\r\n");
        Ok(())
    }

    #[test]
    fn test_round_trip() -> Fallible<()> {
        let mut header = Header::new();
        header.insert("id".into(), "01HXYZ".into());
        header.insert("review_count".into(), toml::Value::Integer(3));
        header.insert(
            "topics".into(),
            toml::Value::Array(vec!["Rust".into(), "Ownership & Borrowing".into()]),
        );
        header.insert("empty".into(), toml::Value::Array(Vec::new()));
        let mut nested = Header::new();
        nested.insert("channel".into(), "Some Channel".into());
        header.insert("metadata".into(), toml::Value::Table(nested));
        let body = "\n# Title\n\n## Pattern\n- one\n---\ntrailing rule\n";

        let text = serialize(&header, body)?;
        let (parsed_header, parsed_body) = parse(&text)?;
        assert_eq!(parsed_header, header);
        assert_eq!(parsed_body, body);
        Ok(())
    }

    #[test]
    fn test_update_merges_shallowly() -> Fallible<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("DRILL__x.md");
        std::fs::write(
            &path,
            "---\nid = \"x\"\nstatus = \"untried\"\nreview_count = 0\n---\n# X\n",
        )?;
        let mut updates = Header::new();
        updates.insert("status".into(), "passed".into());
        updates.insert("review_count".into(), toml::Value::Integer(1));
        update(&path, updates)?;

        let document = Document::read(&path)?;
        assert_eq!(document.header["id"].as_str(), Some("x"));
        assert_eq!(document.header["status"].as_str(), Some("passed"));
        assert_eq!(document.header["review_count"].as_integer(), Some(1));
        assert_eq!(document.body, "# X\n");
        Ok(())
    }
}
