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

//! Named sections of a record body.
//!
//! A section is the text under a `## Name` heading, up to the next heading of
//! level one or two, or the end of the body. Deeper headings belong to the
//! section they appear in. Parsing is structural (it goes through a Markdown
//! parser), so `##` lines inside fenced code do not open sections.

use pulldown_cmark::Event;
use pulldown_cmark::HeadingLevel;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub name: String,
    pub text: String,
}

/// The sections of a body, in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sections {
    entries: Vec<Section>,
}

fn ends_section(level: HeadingLevel) -> bool {
    matches!(level, HeadingLevel::H1 | HeadingLevel::H2)
}

struct OpenHeading {
    level: HeadingLevel,
    start: usize,
    end: usize,
    title: String,
}

impl Sections {
    pub fn parse(body: &str) -> Self {
        let mut entries = Vec::new();
        // Name and content start of the section being read.
        let mut current: Option<(String, usize)> = None;
        let mut heading: Option<OpenHeading> = None;

        for (event, range) in Parser::new(body).into_offset_iter() {
            match event {
                Event::Start(Tag::Heading { level, .. }) if ends_section(level) => {
                    heading = Some(OpenHeading {
                        level,
                        start: range.start,
                        end: range.end,
                        title: String::new(),
                    });
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some(open) = heading.as_mut() {
                        open.title.push_str(&text);
                    }
                }
                Event::End(TagEnd::Heading(level)) if ends_section(level) => {
                    let Some(open) = heading.take() else {
                        continue;
                    };
                    if let Some((name, content_start)) = current.take() {
                        entries.push(Section {
                            name,
                            text: body[content_start..open.start].trim().to_string(),
                        });
                    }
                    if open.level == HeadingLevel::H2 {
                        current = Some((open.title.trim().to_string(), open.end));
                    }
                }
                _ => {}
            }
        }
        if let Some((name, content_start)) = current {
            entries.push(Section {
                name,
                text: body[content_start..].trim().to_string(),
            });
        }
        Self { entries }
    }

    /// The text of the first section with this name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|section| section.name == name)
            .map(|section| section.text.as_str())
    }

    /// Like [`Sections::get`], but a missing section reads as empty.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The text of the first level-one heading, if any.
pub fn title(body: &str) -> Option<String> {
    let mut inside = false;
    let mut title = String::new();
    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => inside = true,
            Event::Text(text) | Event::Code(text) if inside => title.push_str(&text),
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                let title = title.trim();
                return (!title.is_empty()).then(|| title.to_string());
            }
            _ => {}
        }
    }
    None
}
