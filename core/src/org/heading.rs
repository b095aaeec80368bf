// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::LazyLock;

use regex::Regex;

use super::timestamp::OrgTimestamp;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\*+)[ \t]+(?:(TODO|DONE)[ \t]+)?(?:(\[#[A-Z0-9]\])[ \t]+)?(.*?)(?:[ \t]+(:[\w@#%:]+:))?[ \t]*$")
        .expect("heading regex must compile")
});

/// Returns true if `line` starts an Org heading.
pub fn is_heading(line: &str) -> bool {
    heading_level(line).is_some()
}

/// The number of stars of a heading line, or `None` for any other line.
pub fn heading_level(line: &str) -> Option<usize> {
    let stars = line.bytes().take_while(|&b| b == b'*').count();
    (stars > 0 && matches!(line.as_bytes().get(stars), Some(b' ' | b'\t'))).then_some(stars)
}

/// Collapses line breaks and runs of whitespace, so `text` fits on one heading line.
pub fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The parts of an Org heading line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    pub keyword: Option<String>,
    pub priority: Option<String>,
    /// The heading text, timestamps included.
    pub text: String,
    pub tags: Vec<String>,
}

impl Heading {
    pub fn parse(line: &str) -> Option<Self> {
        let caps = HEADING.captures(line)?;
        let tags = caps
            .get(5)
            .map(|m| {
                m.as_str()
                    .split(':')
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            level: caps.get(1)?.as_str().len(),
            keyword: caps.get(2).map(|m| m.as_str().to_string()),
            priority: caps.get(3).map(|m| m.as_str().to_string()),
            text: caps.get(4).map_or(String::new(), |m| m.as_str().to_string()),
            tags,
        })
    }

    /// The event title: the heading text without keyword, priority, tags or timestamps.
    pub fn title(&self) -> String {
        let mut title = self.text.clone();
        for span in OrgTimestamp::spans(&self.text).into_iter().rev() {
            title.replace_range(span, "");
        }
        one_line(&title)
    }

    /// Renders the heading with a new title, keeping keyword, priority, tags and any
    /// timestamps that were part of the heading text.
    pub fn render(&self, title: &str) -> String {
        let mut line = "*".repeat(self.level);
        line.push(' ');
        if let Some(keyword) = &self.keyword {
            line.push_str(keyword);
            line.push(' ');
        }
        if let Some(priority) = &self.priority {
            line.push_str(priority);
            line.push(' ');
        }
        line.push_str(&one_line(title));
        for span in OrgTimestamp::spans(&self.text) {
            line.push(' ');
            line.push_str(&self.text[span]);
        }
        if !self.tags.is_empty() {
            line.push_str(" :");
            line.push_str(&self.tags.join(":"));
            line.push(':');
        }
        line
    }
}
