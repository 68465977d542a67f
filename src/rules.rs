//! The `requests.txt` file: session credentials followed by three sections of title rules.
//!
//! ```text
//! PHPSESSID=<48 chars>
//! <32 char xsrf token>
//! [exact_match]
//! half-life 2
//! [any_match]
//! portal
//! [no_match]
//! soundtrack
//! ```

use std::path::Path;

use chrono::Local;

use crate::{info_time, Error, Result};

const COOKIE_VALUE_LEN: usize = 48;
const XSRF_TOKEN_LEN: usize = 32;

/// Rule sections in the order they are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    ExactMatch,
    AnyMatch,
    NoMatch,
}

impl Tag {
    pub const ALL: [Tag; 3] = [Tag::ExactMatch, Tag::AnyMatch, Tag::NoMatch];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::ExactMatch => "[exact_match]",
            Tag::AnyMatch => "[any_match]",
            Tag::NoMatch => "[no_match]",
        }
    }

    fn from_line(line: &str) -> Option<Tag> {
        Tag::ALL.into_iter().find(|tag| tag.as_str() == line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesFile {
    pub cookie_name: String,
    pub cookie_value: String,
    pub xsrf_token: String,
    pub exact_matches: Vec<String>,
    pub any_matches: Vec<String>,
    pub no_matches: Vec<String>,
}

impl RulesFile {
    /// Reads the file, rewrites it in canonical form and reads the rewritten version back.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let start_time = Local::now();

        let rules = Self::parse(&std::fs::read_to_string(path)?)?;
        std::fs::write(path, rules.serialize())?;
        info_time!(start_time, "Requests file sorted: {}", path.display());

        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let lines: Vec<&str> = content.lines().map(str::trim).collect();

        let (cookie_name, cookie_value) = lines
            .first()
            .and_then(|line| parse_cookie(line))
            .ok_or(Error::InvalidCookie)?;

        let xsrf_token = lines
            .get(1)
            .filter(|token| token.chars().count() == XSRF_TOKEN_LEN)
            .ok_or(Error::InvalidToken)?;

        Ok(Self {
            cookie_name: cookie_name.to_string(),
            cookie_value: cookie_value.to_string(),
            xsrf_token: xsrf_token.to_string(),
            exact_matches: titles_by_tag(Tag::ExactMatch, &lines),
            any_matches: titles_by_tag(Tag::AnyMatch, &lines),
            no_matches: titles_by_tag(Tag::NoMatch, &lines),
        })
    }

    /// Canonical form: every section lowercased and sorted, each entry on its own line.
    /// The cookie line is kept verbatim since the session value is case sensitive.
    pub fn serialize(&self) -> String {
        let mut body = format!("{}\n", self.xsrf_token);
        for tag in Tag::ALL {
            body.push_str(tag.as_str());
            body.push('\n');
            for title in sorted_lowercase(self.titles(tag)) {
                body.push_str(&title);
                body.push('\n');
            }
        }

        format!(
            "{}={}\n{}",
            self.cookie_name,
            self.cookie_value,
            body.to_lowercase()
        )
    }

    pub fn titles(&self, tag: Tag) -> &[String] {
        match tag {
            Tag::ExactMatch => &self.exact_matches,
            Tag::AnyMatch => &self.any_matches,
            Tag::NoMatch => &self.no_matches,
        }
    }

    /// `name=value` as sent in the `Cookie` header.
    pub fn cookie(&self) -> String {
        format!("{}={}", self.cookie_name, self.cookie_value)
    }
}

fn parse_cookie(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once('=')?;
    if name.is_empty() || value.contains('=') || value.chars().count() != COOKIE_VALUE_LEN {
        return None;
    }
    Some((name, value))
}

/// Lines after the first occurrence of `tag` up to the next tag line, without blanks.
fn titles_by_tag(tag: Tag, lines: &[&str]) -> Vec<String> {
    let Some(tag_idx) = lines.iter().position(|line| *line == tag.as_str()) else {
        return Vec::new();
    };

    lines[tag_idx + 1..]
        .iter()
        .take_while(|line| Tag::from_line(line).is_none())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

fn sorted_lowercase(titles: &[String]) -> Vec<String> {
    let mut titles: Vec<String> = titles.iter().map(|t| t.to_lowercase()).collect();
    titles.sort_unstable();
    titles
}
