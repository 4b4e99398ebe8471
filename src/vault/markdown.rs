//! Markdown metadata extraction
//!
//! Computes front-matter, headings, outbound links, tags and checklist
//! items from note text. Fenced code blocks are skipped.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").expect("valid regex"));

static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[\[([^\]\|]+)(?:\|([^\]]*))?\]\]").expect("valid regex"));

static MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\]]*)\]\(([^)\s]+)(?:\s+[^)]*)?\)").expect("valid regex"));

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#([\p{L}\p{N}_/\-]+)").expect("valid regex"));

static TASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+\[(.)\]\s?(.*)$").expect("valid regex")
});

/// Heading with its level (1-6) and zero-based line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub heading: String,
    pub level: usize,
    pub line: usize,
}

/// Outbound link as written in the note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundLink {
    /// Link target without heading or block suffix
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    pub embed: bool,
    pub line: usize,
}

/// Tag occurrence; front-matter tags report no line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// Metadata computed for one note
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NoteMetadata {
    pub frontmatter: Map<String, Value>,
    pub headings: Vec<Heading>,
    pub links: Vec<OutboundLink>,
    pub tags: Vec<Tag>,
}

/// Checklist item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    /// Zero-based line
    pub line: usize,
    /// Character between the brackets
    pub status: char,
    /// Item text without the checkbox marker
    pub text: String,
}

impl TaskItem {
    /// Anything other than a blank status counts as completed
    #[must_use]
    pub fn completed(&self) -> bool {
        self.status != ' '
    }
}

/// Split YAML front-matter from the body
///
/// Returns the parsed mapping (with `position` removed) and the zero-based
/// line where the body starts.
#[must_use]
pub fn split_frontmatter(content: &str) -> (Map<String, Value>, usize) {
    let mut lines = content.lines();
    if lines.next().map(str::trim_end) != Some("---") {
        return (Map::new(), 0);
    }

    let mut yaml = String::new();
    for (i, line) in lines.enumerate() {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let frontmatter = match serde_yaml::from_str::<Value>(&yaml) {
                Ok(Value::Object(mut map)) => {
                    map.remove("position");
                    map
                }
                Ok(_) => Map::new(),
                Err(e) => {
                    tracing::debug!(error = %e, "ignoring invalid front-matter");
                    Map::new()
                }
            };
            return (frontmatter, i + 2);
        }
        yaml.push_str(line);
        yaml.push('\n');
    }
    // Unterminated block is body text
    (Map::new(), 0)
}

/// Lines of the body outside fenced code blocks, with zero-based numbers
fn body_lines(content: &str, start: usize) -> impl Iterator<Item = (usize, &str)> {
    let mut fence: Option<&'static str> = None;
    content
        .lines()
        .enumerate()
        .skip(start)
        .filter(move |(_, line)| {
            let trimmed = line.trim_start();
            for marker in ["```", "~~~"] {
                if trimmed.starts_with(marker) {
                    match fence {
                        Some(open) if open == marker => fence = None,
                        None => fence = Some(marker),
                        Some(_) => {}
                    }
                    return false;
                }
            }
            fence.is_none()
        })
}

fn strip_subpath(target: &str) -> &str {
    target.split(['#', '^']).next().unwrap_or(target).trim()
}

fn is_external(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:") || target.starts_with('#')
}

fn push_tag(tags: &mut Vec<Tag>, tag: &str, line: Option<usize>) {
    let tag = tag.trim().trim_start_matches('#');
    // A tag needs at least one non-numeric character
    if tag.is_empty() || tag.chars().all(|c| c.is_ascii_digit()) {
        return;
    }
    tags.push(Tag {
        tag: format!("#{tag}"),
        line,
    });
}

fn frontmatter_tags(frontmatter: &Map<String, Value>, tags: &mut Vec<Tag>) {
    let Some(value) = frontmatter.get("tags").or_else(|| frontmatter.get("tag")) else {
        return;
    };
    match value {
        Value::String(s) => {
            for tag in s.split([',', ' ']).filter(|t| !t.is_empty()) {
                push_tag(tags, tag, None);
            }
        }
        Value::Array(items) => {
            for tag in items.iter().filter_map(Value::as_str) {
                push_tag(tags, tag, None);
            }
        }
        _ => {}
    }
}

/// Compute metadata for a note
#[must_use]
pub fn parse_metadata(content: &str) -> NoteMetadata {
    let (frontmatter, body_start) = split_frontmatter(content);
    let mut meta = NoteMetadata::default();
    frontmatter_tags(&frontmatter, &mut meta.tags);
    meta.frontmatter = frontmatter;

    for (line_no, line) in body_lines(content, body_start) {
        if let Some(caps) = HEADING.captures(line) {
            meta.headings.push(Heading {
                heading: caps[2].to_string(),
                level: caps[1].len(),
                line: line_no,
            });
        }
        for caps in TAG.captures_iter(line) {
            push_tag(&mut meta.tags, &caps[1], Some(line_no));
        }

        for caps in WIKI_LINK.captures_iter(line) {
            let link = strip_subpath(&caps[2]);
            if link.is_empty() {
                continue;
            }
            meta.links.push(OutboundLink {
                link: link.to_string(),
                display_text: caps.get(3).map(|m| m.as_str().to_string()),
                embed: &caps[1] == "!",
                line: line_no,
            });
        }

        for caps in MD_LINK.captures_iter(line) {
            let target = caps[3].trim_start_matches('<').trim_end_matches('>');
            if is_external(target) {
                continue;
            }
            let link = strip_subpath(&target.replace("%20", " ")).to_string();
            if link.is_empty() {
                continue;
            }
            meta.links.push(OutboundLink {
                link,
                display_text: Some(caps[2].to_string()).filter(|s| !s.is_empty()),
                embed: &caps[1] == "!",
                line: line_no,
            });
        }
    }

    meta
}

/// Checklist items of a note
#[must_use]
pub fn parse_tasks(content: &str) -> Vec<TaskItem> {
    let (_, body_start) = split_frontmatter(content);
    body_lines(content, body_start)
        .filter_map(|(line, text)| {
            let caps = TASK.captures(text)?;
            let status = caps[1].chars().next()?;
            Some(TaskItem {
                line,
                status,
                text: caps[2].trim_end().to_string(),
            })
        })
        .collect()
}
