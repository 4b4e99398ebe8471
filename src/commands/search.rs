//! Full-text and checklist search across vault notes

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::CommandContext;
use super::error::{CommandError, CommandResult};
use super::params::{clamp_limit, parse, require};
use crate::vault::markdown::parse_tasks;
use crate::vault::{ContentStore, extension_of, is_markdown, is_under, normalize_path};

/// Default characters of context on each side of a match
pub const DEFAULT_CONTEXT_CHARS: usize = 40;

/// Upper bound on requested context
const MAX_CONTEXT_CHARS: usize = 400;

/// Default result count of `obsidian.vault.search`
const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Hard cap of `obsidian.tasks.search`, independent of settings
pub const MAX_TASK_RESULTS: usize = 500;

const DEFAULT_TASK_LIMIT: usize = 100;

/// Extensions scanned by full-text search
const TEXT_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// Optional path-prefix filters; a single string or a list
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum Prefixes {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl Prefixes {
    fn normalized(self) -> CommandResult<Vec<String>> {
        let raw = match self {
            Self::None => Vec::new(),
            Self::One(p) => vec![p],
            Self::Many(ps) => ps,
        };
        raw.iter()
            .map(|p| normalize_path(p).map_err(CommandError::from))
            .collect()
    }
}

fn matches_prefixes(path: &str, prefixes: &[String]) -> bool {
    prefixes.is_empty() || prefixes.iter().any(|p| is_under(path, p))
}

/// Files under the prefixes accepted by `keep`, sorted by path
async fn candidate_files(
    store: &dyn ContentStore,
    prefixes: &[String],
    keep: impl Fn(&str) -> bool,
) -> CommandResult<Vec<String>> {
    let mut files: Vec<String> = store
        .list_entries()
        .await?
        .into_iter()
        .filter(|e| e.is_file() && keep(&e.path) && matches_prefixes(&e.path, prefixes))
        .map(|e| e.path)
        .collect();
    files.sort();
    Ok(files)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    query: Option<String>,
    #[serde(default, alias = "path")]
    paths: Prefixes,
    limit: Option<usize>,
    #[serde(alias = "contextChars")]
    context: Option<usize>,
    max_files: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SearchHit {
    path: String,
    line: usize,
    snippet: String,
}

/// Byte offset `n` chars before `from`, not crossing `floor`
fn back_chars(text: &str, from: usize, n: usize, floor: usize) -> usize {
    text[floor..from]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map_or(from, |(i, _)| floor + i)
}

/// Byte offset `n` chars after `from`, not crossing `ceil`
fn forward_chars(text: &str, from: usize, n: usize, ceil: usize) -> usize {
    text[from..ceil]
        .char_indices()
        .nth(n)
        .map_or(ceil, |(i, _)| from + i)
}

/// Snippet around `start..end` bounded to the line `line_start..line_end`
fn snippet(
    text: &str,
    (line_start, line_end): (usize, usize),
    (start, end): (usize, usize),
    context: usize,
) -> String {
    let from = back_chars(text, start, context, line_start);
    let to = forward_chars(text, end, context, line_end);
    let mut out = String::new();
    if from > line_start {
        out.push('…');
    }
    out.push_str(text[from..to].trim_end_matches('\r'));
    if to < line_end {
        out.push('…');
    }
    out
}

pub async fn search_vault(ctx: &CommandContext, params: Value) -> CommandResult<Value> {
    let params: SearchParams = parse(params)?;
    let query = require(params.query.as_deref(), "query")?;
    let prefixes = params.paths.normalized()?;
    let limit = clamp_limit(
        params.limit,
        DEFAULT_SEARCH_LIMIT,
        ctx.settings.max_search_results,
    );
    let max_files = clamp_limit(
        params.max_files,
        ctx.settings.max_search_files,
        ctx.settings.max_search_files,
    );
    let context = params
        .context
        .unwrap_or(DEFAULT_CONTEXT_CHARS)
        .min(MAX_CONTEXT_CHARS);

    let pattern = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .map_err(|e| CommandError::invalid(format!("invalid query: {e}")))?;

    let files = candidate_files(ctx.store.as_ref(), &prefixes, |path| {
        extension_of(path).is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
    })
    .await?;

    let mut hits = Vec::new();
    let mut scanned = 0;
    'files: for path in &files {
        if scanned >= max_files || hits.len() >= limit {
            break;
        }
        scanned += 1;

        let text = match ctx.store.read(path).await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(%path, error = %e, "skipping unreadable file");
                continue;
            }
        };

        // Line numbers advance incrementally from the previous match
        let mut line = 0;
        let mut line_start = 0;
        let mut counted_to = 0;
        for found in pattern.find_iter(&text) {
            let segment = &text[counted_to..found.start()];
            if let Some(last_newline) = segment.rfind('\n') {
                line += segment.matches('\n').count();
                line_start = counted_to + last_newline + 1;
            }
            counted_to = found.start();

            let line_end = text[found.start()..]
                .find('\n')
                .map_or(text.len(), |i| found.start() + i);

            hits.push(SearchHit {
                path: path.clone(),
                line: line + 1,
                snippet: snippet(
                    &text,
                    (line_start, line_end),
                    (found.start(), found.end().min(line_end)),
                    context,
                ),
            });
            if hits.len() >= limit {
                break 'files;
            }
        }
    }

    let truncated = hits.len() >= limit || scanned < files.len();
    Ok(json!({
        "query": query,
        "results": hits,
        "filesScanned": scanned,
        "truncated": truncated,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskParams {
    #[serde(default, alias = "path")]
    paths: Prefixes,
    completed: Option<bool>,
    query: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct TaskHit {
    path: String,
    line: usize,
    status: String,
    completed: bool,
    text: String,
}

pub async fn search_tasks(ctx: &CommandContext, params: Value) -> CommandResult<Value> {
    let params: TaskParams = parse(params)?;
    let prefixes = params.paths.normalized()?;
    let limit = clamp_limit(params.limit, DEFAULT_TASK_LIMIT, MAX_TASK_RESULTS);
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let files = candidate_files(ctx.store.as_ref(), &prefixes, is_markdown).await?;

    let mut tasks = Vec::new();
    let mut truncated = false;
    'files: for path in &files {
        let text = match ctx.store.read(path).await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(%path, error = %e, "skipping unreadable note");
                continue;
            }
        };

        for task in parse_tasks(&text) {
            if params.completed.is_some_and(|want| want != task.completed()) {
                continue;
            }
            if let Some(q) = &query
                && !task.text.to_lowercase().contains(q.as_str())
            {
                continue;
            }
            if tasks.len() >= limit {
                truncated = true;
                break 'files;
            }
            tasks.push(TaskHit {
                path: path.clone(),
                line: task.line + 1,
                status: task.status.to_string(),
                completed: task.completed(),
                text: task.text,
            });
        }
    }

    Ok(json!({
        "tasks": tasks,
        "truncated": truncated,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_window() {
        let text = "0123456789 needle 0123456789\nnext";
        let start = text.find("needle").unwrap();
        let line_end = text.find('\n').unwrap();
        let s = snippet(text, (0, line_end), (start, start + 6), 3);
        assert_eq!(s, "…89 needle 01…");

        let full = snippet(text, (0, line_end), (start, start + 6), 40);
        assert_eq!(full, "0123456789 needle 0123456789");
    }

    #[test]
    fn test_snippet_multibyte() {
        let text = "ééééé match ééééé";
        let start = text.find("match").unwrap();
        let s = snippet(text, (0, text.len()), (start, start + 5), 2);
        assert_eq!(s, "…é match é…");
    }

    #[test]
    fn test_prefixes_accept_string_or_list() {
        let one: TaskParams = serde_json::from_value(json!({"paths": "notes/"})).unwrap();
        assert_eq!(one.paths.normalized().unwrap(), vec!["notes"]);

        let many: TaskParams =
            serde_json::from_value(json!({"paths": ["a", "b/c"]})).unwrap();
        assert_eq!(many.paths.normalized().unwrap(), vec!["a", "b/c"]);

        let none: TaskParams = serde_json::from_value(json!({})).unwrap();
        assert!(none.paths.normalized().unwrap().is_empty());
    }
}
