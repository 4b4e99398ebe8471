//! Read commands: active file, selection, note content, vault listing

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::CommandContext;
use super::error::{CommandError, CommandResult, ErrorCode};
use super::params::{clamp_limit, optional_prefix, parse, require_path};
use crate::vault::{EntryKind, is_under, parent_of};

/// Default page size of `obsidian.vault.list`
pub const DEFAULT_LIST_LIMIT: usize = 100;

fn to_value<T: Serialize>(value: &T) -> CommandResult<Value> {
    serde_json::to_value(value).map_err(|e| CommandError::internal(e.to_string()))
}

#[allow(clippy::unused_async)]
pub async fn active_file(ctx: &CommandContext, _params: Value) -> CommandResult<Value> {
    let active = ctx
        .editor
        .active_file()
        .ok_or_else(|| CommandError::new(ErrorCode::NoActiveFile, "no active file"))?;
    to_value(&active)
}

#[allow(clippy::unused_async)]
pub async fn selection(ctx: &CommandContext, _params: Value) -> CommandResult<Value> {
    match ctx.editor.selection() {
        Some(selection) => to_value(&selection),
        None => Ok(json!({
            "hasSelection": false,
            "source": "none",
            "confidence": "low",
        })),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadParams {
    path: Option<String>,
    max_bytes: Option<usize>,
}

/// Largest prefix of `text` no longer than `max` bytes ending on a char boundary
fn truncate_utf8(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

pub async fn read_note(ctx: &CommandContext, params: Value) -> CommandResult<Value> {
    let params: ReadParams = parse(params)?;
    let path = require_path(params.path.as_deref(), "path")?;
    let ceiling = ctx.settings.max_read_bytes;
    let max_bytes = params.max_bytes.unwrap_or(ceiling).min(ceiling);

    let entry = ctx
        .store
        .stat(&path)
        .await?
        .ok_or_else(|| CommandError::not_found(&path))?;
    if entry.kind != EntryKind::File {
        return Err(CommandError::not_file(&path));
    }

    let content = ctx.store.read(&path).await?;
    let bytes = content.len();
    let kept = truncate_utf8(&content, max_bytes);

    Ok(json!({
        "path": path,
        "content": kept,
        "truncated": kept.len() < bytes,
        "bytes": bytes,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    path: Option<String>,
    #[serde(default)]
    recursive: bool,
    limit: Option<usize>,
    cursor: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListItem {
    path: String,
    #[serde(rename = "type")]
    kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<usize>,
}

/// Opaque cursor: base64 of the last path on the previous page
#[must_use]
pub fn encode_cursor(path: &str) -> String {
    STANDARD.encode(path.as_bytes())
}

fn decode_cursor(cursor: &str) -> CommandResult<String> {
    let invalid = || CommandError::new(ErrorCode::InvalidCursor, "invalid cursor");
    let bytes = STANDARD.decode(cursor.trim()).map_err(|_| invalid())?;
    String::from_utf8(bytes).map_err(|_| invalid())
}

pub async fn list(ctx: &CommandContext, params: Value) -> CommandResult<Value> {
    let params: ListParams = parse(params)?;
    let prefix = optional_prefix(params.path.as_deref())?;
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, ctx.settings.max_list_limit);
    let after = params.cursor.as_deref().map(decode_cursor).transpose()?;

    if !params.recursive && !prefix.is_empty() {
        match ctx.store.stat(&prefix).await? {
            Some(entry) if entry.kind == EntryKind::Folder => {}
            Some(_) => {
                return Err(CommandError::invalid(format!("path is not a folder: {prefix}")));
            }
            None => return Err(CommandError::not_found(&prefix)),
        }
    }

    let mut entries: Vec<_> = ctx
        .store
        .list_entries()
        .await?
        .into_iter()
        .filter(|e| {
            if params.recursive {
                e.path != prefix && is_under(&e.path, &prefix)
            } else {
                parent_of(&e.path) == prefix
            }
        })
        .filter(|e| after.as_ref().is_none_or(|last| e.path.as_str() > last.as_str()))
        .collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    let has_more = entries.len() > limit;
    entries.truncate(limit);
    let cursor = if has_more {
        entries.last().map(|e| encode_cursor(&e.path))
    } else {
        None
    };

    let items: Vec<ListItem> = entries
        .into_iter()
        .map(|e| ListItem {
            size: (e.kind == EntryKind::File).then_some(e.size),
            children: (e.kind == EntryKind::Folder).then_some(e.children),
            path: e.path,
            kind: e.kind,
        })
        .collect();

    Ok(json!({
        "items": items,
        "hasMore": has_more,
        "cursor": cursor,
    }))
}
