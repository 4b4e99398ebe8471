//! Write commands: editor mutations, note patches, note creation
//!
//! Range patches address the note by zero-based `{line, ch}` positions.
//! Lines are split on a single `\n`; a note stored with `\r\n` endings is
//! addressed with the `\r` counted as the last column of each line.

use serde::Deserialize;
use serde_json::{Value, json};

use super::CommandContext;
use super::error::{CommandError, CommandResult, ErrorCode};
use super::params::{check_size, parse, require_path};
use crate::vault::{EditOutcome, EntryKind, Position, parent_of};

#[derive(Debug, Deserialize)]
struct TextParams {
    text: Option<String>,
}

fn no_editor() -> CommandError {
    CommandError::new(ErrorCode::NoEditor, "no active editor")
}

fn outcome(edit: &EditOutcome) -> Value {
    json!({
        "path": edit.path,
        "cursor": edit.cursor,
    })
}

#[allow(clippy::unused_async)]
pub async fn replace_selection(ctx: &CommandContext, params: Value) -> CommandResult<Value> {
    let params: TextParams = parse(params)?;
    let text = params.text.ok_or_else(|| CommandError::missing("text"))?;
    let edit = ctx.editor.replace_selection(&text).ok_or_else(no_editor)?;
    Ok(outcome(&edit))
}

#[allow(clippy::unused_async)]
pub async fn insert_at_cursor(ctx: &CommandContext, params: Value) -> CommandResult<Value> {
    let params: TextParams = parse(params)?;
    let text = params.text.ok_or_else(|| CommandError::missing("text"))?;
    let edit = ctx.editor.insert_at_cursor(&text).ok_or_else(no_editor)?;
    Ok(outcome(&edit))
}

/// How `applyPatch` combines the new text with the note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum PatchMode {
    /// Whole note
    #[serde(alias = "replaceWhole")]
    Replace,
    Append,
    Prepend,
    ReplaceRange,
}

impl PatchMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::ReplaceRange => "replaceRange",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatchParams {
    path: Option<String>,
    mode: PatchMode,
    new_text: Option<String>,
    from: Option<Position>,
    to: Option<Position>,
}

/// Byte offset of `pos` in `content`
///
/// Each line before `pos.line` contributes its length plus one separator.
fn offset_of(content: &str, pos: Position, field: &str) -> CommandResult<usize> {
    let lines: Vec<&str> = content.split('\n').collect();
    let Some(line) = lines.get(pos.line) else {
        return Err(CommandError::invalid(format!(
            "{field}.line must be between 0 and {}",
            lines.len() - 1
        )));
    };

    let chars = line.chars().count();
    if pos.ch > chars {
        return Err(CommandError::invalid(format!(
            "{field}.ch must be between 0 and {chars}"
        )));
    }

    let before: usize = lines[..pos.line].iter().map(|l| l.len() + 1).sum();
    let column = line
        .char_indices()
        .nth(pos.ch)
        .map_or(line.len(), |(byte, _)| byte);
    Ok(before + column)
}

/// Replace the `from..to` range of `content` with `new_text`
fn splice_range(content: &str, from: Position, to: Position, new_text: &str) -> CommandResult<String> {
    let start = offset_of(content, from, "from")?;
    let end = offset_of(content, to, "to")?;
    if start > end {
        return Err(CommandError::invalid("from must not be after to"));
    }

    let mut out = String::with_capacity(content.len() - (end - start) + new_text.len());
    out.push_str(&content[..start]);
    out.push_str(new_text);
    out.push_str(&content[end..]);
    Ok(out)
}

pub async fn apply_patch(ctx: &CommandContext, params: Value) -> CommandResult<Value> {
    let params: PatchParams = parse(params)?;
    let path = require_path(params.path.as_deref(), "path")?;
    let new_text = params.new_text.ok_or_else(|| CommandError::missing("newText"))?;
    check_size(&new_text, ctx.settings.max_response_bytes, "newText")?;

    let entry = ctx
        .store
        .stat(&path)
        .await?
        .ok_or_else(|| CommandError::not_found(&path))?;
    if entry.kind != EntryKind::File {
        return Err(CommandError::not_file(&path));
    }

    let updated = match params.mode {
        PatchMode::Replace => new_text,
        PatchMode::Append => {
            let mut content = ctx.store.read(&path).await?;
            content.push_str(&new_text);
            content
        }
        PatchMode::Prepend => {
            let content = ctx.store.read(&path).await?;
            new_text + &content
        }
        PatchMode::ReplaceRange => {
            let from = params.from.ok_or_else(|| CommandError::missing("from"))?;
            let to = params.to.ok_or_else(|| CommandError::missing("to"))?;
            let content = ctx.store.read(&path).await?;
            splice_range(&content, from, to, &new_text)?
        }
    };

    ctx.store.write(&path, &updated).await?;
    tracing::debug!(%path, mode = params.mode.as_str(), bytes = updated.len(), "patched note");

    Ok(json!({
        "path": path,
        "mode": params.mode.as_str(),
        "bytes": updated.len(),
    }))
}

#[derive(Debug, Deserialize)]
struct CreateParams {
    path: Option<String>,
    content: Option<String>,
}

/// Create the parent folder of `path` unless it already exists
///
/// A folder appearing between the check and the create is not an error.
async fn ensure_parent(ctx: &CommandContext, path: &str) -> CommandResult<()> {
    let parent = parent_of(path);
    if parent.is_empty() {
        return Ok(());
    }

    match ctx.store.stat(parent).await? {
        Some(entry) if entry.kind == EntryKind::Folder => return Ok(()),
        Some(_) => {
            return Err(CommandError::invalid(format!(
                "parent is not a folder: {parent}"
            )));
        }
        None => {}
    }

    if let Err(e) = ctx.store.create_folder(parent).await {
        match ctx.store.stat(parent).await? {
            Some(entry) if entry.kind == EntryKind::Folder => {
                tracing::debug!(%parent, error = %e, "parent folder appeared concurrently");
            }
            _ => return Err(e.into()),
        }
    }
    Ok(())
}

pub async fn create_note(ctx: &CommandContext, params: Value) -> CommandResult<Value> {
    let params: CreateParams = parse(params)?;
    let path = require_path(params.path.as_deref(), "path")?;
    let content = params.content.ok_or_else(|| CommandError::missing("content"))?;
    check_size(&content, ctx.settings.max_response_bytes, "content")?;

    if ctx.store.stat(&path).await?.is_some() {
        return Err(CommandError::new(
            ErrorCode::AlreadyExists,
            format!("already exists: {path}"),
        ));
    }

    ensure_parent(ctx, &path).await?;
    ctx.store.create(&path, &content).await?;
    tracing::info!(%path, bytes = content.len(), "created note");

    Ok(json!({
        "path": path,
        "created": true,
        "bytes": content.len(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Settings;
    use crate::vault::{FsVault, HeadlessEditor};

    const fn pos(line: usize, ch: usize) -> Position {
        Position { line, ch }
    }

    fn context(dir: &std::path::Path) -> CommandContext {
        CommandContext {
            store: Arc::new(FsVault::open(dir).unwrap()),
            editor: Arc::new(HeadlessEditor),
            settings: Settings::default(),
        }
    }

    #[test]
    fn test_offsets_sum_prior_lines() {
        let doc = "ab\ncdé\n\nf";
        assert_eq!(offset_of(doc, pos(0, 0), "from").unwrap(), 0);
        assert_eq!(offset_of(doc, pos(1, 0), "from").unwrap(), 3);
        assert_eq!(offset_of(doc, pos(1, 3), "from").unwrap(), 7);
        assert_eq!(offset_of(doc, pos(2, 0), "from").unwrap(), 8);
        assert_eq!(offset_of(doc, pos(3, 1), "from").unwrap(), 10);
    }

    #[test]
    fn test_offset_bounds() {
        let doc = "abc\nde";
        assert!(offset_of(doc, pos(0, 3), "from").is_ok());

        let err = offset_of(doc, pos(0, 4), "from").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParam);
        assert_eq!(err.message, "from.ch must be between 0 and 3");

        let err = offset_of(doc, pos(2, 0), "to").unwrap_err();
        assert_eq!(err.message, "to.line must be between 0 and 1");
    }

    #[test]
    fn test_splice_range() {
        let doc = "first\nsecond\nthird";
        assert_eq!(splice_range(doc, pos(0, 0), pos(0, 0), "").unwrap(), doc);
        assert_eq!(
            splice_range(doc, pos(0, 0), pos(0, 5), "FIRST").unwrap(),
            "FIRST\nsecond\nthird"
        );
        assert_eq!(
            splice_range(doc, pos(0, 3), pos(1, 3), "-").unwrap(),
            "fir-ond\nthird"
        );
        assert_eq!(
            splice_range(doc, pos(1, 0), pos(0, 2), "x").unwrap_err().code,
            ErrorCode::InvalidParam
        );
    }

    #[tokio::test]
    async fn test_patch_modes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("n.md"), "body").unwrap();
        let ctx = context(dir.path());

        for (mode, text, expected) in [
            ("append", "!", "body!"),
            ("prepend", "> ", "> body!"),
            ("replace", "fresh", "fresh"),
        ] {
            let result = apply_patch(
                &ctx,
                json!({"path": "n.md", "mode": mode, "newText": text}),
            )
            .await
            .unwrap();
            assert_eq!(result["mode"], mode);
            assert_eq!(
                std::fs::read_to_string(dir.path().join("n.md")).unwrap(),
                expected
            );
        }
    }

    #[tokio::test]
    async fn test_patch_errors_leave_note_untouched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("n.md"), "one\ntwo").unwrap();
        std::fs::create_dir(dir.path().join("folder")).unwrap();
        let mut ctx = context(dir.path());

        let missing = apply_patch(&ctx, json!({"path": "x.md", "mode": "append", "newText": ""}))
            .await
            .unwrap_err();
        assert_eq!(missing.code, ErrorCode::NotFound);

        let folder = apply_patch(&ctx, json!({"path": "folder", "mode": "append", "newText": ""}))
            .await
            .unwrap_err();
        assert_eq!(folder.code, ErrorCode::NotFile);

        let no_range = apply_patch(
            &ctx,
            json!({"path": "n.md", "mode": "replaceRange", "newText": "z"}),
        )
        .await
        .unwrap_err();
        assert_eq!(no_range.code, ErrorCode::MissingParam);

        let bad_mode = apply_patch(&ctx, json!({"path": "n.md", "mode": "rewrite", "newText": ""}))
            .await
            .unwrap_err();
        assert_eq!(bad_mode.code, ErrorCode::InvalidParam);

        ctx.settings.max_response_bytes = 4;
        let too_large = apply_patch(
            &ctx,
            json!({"path": "n.md", "mode": "replace", "newText": "12345"}),
        )
        .await
        .unwrap_err();
        assert_eq!(too_large.code, ErrorCode::TooLarge);

        assert_eq!(
            std::fs::read_to_string(dir.path().join("n.md")).unwrap(),
            "one\ntwo"
        );
    }

    #[tokio::test]
    async fn test_create_note_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        let result = create_note(&ctx, json!({"path": "a/b/new.md", "content": "# New"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"path": "a/b/new.md", "created": true, "bytes": 5}));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a/b/new.md")).unwrap(),
            "# New"
        );

        let again = create_note(&ctx, json!({"path": "a/b/new.md", "content": "x"}))
            .await
            .unwrap_err();
        assert_eq!(again.code, ErrorCode::AlreadyExists);

        let missing = create_note(&ctx, json!({"path": "c.md"})).await.unwrap_err();
        assert_eq!(missing.code, ErrorCode::MissingParam);
    }

    #[tokio::test]
    async fn test_editor_commands_without_view() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        let err = insert_at_cursor(&ctx, json!({"text": "x"})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoEditor);
        let err = replace_selection(&ctx, json!({"text": "x"})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoEditor);
        let err = replace_selection(&ctx, json!({})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingParam);
    }
}
