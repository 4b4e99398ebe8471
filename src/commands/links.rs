//! Note metadata and backlink commands

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::CommandContext;
use super::error::{CommandError, CommandResult};
use super::params::{parse, require_path};
use crate::vault::markdown::parse_metadata;
use crate::vault::{EntryKind, LinkIndex};

#[derive(Debug, Deserialize)]
struct PathParams {
    path: Option<String>,
}

pub async fn metadata(ctx: &CommandContext, params: Value) -> CommandResult<Value> {
    let params: PathParams = parse(params)?;
    let path = require_path(params.path.as_deref(), "path")?;

    let entry = ctx
        .store
        .stat(&path)
        .await?
        .ok_or_else(|| CommandError::not_found(&path))?;
    if entry.kind != EntryKind::File {
        return Err(CommandError::not_file(&path));
    }

    let content = ctx.store.read(&path).await?;
    let meta = parse_metadata(&content);

    Ok(json!({
        "path": path,
        "frontmatter": meta.frontmatter,
        "headings": meta.headings,
        "links": meta.links,
        "tags": meta.tags,
    }))
}

#[derive(Debug, Serialize)]
struct Backlink {
    path: String,
    count: usize,
}

pub async fn backlinks(ctx: &CommandContext, params: Value) -> CommandResult<Value> {
    let params: PathParams = parse(params)?;
    let path = require_path(params.path.as_deref(), "path")?;

    let index = LinkIndex::build(ctx.store.as_ref()).await?;
    let sources: Vec<Backlink> = index
        .backlinks(&path)
        .into_iter()
        .map(|(path, count)| Backlink { path, count })
        .collect();

    Ok(json!({
        "path": path,
        "backlinks": sources,
    }))
}
