//! Command dispatcher
//!
//! Routes named vault commands to handlers and enforces the cross-cutting
//! policy around them: parameter parsing, write gating, panic isolation,
//! response size limits and the activity log.
//!
//! The registry is built once and never mutated. The write-enable flag is
//! read from a fresh settings snapshot on every dispatch.

pub mod error;
pub mod log;
pub mod params;

mod links;
mod read;
mod search;
mod write;

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

pub use error::{CommandError, CommandResult, ErrorCode};
pub use log::{ActivityLog, LogEntry};

use crate::config::{Settings, SettingsProvider};
use crate::vault::{ContentStore, EditorContext};

/// Wire names of every command
pub mod names {
    pub const ACTIVE_FILE_GET: &str = "obsidian.activeFile.get";
    pub const SELECTION_GET: &str = "obsidian.selection.get";
    pub const NOTE_READ: &str = "obsidian.note.read";
    pub const VAULT_LIST: &str = "obsidian.vault.list";
    pub const VAULT_SEARCH: &str = "obsidian.vault.search";
    pub const METADATA_GET: &str = "obsidian.metadata.get";
    pub const LINKS_BACKLINKS: &str = "obsidian.links.backlinks";
    pub const TASKS_SEARCH: &str = "obsidian.tasks.search";
    pub const NOTE_REPLACE_SELECTION: &str = "obsidian.note.replaceSelection";
    pub const NOTE_INSERT_AT_CURSOR: &str = "obsidian.note.insertAtCursor";
    pub const NOTE_APPLY_PATCH: &str = "obsidian.note.applyPatch";
    pub const NOTE_CREATE: &str = "obsidian.note.create";
}

/// Whether a command only reads or also mutates the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Read,
    Write,
}

/// State a handler runs against
pub struct CommandContext {
    pub store: Arc<dyn ContentStore>,
    pub editor: Arc<dyn EditorContext>,
    /// Snapshot taken at dispatch time
    pub settings: Settings,
}

type Handler = for<'a> fn(&'a CommandContext, Value) -> BoxFuture<'a, CommandResult<Value>>;

#[derive(Clone, Copy)]
struct Command {
    kind: CommandKind,
    handler: Handler,
}

impl Command {
    const fn read(handler: Handler) -> Self {
        Self {
            kind: CommandKind::Read,
            handler,
        }
    }

    const fn write(handler: Handler) -> Self {
        Self {
            kind: CommandKind::Write,
            handler,
        }
    }
}

/// Writes are allowed only while the current settings say so
#[must_use]
pub const fn is_write_allowed(settings: &Settings) -> bool {
    settings.writes_enabled
}

fn registry() -> HashMap<&'static str, Command> {
    HashMap::from([
        (
            names::ACTIVE_FILE_GET,
            Command::read(|ctx, p| Box::pin(read::active_file(ctx, p))),
        ),
        (
            names::SELECTION_GET,
            Command::read(|ctx, p| Box::pin(read::selection(ctx, p))),
        ),
        (
            names::NOTE_READ,
            Command::read(|ctx, p| Box::pin(read::read_note(ctx, p))),
        ),
        (
            names::VAULT_LIST,
            Command::read(|ctx, p| Box::pin(read::list(ctx, p))),
        ),
        (
            names::VAULT_SEARCH,
            Command::read(|ctx, p| Box::pin(search::search_vault(ctx, p))),
        ),
        (
            names::METADATA_GET,
            Command::read(|ctx, p| Box::pin(links::metadata(ctx, p))),
        ),
        (
            names::LINKS_BACKLINKS,
            Command::read(|ctx, p| Box::pin(links::backlinks(ctx, p))),
        ),
        (
            names::TASKS_SEARCH,
            Command::read(|ctx, p| Box::pin(search::search_tasks(ctx, p))),
        ),
        (
            names::NOTE_REPLACE_SELECTION,
            Command::write(|ctx, p| Box::pin(write::replace_selection(ctx, p))),
        ),
        (
            names::NOTE_INSERT_AT_CURSOR,
            Command::write(|ctx, p| Box::pin(write::insert_at_cursor(ctx, p))),
        ),
        (
            names::NOTE_APPLY_PATCH,
            Command::write(|ctx, p| Box::pin(write::apply_patch(ctx, p))),
        ),
        (
            names::NOTE_CREATE,
            Command::write(|ctx, p| Box::pin(write::create_note(ctx, p))),
        ),
    ])
}

/// Outcome of one dispatch: exactly one of payload or error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl DispatchResult {
    fn success(payload: Value) -> Self {
        Self {
            ok: true,
            payload: Some(payload),
            error: None,
        }
    }

    pub(crate) fn failure(error: CommandError) -> Self {
        Self {
            ok: false,
            payload: None,
            error: Some(error),
        }
    }
}

/// Routes invocations to command handlers
pub struct Dispatcher {
    registry: HashMap<&'static str, Command>,
    store: Arc<dyn ContentStore>,
    editor: Arc<dyn EditorContext>,
    settings: Arc<dyn SettingsProvider>,
    log: ActivityLog,
}

impl Dispatcher {
    /// Build a dispatcher over a store, editor and live settings
    #[must_use]
    pub fn new(
        store: Arc<dyn ContentStore>,
        editor: Arc<dyn EditorContext>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            registry: registry(),
            store,
            editor,
            settings,
            log: ActivityLog::default(),
        }
    }

    /// Use an existing activity log (shared with a presentation layer)
    #[must_use]
    pub fn with_log(mut self, log: ActivityLog) -> Self {
        self.log = log;
        self
    }

    /// Activity log of this dispatcher
    #[must_use]
    pub const fn activity_log(&self) -> &ActivityLog {
        &self.log
    }

    /// Registered command names, sorted
    #[must_use]
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.keys().map(ToString::to_string).collect();
        names.sort();
        names
    }

    /// Kind of a registered command
    #[must_use]
    pub fn kind(&self, command: &str) -> Option<CommandKind> {
        self.registry.get(command).map(|c| c.kind)
    }

    /// Run one command
    ///
    /// Never fails: every error path yields `ok: false` with a structured
    /// error, and every outcome is appended to the activity log.
    pub async fn dispatch(&self, command: &str, params_json: Option<&str>) -> DispatchResult {
        let started = Instant::now();

        let Some(entry) = self.registry.get(command).copied() else {
            let error = CommandError::new(
                ErrorCode::NotImplemented,
                format!("unknown command: {command}"),
            );
            self.record(command, String::new(), &error, 0);
            return DispatchResult::failure(error);
        };

        let params = match params_json.map(str::trim).filter(|s| !s.is_empty()) {
            None => Value::Object(serde_json::Map::new()),
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(value @ Value::Object(_)) => value,
                Ok(Value::Null) => Value::Object(serde_json::Map::new()),
                Ok(_) => {
                    let error = CommandError::new(
                        ErrorCode::InvalidParams,
                        "params must be a JSON object",
                    );
                    self.record(command, log::summarize_raw(raw), &error, elapsed_ms(started));
                    return DispatchResult::failure(error);
                }
                Err(e) => {
                    let error = CommandError::new(
                        ErrorCode::InvalidParams,
                        format!("invalid params JSON: {e}"),
                    );
                    self.record(command, log::summarize_raw(raw), &error, elapsed_ms(started));
                    return DispatchResult::failure(error);
                }
            },
        };
        let args = log::summarize_args(&params);

        let settings = self.settings.snapshot();
        if entry.kind == CommandKind::Write && !is_write_allowed(&settings) {
            let error = CommandError::new(
                ErrorCode::WritesDisabled,
                "vault writes are disabled in settings",
            );
            self.record(command, args, &error, elapsed_ms(started));
            return DispatchResult::failure(error);
        }

        let max_response_bytes = settings.max_response_bytes;
        let ctx = CommandContext {
            store: Arc::clone(&self.store),
            editor: Arc::clone(&self.editor),
            settings,
        };

        let outcome = AssertUnwindSafe((entry.handler)(&ctx, params))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "command handler panicked".to_string());
                tracing::error!(%command, %message, "command handler panicked");
                Err(CommandError::internal(message))
            });

        let result = outcome.and_then(|payload| {
            let bytes = serde_json::to_vec(&payload)
                .map_err(|e| CommandError::internal(format!("failed to serialize response: {e}")))?
                .len();
            if bytes > max_response_bytes {
                return Err(CommandError::new(
                    ErrorCode::ResponseTooLarge,
                    format!("response is {bytes} bytes, limit is {max_response_bytes}"),
                ));
            }
            Ok((payload, bytes))
        });

        let duration_ms = elapsed_ms(started);
        match result {
            Ok((payload, bytes)) => {
                self.log.push(LogEntry {
                    timestamp: chrono::Utc::now(),
                    command: command.to_string(),
                    args,
                    ok: true,
                    error: None,
                    duration_ms,
                    response_bytes: bytes,
                });
                tracing::debug!(%command, duration_ms, bytes, "command succeeded");
                DispatchResult::success(payload)
            }
            Err(error) => {
                self.record(command, args, &error, duration_ms);
                DispatchResult::failure(error)
            }
        }
    }

    fn record(
        &self,
        command: &str,
        args: String,
        error: &CommandError,
        duration_ms: u64,
    ) {
        tracing::debug!(%command, code = %error.code, message = %error.message, "command failed");
        self.log.push(LogEntry {
            timestamp: chrono::Utc::now(),
            command: command.to_string(),
            args,
            ok: false,
            error: Some(error.message.clone()),
            duration_ms,
            response_bytes: 0,
        });
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
