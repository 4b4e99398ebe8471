//! Editor seam
//!
//! The host application owns the editor view. Commands see it only through
//! [`EditorContext`]; a missing view is `None`, never an error.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use super::{Position, basename, extension_of, file_name};

/// Identity of the focused note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFile {
    pub path: String,
    pub name: String,
    pub basename: String,
    pub extension: String,
}

impl ActiveFile {
    /// Describe the note at `path`
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: file_name(path).to_string(),
            basename: basename(path).to_string(),
            extension: extension_of(path).unwrap_or_default(),
        }
    }
}

/// Which view a selection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionSource {
    /// Focused editor
    Active,
    /// Most recently focused editor
    Recent,
    /// No editor available
    None,
}

/// How much the selection can be trusted to reflect what the user sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Current text selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub has_selection: bool,
    pub text: String,
    pub path: String,
    pub from: Position,
    pub to: Position,
    pub source: SelectionSource,
    pub confidence: Confidence,
}

/// Result of an editor mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    pub path: String,
    /// Cursor after the edit
    pub cursor: Position,
}

/// Access to the host's editor view
pub trait EditorContext: Send + Sync {
    /// Focused note, if any
    fn active_file(&self) -> Option<ActiveFile>;

    /// Selection in the active or most recent view; `None` without a view
    fn selection(&self) -> Option<Selection>;

    /// Replace the selection; `None` without a view
    fn replace_selection(&self, text: &str) -> Option<EditOutcome>;

    /// Insert at the cursor; `None` without a view
    fn insert_at_cursor(&self, text: &str) -> Option<EditOutcome>;
}

/// Editor context for hosts without a UI
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessEditor;

impl EditorContext for HeadlessEditor {
    fn active_file(&self) -> Option<ActiveFile> {
        None
    }

    fn selection(&self) -> Option<Selection> {
        None
    }

    fn replace_selection(&self, _text: &str) -> Option<EditOutcome> {
        None
    }

    fn insert_at_cursor(&self, _text: &str) -> Option<EditOutcome> {
        None
    }
}

/// Open view state held by [`BufferEditor`]
#[derive(Debug, Clone, PartialEq, Eq)]
struct View {
    path: String,
    text: String,
    anchor: Position,
    head: Position,
    focused: bool,
}

/// In-memory editor view over a single note
///
/// Edits apply to the buffer only; the host decides when to save.
#[derive(Debug, Default)]
pub struct BufferEditor {
    view: Mutex<Option<View>>,
    edits: Mutex<usize>,
}

fn offset_of(text: &str, pos: Position) -> usize {
    let mut offset = 0;
    for (i, line) in text.split('\n').enumerate() {
        if i == pos.line {
            let ch = line
                .char_indices()
                .nth(pos.ch)
                .map_or(line.len(), |(byte, _)| byte);
            return offset + ch;
        }
        offset += line.len() + 1;
    }
    text.len()
}

fn position_of(text: &str, offset: usize) -> Position {
    let before = &text[..offset];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    Position {
        line,
        ch: before[line_start..].chars().count(),
    }
}

impl BufferEditor {
    /// Editor with no open view
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `text` as the focused view with the cursor at the start
    pub fn open(&self, path: &str, text: &str) {
        *self.view.lock().unwrap_or_else(PoisonError::into_inner) = Some(View {
            path: path.to_string(),
            text: text.to_string(),
            anchor: Position::default(),
            head: Position::default(),
            focused: true,
        });
    }

    /// Select `from..to`; an empty range places the cursor
    pub fn select(&self, from: Position, to: Position) {
        if let Some(view) = self.view.lock().unwrap_or_else(PoisonError::into_inner).as_mut() {
            view.anchor = from;
            view.head = to;
        }
    }

    /// Keep the view but mark it unfocused (selection becomes "recent")
    pub fn blur(&self) {
        if let Some(view) = self.view.lock().unwrap_or_else(PoisonError::into_inner).as_mut() {
            view.focused = false;
        }
    }

    /// Close the view
    pub fn close(&self) {
        *self.view.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Current buffer text
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|v| v.text.clone())
    }

    /// Number of mutations applied so far
    #[must_use]
    pub fn edit_count(&self) -> usize {
        *self.edits.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn splice(&self, text: &str, replace_selection: bool) -> Option<EditOutcome> {
        let mut guard = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        let view = guard.as_mut()?;

        let (start, end) = if replace_selection {
            let a = offset_of(&view.text, view.anchor);
            let b = offset_of(&view.text, view.head);
            (a.min(b), a.max(b))
        } else {
            let head = offset_of(&view.text, view.head);
            (head, head)
        };
        view.text.replace_range(start..end, text);

        let cursor = position_of(&view.text, start + text.len());
        view.anchor = cursor;
        view.head = cursor;
        let outcome = EditOutcome {
            path: view.path.clone(),
            cursor,
        };
        drop(guard);

        *self.edits.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Some(outcome)
    }
}

impl EditorContext for BufferEditor {
    fn active_file(&self) -> Option<ActiveFile> {
        let guard = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|v| v.focused)
            .map(|v| ActiveFile::from_path(&v.path))
    }

    fn selection(&self) -> Option<Selection> {
        let guard = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        let view = guard.as_ref()?;

        let (from, to) = if view.anchor <= view.head {
            (view.anchor, view.head)
        } else {
            (view.head, view.anchor)
        };
        let start = offset_of(&view.text, from);
        let end = offset_of(&view.text, to);
        let (source, confidence) = if view.focused {
            (SelectionSource::Active, Confidence::High)
        } else {
            (SelectionSource::Recent, Confidence::Medium)
        };

        Some(Selection {
            has_selection: start < end,
            text: view.text[start..end].to_string(),
            path: view.path.clone(),
            from,
            to,
            source,
            confidence,
        })
    }

    fn replace_selection(&self, text: &str) -> Option<EditOutcome> {
        self.splice(text, true)
    }

    fn insert_at_cursor(&self, text: &str) -> Option<EditOutcome> {
        self.splice(text, false)
    }
}
