//! Dispatcher integration tests over a real on-disk vault

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use vault_node::commands::names;
use vault_node::nodes::types::INVOKE_RESULT_METHOD;
use vault_node::vault::{BufferEditor, Entry, EntryKind, HeadlessEditor, Position};
use vault_node::{
    ActivityLog, ClientOptions, ContentStore, DispatchResult, Dispatcher, EditorContext, ErrorCode,
    FsVault, NodeBridge, SharedSettings,
};

mod common;
use common::{memory_client, temp_vault, test_settings};

fn dispatcher(
    root: &Path,
    editor: Arc<dyn EditorContext>,
    settings: &SharedSettings,
) -> Dispatcher {
    Dispatcher::new(
        Arc::new(FsVault::open(root).unwrap()),
        editor,
        Arc::new(settings.clone()),
    )
}

fn headless(root: &Path, settings: &SharedSettings) -> Dispatcher {
    dispatcher(root, Arc::new(HeadlessEditor), settings)
}

async fn call(dispatcher: &Dispatcher, command: &str, params: &Value) -> DispatchResult {
    dispatcher
        .dispatch(command, Some(&params.to_string()))
        .await
}

fn payload(result: DispatchResult) -> Value {
    assert!(result.ok, "expected success, got {:?}", result.error);
    result.payload.unwrap()
}

fn error_code(result: &DispatchResult) -> ErrorCode {
    assert!(!result.ok);
    assert!(result.payload.is_none());
    result.error.as_ref().unwrap().code
}

fn read_disk(root: &Path, path: &str) -> String {
    std::fs::read_to_string(root.join(path)).unwrap()
}

#[tokio::test]
async fn test_write_toggle_takes_effect_without_restart() {
    let vault = temp_vault(&[("n.md", "start")]);
    let settings = SharedSettings::new(test_settings());
    settings.set_writes_enabled(true);
    let dispatcher = headless(vault.path(), &settings);

    let append = json!({"path": "n.md", "mode": "append", "newText": "!"});
    assert!(call(&dispatcher, names::NOTE_APPLY_PATCH, &append).await.ok);
    assert_eq!(read_disk(vault.path(), "n.md"), "start!");

    settings.set_writes_enabled(false);
    let denied = call(&dispatcher, names::NOTE_APPLY_PATCH, &append).await;
    assert_eq!(error_code(&denied), ErrorCode::WritesDisabled);
    assert_eq!(read_disk(vault.path(), "n.md"), "start!");

    // Reads are unaffected by the flag
    let read = call(&dispatcher, names::NOTE_READ, &json!({"path": "n.md"})).await;
    assert_eq!(payload(read)["content"], "start!");

    settings.set_writes_enabled(true);
    assert!(call(&dispatcher, names::NOTE_APPLY_PATCH, &append).await.ok);
    assert_eq!(read_disk(vault.path(), "n.md"), "start!!");

    let log = dispatcher.activity_log().entries();
    assert_eq!(log.len(), 4);
    assert_eq!(
        log.iter().map(|e| e.ok).collect::<Vec<_>>(),
        vec![true, false, true, true]
    );
}

#[tokio::test]
async fn test_replace_range_round_trip() {
    let original = "line one\nline two\n";
    let vault = temp_vault(&[("n.md", original)]);
    let settings = SharedSettings::new(test_settings());
    settings.set_writes_enabled(true);
    let dispatcher = headless(vault.path(), &settings);

    let noop = json!({
        "path": "n.md",
        "mode": "replaceRange",
        "newText": "",
        "from": {"line": 1, "ch": 4},
        "to": {"line": 1, "ch": 4},
    });
    let result = payload(call(&dispatcher, names::NOTE_APPLY_PATCH, &noop).await);
    assert_eq!(result["mode"], "replaceRange");
    assert_eq!(read_disk(vault.path(), "n.md"), original);

    let first_line = json!({
        "path": "n.md",
        "mode": "replaceRange",
        "newText": "LINE 1",
        "from": {"line": 0, "ch": 0},
        "to": {"line": 0, "ch": 8},
    });
    let result = payload(call(&dispatcher, names::NOTE_APPLY_PATCH, &first_line).await);
    assert_eq!(read_disk(vault.path(), "n.md"), "LINE 1\nline two\n");
    assert_eq!(result["bytes"], 16);
}

#[tokio::test]
async fn test_replace_range_boundaries() {
    let vault = temp_vault(&[("n.md", "line one\nline two")]);
    let settings = SharedSettings::new(test_settings());
    settings.set_writes_enabled(true);
    let dispatcher = headless(vault.path(), &settings);

    let at = |line: usize, ch: usize| json!({"line": line, "ch": ch});
    let patch = |from: Value, to: Value| {
        json!({"path": "n.md", "mode": "replaceRange", "newText": "!", "from": from, "to": to})
    };

    // End of line is a valid column
    let end = call(&dispatcher, names::NOTE_APPLY_PATCH, &patch(at(1, 8), at(1, 8))).await;
    assert!(end.ok);
    assert_eq!(read_disk(vault.path(), "n.md"), "line one\nline two!");

    let past_end = call(&dispatcher, names::NOTE_APPLY_PATCH, &patch(at(1, 10), at(1, 10))).await;
    assert_eq!(error_code(&past_end), ErrorCode::InvalidParam);
    assert!(past_end.error.unwrap().message.contains("from.ch"));

    let bad_line = call(&dispatcher, names::NOTE_APPLY_PATCH, &patch(at(0, 0), at(5, 0))).await;
    assert_eq!(error_code(&bad_line), ErrorCode::InvalidParam);
    assert!(bad_line.error.unwrap().message.contains("to.line"));

    let reversed = call(&dispatcher, names::NOTE_APPLY_PATCH, &patch(at(1, 0), at(0, 0))).await;
    assert_eq!(error_code(&reversed), ErrorCode::InvalidParam);

    assert_eq!(read_disk(vault.path(), "n.md"), "line one\nline two!");
}

#[tokio::test]
async fn test_list_pagination_visits_every_entry_once() {
    let vault = temp_vault(&[
        ("a.md", "a"),
        ("b.md", "b"),
        ("notes/c.md", "c"),
        ("notes/d.md", "d"),
        ("notes/deep/e.md", "e"),
        ("z.txt", "z"),
    ]);
    let settings = SharedSettings::new(test_settings());
    let dispatcher = headless(vault.path(), &settings);

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0;
    loop {
        let mut params = json!({"recursive": true, "limit": 2});
        if let Some(cursor) = &cursor {
            params["cursor"] = json!(cursor);
        }
        let page = payload(call(&dispatcher, names::VAULT_LIST, &params).await);
        pages += 1;

        let items = page["items"].as_array().unwrap();
        assert!(items.len() <= 2);
        seen.extend(items.iter().map(|i| i["path"].as_str().unwrap().to_string()));

        if page["hasMore"] == json!(false) {
            assert!(page["cursor"].is_null());
            break;
        }
        cursor = Some(page["cursor"].as_str().unwrap().to_string());
        assert!(pages < 10, "pagination did not terminate");
    }

    let unique: HashSet<_> = seen.iter().cloned().collect();
    assert_eq!(unique.len(), seen.len());
    let mut expected = vec![
        "a.md",
        "b.md",
        "notes",
        "notes/c.md",
        "notes/d.md",
        "notes/deep",
        "notes/deep/e.md",
        "z.txt",
    ];
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_list_single_folder_and_bad_cursor() {
    let vault = temp_vault(&[("a.md", "a"), ("notes/c.md", "ccc"), ("notes/deep/e.md", "e")]);
    let settings = SharedSettings::new(test_settings());
    let dispatcher = headless(vault.path(), &settings);

    let page = payload(call(&dispatcher, names::VAULT_LIST, &json!({"path": "notes"})).await);
    assert_eq!(
        page["items"],
        json!([
            {"path": "notes/c.md", "type": "file", "size": 3},
            {"path": "notes/deep", "type": "folder", "children": 1},
        ])
    );

    let missing = call(&dispatcher, names::VAULT_LIST, &json!({"path": "nope"})).await;
    assert_eq!(error_code(&missing), ErrorCode::NotFound);

    let garbage = call(&dispatcher, names::VAULT_LIST, &json!({"cursor": "%%%"})).await;
    assert_eq!(error_code(&garbage), ErrorCode::InvalidCursor);
}

#[tokio::test]
async fn test_editor_commands_without_view() {
    let vault = temp_vault(&[]);
    let settings = SharedSettings::new(test_settings());
    settings.set_writes_enabled(true);
    let dispatcher = headless(vault.path(), &settings);

    let selection = payload(call(&dispatcher, names::SELECTION_GET, &json!({})).await);
    assert_eq!(
        selection,
        json!({"hasSelection": false, "source": "none", "confidence": "low"})
    );

    let active = call(&dispatcher, names::ACTIVE_FILE_GET, &json!({})).await;
    assert_eq!(error_code(&active), ErrorCode::NoActiveFile);

    let insert = call(&dispatcher, names::NOTE_INSERT_AT_CURSOR, &json!({"text": "x"})).await;
    assert_eq!(error_code(&insert), ErrorCode::NoEditor);
}

#[tokio::test]
async fn test_editor_commands_with_buffer() {
    let vault = temp_vault(&[]);
    let settings = SharedSettings::new(test_settings());
    settings.set_writes_enabled(true);
    let editor = Arc::new(BufferEditor::new());
    editor.open("notes/today.md", "hello world");
    let dispatcher = dispatcher(vault.path(), editor.clone(), &settings);

    let active = payload(call(&dispatcher, names::ACTIVE_FILE_GET, &json!({})).await);
    assert_eq!(
        active,
        json!({
            "path": "notes/today.md",
            "name": "today.md",
            "basename": "today",
            "extension": "md",
        })
    );
    let again = payload(call(&dispatcher, names::ACTIVE_FILE_GET, &json!({})).await);
    assert_eq!(again, active);

    editor.select(
        Position { line: 0, ch: 6 },
        Position { line: 0, ch: 11 },
    );
    let selection = payload(call(&dispatcher, names::SELECTION_GET, &json!({})).await);
    assert_eq!(selection["hasSelection"], true);
    assert_eq!(selection["text"], "world");
    assert_eq!(selection["source"], "active");

    let replaced = payload(
        call(
            &dispatcher,
            names::NOTE_REPLACE_SELECTION,
            &json!({"text": "there"}),
        )
        .await,
    );
    assert_eq!(replaced["cursor"], json!({"line": 0, "ch": 11}));
    assert_eq!(editor.text().unwrap(), "hello there");

    editor.blur();
    let recent = payload(call(&dispatcher, names::SELECTION_GET, &json!({})).await);
    assert_eq!(recent["source"], "recent");
    assert_eq!(recent["confidence"], "medium");
}

#[tokio::test]
async fn test_response_size_limit() {
    let big = "z".repeat(8 * 1024);
    let vault = temp_vault(&[("big.md", big.as_str())]);
    let settings = SharedSettings::new(test_settings());
    let dispatcher = headless(vault.path(), &settings);

    let read = call(&dispatcher, names::NOTE_READ, &json!({"path": "big.md"})).await;
    assert_eq!(payload(read)["bytes"], 8 * 1024);

    settings.update(|s| s.max_response_bytes = 4 * 1024);
    let too_large = call(&dispatcher, names::NOTE_READ, &json!({"path": "big.md"})).await;
    assert_eq!(error_code(&too_large), ErrorCode::ResponseTooLarge);

    // Truncating the read brings it back under the limit
    let truncated = call(
        &dispatcher,
        names::NOTE_READ,
        &json!({"path": "big.md", "maxBytes": 1024}),
    )
    .await;
    let truncated = payload(truncated);
    assert_eq!(truncated["truncated"], true);
    assert_eq!(truncated["content"].as_str().unwrap().len(), 1024);
}

#[tokio::test]
async fn test_search_and_tasks() {
    let vault = temp_vault(&[
        ("notes/a.md", "alpha\nthe Needle is here\n- [ ] buy needles\n- [x] done thing\n"),
        ("notes/b.md", "nothing to see\n"),
        ("other/c.md", "needle again\n"),
        ("image.png", "needle"),
    ]);
    let settings = SharedSettings::new(test_settings());
    let dispatcher = headless(vault.path(), &settings);

    let found = payload(
        call(
            &dispatcher,
            names::VAULT_SEARCH,
            &json!({"query": "needle", "paths": ["notes"]}),
        )
        .await,
    );
    let results = found["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["path"], "notes/a.md");
    assert_eq!(results[0]["line"], 2);
    assert!(results[0]["snippet"].as_str().unwrap().contains("Needle"));
    assert_eq!(results[1]["line"], 3);
    assert_eq!(found["truncated"], false);

    let everywhere = payload(
        call(&dispatcher, names::VAULT_SEARCH, &json!({"query": "needle"})).await,
    );
    let paths: HashSet<_> = everywhere["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["path"].as_str().unwrap().to_string())
        .collect();
    assert!(paths.contains("other/c.md"));
    assert!(!paths.contains("image.png"));

    let limited = payload(
        call(
            &dispatcher,
            names::VAULT_SEARCH,
            &json!({"query": "needle", "limit": 1}),
        )
        .await,
    );
    assert_eq!(limited["results"].as_array().unwrap().len(), 1);
    assert_eq!(limited["truncated"], true);

    let missing = call(&dispatcher, names::VAULT_SEARCH, &json!({})).await;
    assert_eq!(error_code(&missing), ErrorCode::MissingParam);

    let open = payload(
        call(
            &dispatcher,
            names::TASKS_SEARCH,
            &json!({"completed": false}),
        )
        .await,
    );
    assert_eq!(
        open["tasks"],
        json!([{
            "path": "notes/a.md",
            "line": 3,
            "status": " ",
            "completed": false,
            "text": "buy needles",
        }])
    );

    let done = payload(call(&dispatcher, names::TASKS_SEARCH, &json!({"query": "DONE"})).await);
    assert_eq!(done["tasks"][0]["text"], "done thing");
    assert_eq!(done["tasks"][0]["completed"], true);
}

#[tokio::test]
async fn test_search_stops_at_file_scan_cap() {
    let vault = temp_vault(&[
        ("a.md", "needle one\nneedle two\n"),
        ("b.md", "needle three\n"),
        ("c.md", "needle four\n"),
    ]);
    let settings = SharedSettings::new(test_settings());
    let dispatcher = headless(vault.path(), &settings);

    let capped = payload(
        call(
            &dispatcher,
            names::VAULT_SEARCH,
            &json!({"query": "needle", "maxFiles": 1}),
        )
        .await,
    );
    assert_eq!(capped["filesScanned"], 1);
    assert_eq!(capped["truncated"], true);
    let results = capped["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r["path"] == "a.md"));

    let all = payload(
        call(
            &dispatcher,
            names::VAULT_SEARCH,
            &json!({"query": "needle", "maxFiles": 3}),
        )
        .await,
    );
    assert_eq!(all["filesScanned"], 3);
    assert_eq!(all["truncated"], false);
    assert_eq!(all["results"].as_array().unwrap().len(), 4);

    // Requests above the configured ceiling are clamped to it
    settings.update(|s| s.max_search_files = 2);
    let clamped = payload(
        call(
            &dispatcher,
            names::VAULT_SEARCH,
            &json!({"query": "needle", "maxFiles": 10}),
        )
        .await,
    );
    assert_eq!(clamped["filesScanned"], 2);
    assert_eq!(clamped["truncated"], true);
    let paths: HashSet<_> = clamped["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["path"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(paths, HashSet::from(["a.md".to_string(), "b.md".to_string()]));
}

#[tokio::test]
async fn test_metadata_and_backlinks() {
    let vault = temp_vault(&[
        (
            "a.md",
            "---\ntitle: Alpha\n---\n# Heading\nSee [[b]] and [[b|bee]] #idea\n",
        ),
        ("b.md", "# B\n"),
        ("sub/c.md", "Back to [[b]]\n"),
    ]);
    let settings = SharedSettings::new(test_settings());
    let dispatcher = headless(vault.path(), &settings);

    let meta = payload(call(&dispatcher, names::METADATA_GET, &json!({"path": "a.md"})).await);
    assert_eq!(meta["frontmatter"]["title"], "Alpha");
    assert_eq!(meta["headings"][0]["heading"], "Heading");
    assert_eq!(meta["headings"][0]["level"], 1);
    let links = meta["links"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[1]["displayText"], "bee");
    assert!(
        meta["tags"]
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t["tag"] == "#idea")
    );

    let not_found = call(&dispatcher, names::METADATA_GET, &json!({"path": "zzz.md"})).await;
    assert_eq!(error_code(&not_found), ErrorCode::NotFound);
    let folder = call(&dispatcher, names::METADATA_GET, &json!({"path": "sub"})).await;
    assert_eq!(error_code(&folder), ErrorCode::NotFile);

    let backlinks =
        payload(call(&dispatcher, names::LINKS_BACKLINKS, &json!({"path": "b.md"})).await);
    assert_eq!(
        backlinks,
        json!({
            "path": "b.md",
            "backlinks": [
                {"path": "a.md", "count": 2},
                {"path": "sub/c.md", "count": 1},
            ],
        })
    );
}

#[tokio::test]
async fn test_create_note_and_read_back() {
    let vault = temp_vault(&[("exists.md", "x")]);
    let settings = SharedSettings::new(test_settings());
    settings.set_writes_enabled(true);
    let dispatcher = headless(vault.path(), &settings);

    let created = payload(
        call(
            &dispatcher,
            names::NOTE_CREATE,
            &json!({"path": "inbox/2024/new.md", "content": "# New\n"}),
        )
        .await,
    );
    assert_eq!(created["created"], true);
    assert_eq!(read_disk(vault.path(), "inbox/2024/new.md"), "# New\n");

    let again = call(
        &dispatcher,
        names::NOTE_CREATE,
        &json!({"path": "exists.md", "content": "y"}),
    )
    .await;
    assert_eq!(error_code(&again), ErrorCode::AlreadyExists);
    assert_eq!(read_disk(vault.path(), "exists.md"), "x");

    let escape = call(
        &dispatcher,
        names::NOTE_CREATE,
        &json!({"path": "../outside.md", "content": "y"}),
    )
    .await;
    assert_eq!(error_code(&escape), ErrorCode::InvalidParam);
}

#[tokio::test]
async fn test_node_bridge_answers_invocations() {
    let vault = temp_vault(&[("a.md", "alpha")]);
    let settings = SharedSettings::new(test_settings());
    let dispatcher = Arc::new(headless(vault.path(), &settings));

    let options = ClientOptions::node(dispatcher.command_names());
    let (client, connector) = memory_client(options, &settings);
    let bridge = NodeBridge::spawn(client.clone(), dispatcher);

    client.connect();
    let mut peer = connector.accept().await;
    let connect = peer.pair("n").await;
    let commands = connect.params.unwrap()["commands"].clone();
    assert_eq!(commands.as_array().unwrap().len(), 12);
    client.wait_until_paired(Duration::from_secs(5)).await.unwrap();

    peer.event(
        "node.invoke.request",
        json!({
            "id": "inv-1",
            "nodeId": "node-1",
            "command": names::NOTE_READ,
            "paramsJSON": "{\"path\":\"a.md\"}",
        }),
    );
    let reply = peer.expect_request(INVOKE_RESULT_METHOD).await;
    let params = reply.params.unwrap();
    assert_eq!(params["id"], "inv-1");
    assert_eq!(params["nodeId"], "node-1");
    assert_eq!(params["ok"], true);
    let body: Value = serde_json::from_str(params["payloadJSON"].as_str().unwrap()).unwrap();
    assert_eq!(body["content"], "alpha");
    peer.respond(&reply.id, json!({}));

    peer.event(
        "node.invoke.request",
        json!({"id": "inv-2", "nodeId": "node-1", "command": names::NOTE_CREATE}),
    );
    let reply = peer.expect_request(INVOKE_RESULT_METHOD).await;
    let params = reply.params.unwrap();
    assert_eq!(params["ok"], false);
    assert_eq!(params["error"]["code"], "E_WRITES_DISABLED");
    assert!(params.get("payloadJSON").is_none());

    client.disconnect();
    bridge.abort();
}

/// Single in-memory note `a.md` whose reads take ten seconds
struct SlowVault(FsVault);

#[async_trait]
impl ContentStore for SlowVault {
    async fn stat(&self, path: &str) -> vault_node::Result<Option<Entry>> {
        Ok((path == "a.md").then(|| Entry {
            path: path.to_string(),
            kind: EntryKind::File,
            size: 5,
            children: 0,
        }))
    }

    async fn read(&self, _path: &str) -> vault_node::Result<String> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok("alpha".to_string())
    }

    async fn write(&self, path: &str, content: &str) -> vault_node::Result<()> {
        self.0.write(path, content).await
    }

    async fn create(&self, path: &str, content: &str) -> vault_node::Result<()> {
        self.0.create(path, content).await
    }

    async fn create_folder(&self, path: &str) -> vault_node::Result<()> {
        self.0.create_folder(path).await
    }

    async fn list_entries(&self) -> vault_node::Result<Vec<Entry>> {
        self.0.list_entries().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_node_bridge_honors_invoke_timeout() {
    let vault = temp_vault(&[("a.md", "alpha")]);
    let settings = SharedSettings::new(test_settings());
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(SlowVault(FsVault::open(vault.path()).unwrap())),
        Arc::new(HeadlessEditor),
        Arc::new(settings.clone()),
    ));

    let options = ClientOptions::node(dispatcher.command_names());
    let (client, connector) = memory_client(options, &settings);
    let bridge = NodeBridge::spawn(client.clone(), dispatcher);

    client.connect();
    let mut peer = connector.accept().await;
    peer.pair("n").await;
    client.wait_until_paired(Duration::from_secs(5)).await.unwrap();

    peer.event(
        "node.invoke.request",
        json!({
            "id": "inv-slow",
            "nodeId": "node-1",
            "command": names::NOTE_READ,
            "paramsJSON": "{\"path\":\"a.md\"}",
            "idempotencyKey": "k-1",
            "timeoutMs": 100,
        }),
    );
    let reply = peer.expect_request(INVOKE_RESULT_METHOD).await;
    let params = reply.params.unwrap();
    assert_eq!(params["id"], "inv-slow");
    assert_eq!(params["ok"], false);
    assert_eq!(params["error"]["code"], "E_INTERNAL");
    assert!(params["error"]["message"].as_str().unwrap().contains("timed out"));
    peer.respond(&reply.id, json!({}));

    // A generous deadline lets the same command finish
    peer.event(
        "node.invoke.request",
        json!({
            "id": "inv-patient",
            "nodeId": "node-1",
            "command": names::NOTE_READ,
            "paramsJSON": "{\"path\":\"a.md\"}",
            "timeoutMs": 60_000,
        }),
    );
    let reply = peer.expect_request(INVOKE_RESULT_METHOD).await;
    let params = reply.params.unwrap();
    assert_eq!(params["id"], "inv-patient");
    assert_eq!(params["ok"], true);
    peer.respond(&reply.id, json!({}));

    client.disconnect();
    bridge.abort();
}

#[tokio::test]
async fn test_shared_activity_log_is_bounded() {
    let vault = temp_vault(&[("a.md", "alpha")]);
    let settings = SharedSettings::new(test_settings());
    let log = ActivityLog::new(3);
    let dispatcher = headless(vault.path(), &settings).with_log(log.clone());

    for _ in 0..5 {
        call(&dispatcher, names::NOTE_READ, &json!({"path": "a.md"})).await;
    }
    call(&dispatcher, names::NOTE_READ, &json!({"path": "missing.md"})).await;

    let entries = log.entries();
    assert_eq!(entries.len(), 3);
    let last = entries.last().unwrap();
    assert!(!last.ok);
    assert_eq!(last.command, names::NOTE_READ);
    assert!(last.error.as_deref().unwrap().contains("missing.md"));
}
