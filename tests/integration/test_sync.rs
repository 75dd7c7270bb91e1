//! Sync runs against a fake board and an in-memory store

use crate::helpers::*;
use anyhow::Result;
use chlog::commands::{SyncOutcome, run_sync};
use chlog::core::error::{ChlogError, NotFoundError};
use chlog::storage::{JSON_CONTENT_TYPE, MemoryStore};
use serde_json::json;
use tempfile::TempDir;

fn existing_changelog() -> MemoryStore {
  let doc = json!([
    {
      "version": "v1.1.0",
      "release_date": "2025-02-10",
      "changes": [{ "name": "Old", "url": "https://trello.com/c/a/7-old", "apps": [], "number": "7", "is_bug": false }]
    },
    {
      "version": "v1.0.0",
      "release_date": "2024-12-24",
      "changes": []
    }
  ]);
  MemoryStore::new().with_object(KEY, doc.to_string(), JSON_CONTENT_TYPE)
}

#[test]
fn test_new_version_into_empty_storage() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list(
    "v1.0.0",
    vec![card("Fix login", 42, &["Bug", "API"]), card("Dark mode", 43, &[])],
  );
  let ctx = context(board, MemoryStore::new(), scratch.path());

  let report = run_sync(&ctx, &tag("v1.0.0"))?;

  assert_eq!(report.outcome, SyncOutcome::Published);
  assert_eq!(report.total_changes(), 2);
  assert!(report.versions[0].inserted);
  assert_eq!(ctx.store.put_count(), 1);

  let stored = stored_json(&ctx.store)?;
  assert_eq!(
    stored,
    json!([{
      "version": "v1.0.0",
      "release_date": "2025-03-01",
      "changes": [
        { "name": "Fix login", "url": "https://trello.com/c/id42/42-fix-login", "apps": ["API"], "number": "42", "is_bug": true },
        { "name": "Dark mode", "url": "https://trello.com/c/id43/43-dark-mode", "apps": [], "number": "43", "is_bug": false }
      ]
    }])
  );
  Ok(())
}

#[test]
fn test_uploaded_with_json_content_type() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list("v1.0.0", vec![card("Fix", 1, &[])]);
  let ctx = context(board, MemoryStore::new(), scratch.path());

  run_sync(&ctx, &tag("v1.0.0"))?;

  let object = ctx.store.object(KEY).expect("changelog written");
  assert_eq!(object.content_type, "application/json");
  Ok(())
}

#[test]
fn test_existing_version_replaced_in_place() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list("v1.0.0", vec![card("Late fix", 50, &["Hotfix"])]);
  let ctx = context(board, existing_changelog(), scratch.path());

  let report = run_sync(&ctx, &tag("v1.0.0"))?;
  assert!(!report.versions[0].inserted);
  assert_eq!(report.versions[0].release_date, "2024-12-24");

  let stored = stored_json(&ctx.store)?;
  let versions: Vec<&str> = stored
    .as_array()
    .expect("array")
    .iter()
    .map(|e| e["version"].as_str().unwrap_or_default())
    .collect();
  assert_eq!(versions, vec!["v1.1.0", "v1.0.0"]);
  assert_eq!(stored[1]["release_date"], "2024-12-24");
  assert_eq!(stored[1]["changes"][0]["name"], "Late fix");
  assert_eq!(stored[1]["changes"][0]["is_bug"], true);
  // untouched entries survive as they were
  assert_eq!(stored[0]["changes"][0]["name"], "Old");
  Ok(())
}

#[test]
fn test_new_version_goes_to_front() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list("v1.2.0", vec![card("Feature", 60, &["Collect App"])]);
  let ctx = context(board, existing_changelog(), scratch.path());

  run_sync(&ctx, &tag("v1.2.0"))?;

  let stored = stored_json(&ctx.store)?;
  assert_eq!(stored.as_array().map(Vec::len), Some(3));
  assert_eq!(stored[0]["version"], "v1.2.0");
  assert_eq!(stored[0]["release_date"], "2025-03-01");
  assert_eq!(stored[0]["changes"][0]["apps"], json!(["Collect App"]));
  Ok(())
}

#[test]
fn test_open_releases_filters_and_merges_each_version() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new()
    .list("Backlog", vec![card("Someday", 1, &[])])
    .list("v0.9.0", vec![card("Old fix", 2, &["Bug"])])
    .list("not-a-version", vec![card("Noise", 3, &[])])
    .list("v1.0.0", vec![card("New thing", 4, &[])]);
  let ctx = context(board, MemoryStore::new(), scratch.path());

  let report = run_sync(&ctx, &open_releases())?;

  let processed: Vec<&str> = report.versions.iter().map(|v| v.version.as_str()).collect();
  assert_eq!(processed, vec!["v1.0.0", "v0.9.0"]);
  assert_eq!(ctx.store.put_count(), 1);

  // each new version is prepended in turn
  let stored = stored_json(&ctx.store)?;
  assert_eq!(stored[0]["version"], "v0.9.0");
  assert_eq!(stored[1]["version"], "v1.0.0");
  assert_eq!(stored.as_array().map(Vec::len), Some(2));
  Ok(())
}

#[test]
fn test_open_releases_skips_empty_lists() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new()
    .list("v1.1.0", Vec::new())
    .list("v1.0.0", vec![card("Fix", 9, &[])]);
  let ctx = context(board, existing_changelog(), scratch.path());

  let report = run_sync(&ctx, &open_releases())?;

  assert_eq!(report.versions.len(), 1);
  assert_eq!(report.versions[0].version, "v1.0.0");
  let stored = stored_json(&ctx.store)?;
  // the stored v1.1.0 entry is not emptied by an empty list
  assert_eq!(stored[0]["changes"][0]["name"], "Old");
  Ok(())
}

#[test]
fn test_tag_with_no_cards_leaves_storage_alone() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list("v1.0.0", Vec::new());
  let ctx = context(board, existing_changelog(), scratch.path());

  let report = run_sync(&ctx, &tag("v1.0.0"))?;

  assert_eq!(report.outcome, SyncOutcome::NothingToDo);
  assert_eq!(report.message.as_deref(), Some("No entries to add to changelog."));
  assert_eq!(ctx.store.put_count(), 0);
  assert_eq!(dir_len(scratch.path())?, 0);
  Ok(())
}

#[test]
fn test_no_open_releases() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list("Backlog", vec![card("Someday", 1, &[])]);
  let ctx = context(board, MemoryStore::new(), scratch.path());

  let report = run_sync(&ctx, &open_releases())?;

  assert_eq!(report.outcome, SyncOutcome::NothingToDo);
  assert_eq!(report.message.as_deref(), Some("No open releases to add to changelog."));
  assert_eq!(ctx.store.put_count(), 0);
  Ok(())
}

#[test]
fn test_missing_list_aborts_without_upload() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list("v1.0.0", vec![card("Fix", 1, &[])]);
  let ctx = context(board, existing_changelog(), scratch.path());

  let err = run_sync(&ctx, &tag("v9.9.9")).unwrap_err();

  assert!(matches!(err, ChlogError::NotFound(NotFoundError::List { .. })));
  assert!(err.to_string().contains("v9.9.9"));
  assert_eq!(ctx.store.put_count(), 0);
  assert_eq!(dir_len(scratch.path())?, 0);
  Ok(())
}

#[test]
fn test_invalid_version_touches_nothing() -> Result<()> {
  let scratch = TempDir::new()?;
  let ctx = context(FakeBoard::new(), MemoryStore::new(), scratch.path());

  let err = run_sync(&ctx, &tag("release-1")).unwrap_err();

  assert!(matches!(err, ChlogError::InvalidVersion { .. }));
  assert_eq!(ctx.board.calls.get(), 0);
  assert_eq!(ctx.store.put_count(), 0);
  Ok(())
}

#[test]
fn test_board_failure_aborts_run() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new()
    .list("v1.0.0", vec![card("Fix", 1, &[])])
    .failing_cards();
  let ctx = context(board, existing_changelog(), scratch.path());

  let err = run_sync(&ctx, &open_releases()).unwrap_err();

  assert!(matches!(err, ChlogError::Transport { .. }));
  assert_eq!(ctx.store.put_count(), 0);
  Ok(())
}

#[test]
fn test_corrupt_changelog_is_an_error() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list("v1.0.0", vec![card("Fix", 1, &[])]);
  let store = MemoryStore::new().with_object(KEY, "{ not json", JSON_CONTENT_TYPE);
  let ctx = context(board, store, scratch.path());

  let err = run_sync(&ctx, &tag("v1.0.0")).unwrap_err();

  assert!(err.to_string().contains("not valid"));
  assert!(err.help_message().is_some());
  assert_eq!(ctx.store.put_count(), 0);
  Ok(())
}

#[test]
fn test_storage_read_failure_is_not_treated_as_empty() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list("v1.0.0", vec![card("Fix", 1, &[])]);
  let ctx = context(board, DeniedStore, scratch.path());

  let err = run_sync(&ctx, &tag("v1.0.0")).unwrap_err();

  assert!(matches!(err, ChlogError::Storage(_)));
  // the board is never consulted once storage fails
  assert_eq!(ctx.board.calls.get(), 0);
  Ok(())
}

#[test]
fn test_failed_upload_keeps_scratch_copy() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list("v1.0.0", vec![card("Fix", 1, &[])]);
  let ctx = context(board, MemoryStore::new(), scratch.path());
  ctx.store.fail_puts(true);

  let err = run_sync(&ctx, &tag("v1.0.0")).unwrap_err();

  let ChlogError::Upload { scratch: Some(path), .. } = &err else {
    panic!("expected upload error with a kept scratch file, got {:?}", err);
  };
  assert!(path.starts_with(scratch.path()));
  let kept: serde_json::Value = serde_json::from_slice(&std::fs::read(path)?)?;
  assert_eq!(kept[0]["version"], "v1.0.0");
  assert!(err.help_message().unwrap_or_default().contains(&path.display().to_string()));
  assert!(ctx.store.object(KEY).is_none());
  Ok(())
}

#[test]
fn test_scratch_removed_after_publish() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list("v1.0.0", vec![card("Fix", 1, &[])]);
  let ctx = context(board, existing_changelog(), scratch.path());

  run_sync(&ctx, &tag("v1.0.0"))?;

  assert_eq!(dir_len(scratch.path())?, 0);
  Ok(())
}

#[test]
fn test_dry_run_does_not_upload() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list("v1.2.0", vec![card("Feature", 60, &[])]);
  let ctx = context(board, existing_changelog(), scratch.path());
  let mut request = tag("v1.2.0");
  request.dry_run = true;

  let report = run_sync(&ctx, &request)?;

  assert_eq!(report.outcome, SyncOutcome::DryRun);
  assert_eq!(ctx.store.put_count(), 0);
  let document = report.document.expect("dry run carries the merged document");
  assert_eq!(document.len(), 3);
  assert_eq!(document.entries()[0].version, "v1.2.0");
  assert_eq!(dir_len(scratch.path())?, 0);
  Ok(())
}

#[test]
fn test_second_run_is_stable() -> Result<()> {
  let scratch = TempDir::new()?;
  let board = FakeBoard::new().list("v1.0.0", vec![card("Fix", 1, &["Bug"])]);
  let ctx = context(board, MemoryStore::new(), scratch.path());

  run_sync(&ctx, &tag("v1.0.0"))?;
  let first = stored_json(&ctx.store)?;

  let mut later = tag("v1.0.0");
  later.today = chrono::NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date");
  run_sync(&ctx, &later)?;
  let second = stored_json(&ctx.store)?;

  assert_eq!(first, second);
  assert_eq!(ctx.store.put_count(), 2);
  Ok(())
}

#[test]
fn test_untouched_entries_are_written_back_as_read() -> Result<()> {
  let scratch = TempDir::new()?;
  let stored = json!([
    {
      "version": "v1.0.0",
      "release_date": null,
      "changes": [{ "name": "A", "url": "u/1-a", "apps": [], "number": "1", "is_bug": false, "description": "hi" }],
      "notes": "keep me"
    }
  ]);
  let store = MemoryStore::new().with_object(KEY, stored.to_string(), JSON_CONTENT_TYPE);
  let board = FakeBoard::new().list("v2.0.0", vec![card("New", 2, &[])]);
  let ctx = context(board, store, scratch.path());

  run_sync(&ctx, &tag("v2.0.0"))?;

  let written = stored_json(&ctx.store)?;
  assert_eq!(written[0]["version"], "v2.0.0");
  assert_eq!(written[1], stored[0]);
  Ok(())
}
