//! Changelog sync
//!
//! One run walks a fixed sequence:
//!
//! 1. fetch the stored document (a missing object starts an empty one)
//! 2. collect changes from one version list, or from every open version list
//! 3. stop with "nothing to do" if no changes were found, leaving storage untouched
//! 4. merge each version, keeping release dates already on record
//! 5. upload the merged document and drop the scratch copy
//!
//! Any lookup or storage failure aborts the whole run. There are no retries.

use crate::board::BoardProvider;
use crate::changelog::{ChangelogDocument, MergeOutcome};
use crate::core::context::SyncContext;
use crate::core::error::{ChlogError, ChlogResult};
use crate::core::scratch::ScratchFile;
use crate::release::version::is_version_tag;
use crate::release::{ReleaseBundle, ReleaseCollector};
use crate::storage::{JSON_CONTENT_TYPE, ObjectStore};
use chrono::NaiveDate;
use serde::Serialize;

/// Which versions a run updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTarget {
  /// Exactly one version list
  Tag(String),
  /// Every open list named like a version
  OpenReleases,
}

impl SyncTarget {
  fn nothing_to_do_message(&self) -> &'static str {
    match self {
      SyncTarget::Tag(_) => "No entries to add to changelog.",
      SyncTarget::OpenReleases => "No open releases to add to changelog.",
    }
  }
}

/// Parameters of a single run
#[derive(Debug, Clone)]
pub struct SyncRequest {
  pub target: SyncTarget,
  /// Release date given to versions written for the first time
  pub today: NaiveDate,
  /// Merge but do not upload
  pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
  /// Merged document uploaded
  Published,
  /// Merged document built but not uploaded
  DryRun,
  /// No changes found; storage untouched
  NothingToDo,
}

/// Per-version result of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionReport {
  pub version: String,
  pub changes: usize,
  pub release_date: String,
  /// True when the version was new to the document
  pub inserted: bool,
}

/// What a run did
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
  pub outcome: SyncOutcome,
  /// Where the changelog lives
  pub location: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  pub versions: Vec<VersionReport>,
  /// Merged document, only on dry runs
  #[serde(skip_serializing_if = "Option::is_none")]
  pub document: Option<ChangelogDocument>,
}

impl SyncReport {
  pub fn total_changes(&self) -> usize {
    self.versions.iter().map(|v| v.changes).sum()
  }
}

/// Run one sync against the context's board and store
pub fn run_sync<B, S>(ctx: &SyncContext<B, S>, request: &SyncRequest) -> ChlogResult<SyncReport>
where
  B: BoardProvider,
  S: ObjectStore,
{
  if let SyncTarget::Tag(tag) = &request.target
    && !is_version_tag(tag)
  {
    return Err(ChlogError::InvalidVersion { version: tag.clone() });
  }

  let key = ctx.changelog_key.as_str();
  let location = ctx.store.describe(key);

  let scratch = ScratchFile::create(ctx.scratch_dir(), key)?;
  let mut document = fetch_document(ctx, &scratch)?;

  let collector = ReleaseCollector::new(&ctx.board, &ctx.mapper, &ctx.board_name);
  let bundles = match &request.target {
    SyncTarget::Tag(tag) => vec![ReleaseBundle {
      version: tag.clone(),
      changes: collector.collect_tag(tag)?,
    }],
    SyncTarget::OpenReleases => collector.collect_open_releases()?,
  };

  let bundles: Vec<ReleaseBundle> = bundles
    .into_iter()
    .filter(|b| {
      if b.changes.is_empty() {
        tracing::info!(version = %b.version, "version list has no cards, skipping");
      }
      !b.changes.is_empty()
    })
    .collect();

  if bundles.is_empty() {
    tracing::info!("nothing to merge, leaving {} untouched", location);
    return Ok(SyncReport {
      outcome: SyncOutcome::NothingToDo,
      location,
      message: Some(request.target.nothing_to_do_message().to_string()),
      versions: Vec::new(),
      document: None,
    });
  }

  let versions = merge_bundles(&mut document, bundles, request.today);

  let bytes = document.to_vec()?;
  scratch.write(&bytes)?;

  if request.dry_run {
    scratch.remove()?;
    return Ok(SyncReport {
      outcome: SyncOutcome::DryRun,
      location,
      message: None,
      versions,
      document: Some(document),
    });
  }

  tracing::info!(bytes = bytes.len(), "uploading changelog to {}", location);
  if let Err(error) = ctx.store.put_object(key, &bytes, JSON_CONTENT_TYPE) {
    let scratch = match scratch.keep() {
      Ok(path) => Some(path),
      Err(e) => {
        tracing::warn!("could not keep scratch copy: {}", e);
        None
      }
    };
    return Err(ChlogError::Upload { error, scratch });
  }
  scratch.remove()?;

  Ok(SyncReport {
    outcome: SyncOutcome::Published,
    location,
    message: None,
    versions,
    document: None,
  })
}

/// Load the stored document into the scratch copy; a missing object is an empty document
fn fetch_document<B, S>(ctx: &SyncContext<B, S>, scratch: &ScratchFile) -> ChlogResult<ChangelogDocument>
where
  B: BoardProvider,
  S: ObjectStore,
{
  let key = ctx.changelog_key.as_str();
  let bytes = match ctx.store.get_object(key) {
    Ok(bytes) => bytes,
    Err(e) if e.is_not_found() => {
      tracing::info!("no changelog at {} yet, starting empty", ctx.store.describe(key));
      Vec::new()
    }
    Err(e) => return Err(e.into()),
  };
  scratch.write(&bytes)?;

  let document = ChangelogDocument::from_slice(&scratch.read()?).map_err(|e| {
    ChlogError::with_help(
      format!("Stored changelog {} is not valid: {}", ctx.store.describe(key), e),
      "The document must be a JSON array of version entries. Fix or remove the object, then rerun.",
    )
  })?;
  tracing::debug!(entries = document.len(), "loaded changelog");
  Ok(document)
}

fn merge_bundles(document: &mut ChangelogDocument, bundles: Vec<ReleaseBundle>, today: NaiveDate) -> Vec<VersionReport> {
  let today = today.format("%Y-%m-%d").to_string();
  let mut reports = Vec::with_capacity(bundles.len());

  for bundle in bundles {
    let release_date = document
      .release_date(&bundle.version)
      .map(str::to_owned)
      .unwrap_or_else(|| today.clone());
    let changes = bundle.changes.len();

    let outcome = document.merge(&bundle.version, bundle.changes, Some(release_date.clone()));
    match outcome {
      MergeOutcome::Inserted => tracing::info!(version = %bundle.version, changes, "added version"),
      MergeOutcome::Replaced { index } => {
        tracing::info!(version = %bundle.version, changes, index, "replaced version")
      }
    }

    reports.push(VersionReport {
      version: bundle.version,
      changes,
      release_date,
      inserted: outcome.is_insert(),
    });
  }

  reports
}

/// Run the sync and print its report
pub fn run_sync_command<B, S>(ctx: &SyncContext<B, S>, request: &SyncRequest, json: bool) -> ChlogResult<()>
where
  B: BoardProvider,
  S: ObjectStore,
{
  let report = run_sync(ctx, request)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  print_report(&report, &request.target);
  Ok(())
}

fn print_report(report: &SyncReport, target: &SyncTarget) {
  for line in report_lines(report, target) {
    println!("{}", line);
  }
}

/// Human-readable report, one entry per output line
fn report_lines(report: &SyncReport, target: &SyncTarget) -> Vec<String> {
  if report.outcome == SyncOutcome::NothingToDo {
    return vec![format!("ℹ️  {}", report.message.as_deref().unwrap_or("Nothing to do."))];
  }

  let mut lines: Vec<String> = report
    .versions
    .iter()
    .map(|v| format!("Version '{}' updated with {} changes.", v.version, v.changes))
    .collect();

  match report.outcome {
    SyncOutcome::DryRun => {
      if let Some(document) = &report.document
        && let Ok(pretty) = serde_json::to_string_pretty(document)
      {
        lines.push(String::new());
        lines.push(pretty);
      }
      lines.push(String::new());
      lines.push(format!("🔍 Dry-run mode ({} not updated)", report.location));
    }
    SyncOutcome::Published if *target == SyncTarget::OpenReleases => {
      lines.push(format!("✅ Changelog finished updating and uploaded to {}.", report.location));
    }
    _ => {}
  }
  lines
}
