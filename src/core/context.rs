//! Run context - build once, pass everywhere
//!
//! # Design
//!
//! `SyncContext` holds the board provider, the object store and the label mapper for
//! a single run. `main.rs` builds it from configuration and hands it to the sync
//! command by reference; tests build it around fakes.
//!
//! ```text
//! main.rs:
//!   ChlogConfig::from_env() -> SyncContext::from_config() -> &SyncContext
//!   |
//!   v
//! commands/sync.rs:
//!   fn run_sync(ctx: &SyncContext<B, S>, request)
//! ```

use crate::board::{BoardProvider, TrelloClient};
use crate::changelog::CardMapper;
use crate::core::config::ChlogConfig;
use crate::storage::{ObjectStore, S3Store};
use std::path::{Path, PathBuf};

/// Everything a sync run needs, with providers injected
pub struct SyncContext<B: BoardProvider, S: ObjectStore> {
  /// Board provider (Trello in production)
  pub board: B,

  /// Object store holding the changelog document
  pub store: S,

  /// Card to changelog record mapping
  pub mapper: CardMapper,

  /// Exact name of the board carrying the version lists
  pub board_name: String,

  /// Object key of the changelog document
  pub changelog_key: String,

  /// Directory for the local scratch copy of the document
  pub scratch_dir: PathBuf,
}

impl<B: BoardProvider, S: ObjectStore> SyncContext<B, S> {
  pub fn new(
    board: B,
    store: S,
    mapper: CardMapper,
    board_name: impl Into<String>,
    changelog_key: impl Into<String>,
  ) -> Self {
    Self {
      board,
      store,
      mapper,
      board_name: board_name.into(),
      changelog_key: changelog_key.into(),
      scratch_dir: std::env::temp_dir(),
    }
  }

  /// Keep scratch copies somewhere other than the system temp directory
  #[must_use]
  pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.scratch_dir = dir.into();
    self
  }

  pub fn scratch_dir(&self) -> &Path {
    &self.scratch_dir
  }
}

impl SyncContext<TrelloClient, S3Store> {
  /// Production context: Trello board, S3 storage
  pub fn from_config(config: &ChlogConfig) -> Self {
    Self::new(
      TrelloClient::from_config(&config.trello),
      S3Store::from_config(&config.storage),
      CardMapper::from_config(&config.labels),
      config.trello.board_name.clone(),
      config.storage.changelog_key.clone(),
    )
  }
}
