use super::version::{compare_descending, is_version_tag, semantic_order_conflicts};
use crate::board::{Board, BoardList, BoardProvider};
use crate::changelog::{CardMapper, ChangeRecord};
use crate::core::error::{ChlogResult, NotFoundError};
use serde::Serialize;

/// Cards of one version list, mapped for the changelog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseBundle {
  pub version: String,
  pub changes: Vec<ChangeRecord>,
}

/// Reads version lists off the configured board
pub struct ReleaseCollector<'a, P: BoardProvider> {
  provider: &'a P,
  mapper: &'a CardMapper,
  board_name: &'a str,
}

impl<'a, P: BoardProvider> ReleaseCollector<'a, P> {
  pub fn new(provider: &'a P, mapper: &'a CardMapper, board_name: &'a str) -> Self {
    Self {
      provider,
      mapper,
      board_name,
    }
  }

  /// Changes filed under the open list named exactly `tag`
  ///
  /// An empty list yields an empty vector; whether that is an error is up to the caller.
  pub fn collect_tag(&self, tag: &str) -> ChlogResult<Vec<ChangeRecord>> {
    let board = self.board()?;
    let list = self
      .provider
      .open_lists(&board)?
      .into_iter()
      .find(|l| l.name == tag)
      .ok_or_else(|| NotFoundError::List { name: tag.to_string() })?;

    let changes = self.map_cards(&list)?;
    tracing::info!(version = tag, changes = changes.len(), "collected version list");
    Ok(changes)
  }

  /// One bundle per open version-named list, sorted by name descending
  pub fn collect_open_releases(&self) -> ChlogResult<Vec<ReleaseBundle>> {
    let board = self.board()?;
    let mut bundles = Vec::new();

    for list in self.provider.open_lists(&board)? {
      if !is_version_tag(&list.name) {
        tracing::debug!(list = %list.name, "skipping non-version list");
        continue;
      }
      let changes = self.map_cards(&list)?;
      tracing::info!(version = %list.name, changes = changes.len(), "collected version list");
      bundles.push(ReleaseBundle {
        version: list.name,
        changes,
      });
    }

    bundles.sort_by(|a, b| compare_descending(&a.version, &b.version));

    let versions: Vec<&str> = bundles.iter().map(|b| b.version.as_str()).collect();
    for (above, below) in semantic_order_conflicts(&versions) {
      tracing::warn!(
        %above,
        %below,
        "versions are ordered by name, so {} is processed before the newer {}",
        above,
        below
      );
    }

    Ok(bundles)
  }

  fn board(&self) -> ChlogResult<Board> {
    let board = self
      .provider
      .list_boards()?
      .into_iter()
      .find(|b| b.name == self.board_name)
      .ok_or_else(|| NotFoundError::Board {
        name: self.board_name.to_string(),
      })?;
    tracing::debug!(board = %board.name, id = %board.id, "resolved board");
    Ok(board)
  }

  fn map_cards(&self, list: &BoardList) -> ChlogResult<Vec<ChangeRecord>> {
    Ok(
      self
        .provider
        .list_cards(list)?
        .iter()
        .map(|card| self.mapper.map(card))
        .collect(),
    )
  }
}
