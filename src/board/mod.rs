//! Kanban board provider
//!
//! The sync only ever reads from the board, so the capability is three listing calls.
//! `TrelloClient` is the production implementation; tests substitute their own.

pub mod trello;

use crate::core::error::ChlogResult;
use serde::Deserialize;

pub use trello::TrelloClient;

/// A named collection of lists
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Board {
  pub id: String,
  pub name: String,
}

/// An ordered column of cards on a board
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoardList {
  pub id: String,
  pub name: String,
}

/// A single ticket on a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Card {
  pub name: String,
  pub url: String,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub labels: Vec<Label>,
}

/// A tag attached to a card
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
  #[serde(default, deserialize_with = "null_as_empty")]
  pub name: String,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: serde::Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read-only access to a board service
pub trait BoardProvider {
  /// All boards visible to the authenticated member
  fn list_boards(&self) -> ChlogResult<Vec<Board>>;

  /// Open lists of a board, in board order
  fn open_lists(&self, board: &Board) -> ChlogResult<Vec<BoardList>>;

  /// Cards of a list, in list order
  fn list_cards(&self, list: &BoardList) -> ChlogResult<Vec<Card>>;
}

impl<P: BoardProvider + ?Sized> BoardProvider for &P {
  fn list_boards(&self) -> ChlogResult<Vec<Board>> {
    (**self).list_boards()
  }

  fn open_lists(&self, board: &Board) -> ChlogResult<Vec<BoardList>> {
    (**self).open_lists(board)
  }

  fn list_cards(&self, list: &BoardList) -> ChlogResult<Vec<Card>> {
    (**self).list_cards(list)
  }
}
