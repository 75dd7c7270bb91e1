//! Keep a JSON release changelog in object storage in sync with version-named lists
//! on a Trello board.
//!
//! Each open list named like `v1.4.0` is a release; its cards are the changes. A sync
//! reads the cards, maps them into [`changelog::ChangeRecord`]s and merges one entry
//! per version into the stored [`changelog::ChangelogDocument`].

pub mod board;
pub mod changelog;
pub mod commands;
pub mod core;
pub mod release;
pub mod storage;
