//! Changelog data model
//!
//! - **document**: `ChangelogDocument`, its JSON form, and the merge operation
//! - **mapper**: board card to `ChangeRecord` conversion

pub mod document;
pub mod mapper;

pub use document::{ChangeRecord, ChangelogDocument, MergeOutcome, VersionEntry};
pub use mapper::CardMapper;
