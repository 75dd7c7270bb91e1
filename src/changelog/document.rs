//! The persisted changelog document and its merge operation
//!
//! On the wire the document is a flat JSON array, newest-touched version first:
//!
//! ```json
//! [
//!   {
//!     "version": "v1.2.0",
//!     "release_date": "2025-01-15",
//!     "changes": [
//!       {"name": "Fix login", "url": "https://trello.com/c/abc/42-fix-login",
//!        "apps": ["API"], "number": "42", "is_bug": true}
//!     ]
//!   }
//! ]
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One board card rendered into changelog form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
  /// Card title
  #[serde(rename = "name")]
  pub title: String,
  pub url: String,
  /// Recognized application labels, in card label order
  #[serde(default)]
  pub apps: Vec<String>,
  /// Ticket number taken from the card URL
  #[serde(default)]
  pub number: String,
  #[serde(default)]
  pub is_bug: bool,
  /// Fields this tool does not write, kept as stored
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// One version's changelog record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
  pub version: String,
  /// ISO date of the first time this version was written
  ///
  /// `None` when the key is absent, `Some(None)` when it is stored as `null`.
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub release_date: Option<Option<String>>,
  #[serde(default)]
  pub changes: Vec<ChangeRecord>,
  /// Fields this tool does not write, kept as stored
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl VersionEntry {
  pub fn new(version: impl Into<String>, release_date: Option<String>, changes: Vec<ChangeRecord>) -> Self {
    Self {
      version: version.into(),
      release_date: release_date.map(Some),
      changes,
      extra: Map::new(),
    }
  }

  /// The recorded date, if there is one
  pub fn date(&self) -> Option<&str> {
    self.release_date.as_ref().and_then(|d| d.as_deref())
  }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  T::deserialize(deserializer).map(Some)
}

/// Where a merge put its entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
  /// New version, now at index 0
  Inserted,
  /// Existing version replaced at its previous index
  Replaced { index: usize },
}

impl MergeOutcome {
  pub fn is_insert(self) -> bool {
    matches!(self, MergeOutcome::Inserted)
  }
}

/// Ordered sequence of version entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangelogDocument {
  entries: Vec<VersionEntry>,
}

impl ChangelogDocument {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_entries(entries: Vec<VersionEntry>) -> Self {
    Self { entries }
  }

  /// Parse a stored document; empty input is an empty document
  pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
      return Ok(Self::new());
    }
    serde_json::from_slice(bytes)
  }

  pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(self)
  }

  pub fn entries(&self) -> &[VersionEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Index of the entry for `version`
  pub fn position(&self, version: &str) -> Option<usize> {
    self.entries.iter().position(|e| e.version == version)
  }

  pub fn get(&self, version: &str) -> Option<&VersionEntry> {
    self.position(version).map(|i| &self.entries[i])
  }

  /// Previously recorded release date of `version`
  pub fn release_date(&self, version: &str) -> Option<&str> {
    self.get(version).and_then(VersionEntry::date)
  }

  /// Insert or replace the entry for `version`
  ///
  /// A new version goes to the front. An existing one keeps its index and is
  /// rebuilt from `changes`; when `release_date` is `None` the recorded date is kept.
  /// Other entries are left exactly as they were read.
  pub fn merge(&mut self, version: &str, changes: Vec<ChangeRecord>, release_date: Option<String>) -> MergeOutcome {
    match self.position(version) {
      None => {
        self.entries.insert(0, VersionEntry::new(version, release_date, changes));
        MergeOutcome::Inserted
      }
      Some(index) => {
        let mut entry = VersionEntry::new(version, None, changes);
        entry.release_date = release_date.map(Some).or_else(|| self.entries[index].release_date.take());
        self.entries[index] = entry;
        MergeOutcome::Replaced { index }
      }
    }
  }
}
