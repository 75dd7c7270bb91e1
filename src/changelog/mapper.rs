use super::document::ChangeRecord;
use crate::board::Card;
use crate::core::config::LabelConfig;
use std::collections::HashSet;

/// Turns board cards into changelog records
#[derive(Debug, Clone, Default)]
pub struct CardMapper {
  app_labels: HashSet<String>,
  bug_labels: HashSet<String>,
}

impl CardMapper {
  pub fn new<A, B>(app_labels: A, bug_labels: B) -> Self
  where
    A: IntoIterator,
    A::Item: Into<String>,
    B: IntoIterator,
    B::Item: Into<String>,
  {
    Self {
      app_labels: app_labels.into_iter().map(Into::into).collect(),
      bug_labels: bug_labels.into_iter().map(Into::into).collect(),
    }
  }

  pub fn from_config(config: &LabelConfig) -> Self {
    Self::new(config.app_labels.iter().cloned(), config.bug_labels.iter().cloned())
  }

  pub fn map(&self, card: &Card) -> ChangeRecord {
    ChangeRecord {
      title: card.name.clone(),
      url: card.url.clone(),
      apps: self.apps(card),
      number: card_number(&card.url).to_string(),
      is_bug: self.is_bug(card),
      extra: Default::default(),
    }
  }

  fn apps(&self, card: &Card) -> Vec<String> {
    card
      .labels
      .iter()
      .filter(|l| self.app_labels.contains(&l.name))
      .map(|l| l.name.clone())
      .collect()
  }

  fn is_bug(&self, card: &Card) -> bool {
    card.labels.iter().any(|l| self.bug_labels.contains(&l.name))
  }
}

/// Ticket number from a card URL: `.../<number>-<slug>` gives `<number>`
///
/// Not validated. A URL of another shape yields whatever precedes the first
/// hyphen of its last segment.
pub fn card_number(url: &str) -> &str {
  let last = url.rsplit('/').next().unwrap_or(url);
  last.split('-').next().unwrap_or(last)
}
