//! Trello REST client
//!
//! Authenticates every request with the `key`/`token` query pair. Calls are blocking
//! and issued one at a time; there is no retry.

use super::{Board, BoardList, BoardProvider, Card};
use crate::core::config::TrelloConfig;
use crate::core::error::{ChlogError, ChlogResult};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

/// Public Trello API root
pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

const SERVICE: &str = "trello";

pub struct TrelloClient {
  base_url: String,
  api_key: String,
  token: String,
  client: Client,
}

impl TrelloClient {
  pub fn new(api_key: impl Into<String>, token: impl Into<String>) -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      api_key: api_key.into(),
      token: token.into(),
      client: Client::new(),
    }
  }

  pub fn from_config(config: &TrelloConfig) -> Self {
    Self::new(&config.api_key, &config.token)
  }

  /// Point the client at another API root (self-hosted proxies, tests)
  #[must_use]
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into().trim_end_matches('/').to_string();
    self
  }

  fn endpoint(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path.trim_start_matches('/'))
  }

  fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> ChlogResult<T> {
    let url = self.endpoint(path);
    tracing::debug!(%url, "trello GET");

    let resp = self
      .client
      .get(&url)
      .query(&[("key", self.api_key.as_str()), ("token", self.token.as_str())])
      .query(query)
      .send()
      .map_err(|e| ChlogError::transport(SERVICE, strip_credentials(&e.to_string())))?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().unwrap_or_default();
      return Err(ChlogError::transport(
        SERVICE,
        format!("GET {} returned {}: {}", path, status, body.trim()),
      ));
    }

    resp
      .json::<T>()
      .map_err(|e| ChlogError::transport(SERVICE, format!("invalid response from {}: {}", path, e)))
  }
}

impl BoardProvider for TrelloClient {
  fn list_boards(&self) -> ChlogResult<Vec<Board>> {
    self.get_json("members/me/boards", &[("fields", "name")])
  }

  fn open_lists(&self, board: &Board) -> ChlogResult<Vec<BoardList>> {
    self.get_json(
      &format!("boards/{}/lists", board.id),
      &[("filter", "open"), ("fields", "name")],
    )
  }

  fn list_cards(&self, list: &BoardList) -> ChlogResult<Vec<Card>> {
    self.get_json(&format!("lists/{}/cards", list.id), &[("fields", "name,url,labels")])
  }
}

/// reqwest errors echo the full request URL, which carries the API token
fn strip_credentials(message: &str) -> String {
  match message.find('?') {
    Some(start) => {
      let end = message[start..].find([' ', ')']).map(|i| start + i).unwrap_or(message.len());
      format!("{}{}", &message[..start], &message[end..])
    }
    None => message.to_string(),
  }
}
