use crate::core::error::{ChlogResult, ConfigError};

/// Default app labels recognized on cards
pub const DEFAULT_APP_LABELS: &str = "Collect App, API, Summary API";

/// Default labels that mark a card as a bug fix
pub const DEFAULT_BUG_LABELS: &str = "Bug, Hotfix";

/// Default object key of the changelog document
pub const DEFAULT_CHANGELOG_FILE: &str = "changelog.json";

/// Default AWS region when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Configuration for a chlog run
///
/// Sourced once from the environment at startup. Every required variable is checked
/// before any network call so a misconfigured run fails with the full list of gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChlogConfig {
  pub trello: TrelloConfig,
  pub storage: StorageConfig,
  pub labels: LabelConfig,
}

/// Board provider credentials and target board
#[derive(Clone, PartialEq, Eq)]
pub struct TrelloConfig {
  pub board_name: String,
  pub api_key: String,
  pub token: String,
}

/// Object storage location and credentials
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConfig {
  pub bucket: String,
  /// Object key of the changelog document
  pub changelog_key: String,
  pub region: String,
  /// Custom S3-compatible endpoint (default: regional AWS endpoint)
  pub endpoint: Option<String>,
  pub access_key_id: String,
  pub secret_access_key: String,
  pub session_token: Option<String>,
}

/// Label allow-lists used by the card mapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelConfig {
  pub app_labels: Vec<String>,
  pub bug_labels: Vec<String>,
}

// Secrets stay out of debug output and logs.
impl std::fmt::Debug for TrelloConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TrelloConfig")
      .field("board_name", &self.board_name)
      .field("api_key", &"<redacted>")
      .field("token", &"<redacted>")
      .finish()
  }
}

impl std::fmt::Debug for StorageConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StorageConfig")
      .field("bucket", &self.bucket)
      .field("changelog_key", &self.changelog_key)
      .field("region", &self.region)
      .field("endpoint", &self.endpoint)
      .field("access_key_id", &self.access_key_id)
      .field("secret_access_key", &"<redacted>")
      .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}

impl ChlogConfig {
  /// Load configuration from the process environment
  ///
  /// A `.env` file in the working directory is read first if one exists; variables
  /// already set in the environment win.
  pub fn from_env() -> ChlogResult<Self> {
    if let Ok(path) = dotenvy::dotenv() {
      tracing::debug!(path = %path.display(), "loaded .env file");
    }
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Build configuration from an arbitrary variable lookup
  pub fn from_lookup<F>(lookup: F) -> ChlogResult<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let mut missing = Vec::new();
    let mut require = |name: &str| match get(name) {
      Some(value) => value,
      None => {
        missing.push(name.to_string());
        String::new()
      }
    };

    let board_name = require("TRELLO_BOARD_NAME");
    let api_key = require("TRELLO_API_KEY");
    let token = require("TRELLO_TOKEN");
    let bucket = require("AWS_CHANGELOG_BUCKET");
    let access_key_id = require("AWS_ACCESS_KEY_ID");
    let secret_access_key = require("AWS_SECRET_ACCESS_KEY");

    if !missing.is_empty() {
      return Err(ConfigError::MissingVars { names: missing }.into());
    }

    let region = get("AWS_REGION")
      .or_else(|| get("AWS_DEFAULT_REGION"))
      .unwrap_or_else(|| DEFAULT_REGION.to_string());

    let endpoint = get("AWS_ENDPOINT_URL").map(|e| e.trim_end_matches('/').to_string());
    if let Some(ref endpoint) = endpoint
      && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
      return Err(
        ConfigError::InvalidVar {
          name: "AWS_ENDPOINT_URL".to_string(),
          reason: format!("'{}' must start with http:// or https://", endpoint),
        }
        .into(),
      );
    }

    let changelog_key = get("CHANGELOG_FILE").unwrap_or_else(|| DEFAULT_CHANGELOG_FILE.to_string());

    Ok(Self {
      trello: TrelloConfig {
        board_name,
        api_key,
        token,
      },
      storage: StorageConfig {
        bucket,
        changelog_key,
        region,
        endpoint,
        access_key_id,
        secret_access_key,
        session_token: get("AWS_SESSION_TOKEN"),
      },
      labels: LabelConfig {
        app_labels: split_list(&get("APP_LABELS").unwrap_or_else(|| DEFAULT_APP_LABELS.to_string())),
        bug_labels: split_list(&get("BUG_LABELS").unwrap_or_else(|| DEFAULT_BUG_LABELS.to_string())),
      },
    })
  }
}

/// Split a comma-separated list, trimming each item and dropping empties
pub fn split_list(value: &str) -> Vec<String> {
  value
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(String::from)
    .collect()
}
