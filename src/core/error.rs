//! Error types for chlog with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and provides
//! contextual help messages to users. "Nothing to do" is not an error and never
//! reaches this module; see `commands::sync::SyncOutcome`.

use crate::storage::StoreError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for chlog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid version, missing board or list)
  User = 1,
  /// System error (network, storage, I/O)
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for chlog
#[derive(Debug)]
pub enum ChlogError {
  /// Configuration errors
  Config(ConfigError),

  /// Board or version list lookup failed
  NotFound(NotFoundError),

  /// Requested tag does not look like a version
  InvalidVersion { version: String },

  /// Board provider call failed
  Transport { service: String, message: String },

  /// Object storage call failed (other than a missing object)
  Storage(StoreError),

  /// Publishing the merged document failed
  Upload {
    error: StoreError,
    /// Where the merged document was kept, if it could be
    scratch: Option<PathBuf>,
  },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional help
  Message { message: String, help: Option<String> },
}

impl ChlogError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ChlogError::Message {
      message: msg.into(),
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ChlogError::Message {
      message: msg.into(),
      help: Some(help.into()),
    }
  }

  /// Create a transport error for the named service
  pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
    ChlogError::Transport {
      service: service.into(),
      message: message.into(),
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ChlogError::Config(_) => ExitCode::User,
      ChlogError::NotFound(_) => ExitCode::User,
      ChlogError::InvalidVersion { .. } => ExitCode::User,
      ChlogError::Transport { .. } => ExitCode::System,
      ChlogError::Storage(_) => ExitCode::System,
      ChlogError::Upload { .. } => ExitCode::System,
      ChlogError::Io(_) => ExitCode::System,
      ChlogError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ChlogError::Config(e) => e.help_message(),
      ChlogError::NotFound(e) => e.help_message(),
      ChlogError::InvalidVersion { .. } => {
        Some("Versions look like 'v1.2.0': a leading 'v' followed by dot-separated numbers.".to_string())
      }
      ChlogError::Transport { service, .. } if service == "trello" => {
        Some("Check TRELLO_API_KEY and TRELLO_TOKEN, then rerun.".to_string())
      }
      ChlogError::Upload {
        scratch: Some(path), ..
      } => Some(format!(
        "The merged changelog was kept at {}. Rerun, or upload that file by hand.",
        path.display()
      )),
      ChlogError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ChlogError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ChlogError::Config(e) => write!(f, "{}", e),
      ChlogError::NotFound(e) => write!(f, "{}", e),
      ChlogError::InvalidVersion { version } => write!(f, "Invalid version '{}'", version),
      ChlogError::Transport { service, message } => write!(f, "{} request failed: {}", service, message),
      ChlogError::Storage(e) => write!(f, "Storage error: {}", e),
      ChlogError::Upload { error, .. } => write!(f, "Upload failed: {}", error),
      ChlogError::Io(e) => write!(f, "I/O error: {}", e),
      ChlogError::Message { message, .. } => write!(f, "{}", message),
    }
  }
}

impl std::error::Error for ChlogError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ChlogError::Io(e) => Some(e),
      ChlogError::Storage(e) => Some(e),
      ChlogError::Upload { error, .. } => Some(error),
      _ => None,
    }
  }
}

impl From<io::Error> for ChlogError {
  fn from(err: io::Error) -> Self {
    ChlogError::Io(err)
  }
}

impl From<ConfigError> for ChlogError {
  fn from(err: ConfigError) -> Self {
    ChlogError::Config(err)
  }
}

impl From<NotFoundError> for ChlogError {
  fn from(err: NotFoundError) -> Self {
    ChlogError::NotFound(err)
  }
}

impl From<StoreError> for ChlogError {
  fn from(err: StoreError) -> Self {
    ChlogError::Storage(err)
  }
}

impl From<serde_json::Error> for ChlogError {
  fn from(err: serde_json::Error) -> Self {
    ChlogError::message(format!("JSON error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
  /// One or more required environment variables are unset or empty
  MissingVars { names: Vec<String> },

  /// A variable is set but unusable
  InvalidVar { name: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::MissingVars { .. } => {
        Some("Export the variables above or put them in a .env file in the working directory.".to_string())
      }
      ConfigError::InvalidVar { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::MissingVars { names } => {
        write!(f, "Missing required environment variables: {}", names.join(", "))
      }
      ConfigError::InvalidVar { name, reason } => {
        write!(f, "Invalid value for {}: {}", name, reason)
      }
    }
  }
}

/// Lookup failures on the board provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
  /// No board carries the configured name
  Board { name: String },

  /// The board has no open list with this name
  List { name: String },
}

impl NotFoundError {
  fn help_message(&self) -> Option<String> {
    match self {
      NotFoundError::Board { .. } => {
        Some("Check TRELLO_BOARD_NAME; board names are matched exactly.".to_string())
      }
      NotFoundError::List { .. } => {
        Some("Only open lists are searched. Create or reopen the list on the board.".to_string())
      }
    }
  }
}

impl fmt::Display for NotFoundError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NotFoundError::Board { name } => write!(f, "Board '{}' not found", name),
      NotFoundError::List { name } => write!(f, "'{}' not found", name),
    }
  }
}

/// Result type alias for chlog
pub type ChlogResult<T> = Result<T, ChlogError>;

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ChlogError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
