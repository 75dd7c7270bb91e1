//! Object storage for the changelog document
//!
//! - **s3**: S3 (or S3-compatible) backend over blocking HTTP
//! - **sigv4**: AWS Signature Version 4 request signing
//! - **memory**: in-process store used as a test double

pub mod memory;
pub mod s3;
pub mod sigv4;

use std::fmt::{Display, Formatter};

pub use memory::MemoryStore;
pub use s3::S3Store;

/// Content type declared for the uploaded changelog
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorCode {
  NotFound,
  Denied,
  Network,
  Internal,
}

impl StoreErrorCode {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::NotFound => "not_found",
      Self::Denied => "access_denied",
      Self::Network => "network_error",
      Self::Internal => "internal_error",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
  pub code: StoreErrorCode,
  pub message: String,
}

impl StoreError {
  #[must_use]
  pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
    Self {
      code,
      message: message.into(),
    }
  }

  pub fn is_not_found(&self) -> bool {
    self.code == StoreErrorCode::NotFound
  }
}

impl Display for StoreError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: {}", self.code.as_str(), self.message)
  }
}

impl std::error::Error for StoreError {}

/// Key/value object storage scoped to one bucket
pub trait ObjectStore {
  /// Fetch an object; a missing key is `StoreErrorCode::NotFound`
  fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError>;

  /// Create or overwrite an object
  fn put_object(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError>;

  /// Human-readable location of a key, for messages
  fn describe(&self, key: &str) -> String {
    key.to_string()
  }
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
  fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
    (**self).get_object(key)
  }

  fn put_object(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
    (**self).put_object(key, bytes, content_type)
  }

  fn describe(&self, key: &str) -> String {
    (**self).describe(key)
  }
}
