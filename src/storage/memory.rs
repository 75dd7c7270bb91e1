use super::{ObjectStore, StoreError, StoreErrorCode};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// A stored object with its declared content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
  pub bytes: Vec<u8>,
  pub content_type: String,
}

/// In-process object store
///
/// The storage double in tests. Single-threaded by
/// construction, like the rest of a sync run.
#[derive(Debug, Default)]
pub struct MemoryStore {
  objects: RefCell<BTreeMap<String, StoredObject>>,
  puts: Cell<usize>,
  fail_puts: Cell<bool>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed an object without counting it as a put
  pub fn with_object(self, key: impl Into<String>, bytes: impl Into<Vec<u8>>, content_type: &str) -> Self {
    self.objects.borrow_mut().insert(
      key.into(),
      StoredObject {
        bytes: bytes.into(),
        content_type: content_type.to_string(),
      },
    );
    self
  }

  /// Make every subsequent put fail with a network error
  pub fn fail_puts(&self, fail: bool) {
    self.fail_puts.set(fail);
  }

  pub fn object(&self, key: &str) -> Option<StoredObject> {
    self.objects.borrow().get(key).cloned()
  }

  /// Number of successful puts since construction
  pub fn put_count(&self) -> usize {
    self.puts.get()
  }
}

impl ObjectStore for MemoryStore {
  fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
    self
      .objects
      .borrow()
      .get(key)
      .map(|o| o.bytes.clone())
      .ok_or_else(|| StoreError::new(StoreErrorCode::NotFound, format!("object '{}' not found", key)))
  }

  fn put_object(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
    if self.fail_puts.get() {
      return Err(StoreError::new(StoreErrorCode::Network, "simulated upload failure"));
    }
    self.objects.borrow_mut().insert(
      key.to_string(),
      StoredObject {
        bytes: bytes.to_vec(),
        content_type: content_type.to_string(),
      },
    );
    self.puts.set(self.puts.get() + 1);
    Ok(())
  }

  fn describe(&self, key: &str) -> String {
    format!("memory://{}", key)
  }
}
