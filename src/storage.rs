use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StorageError(pub String);

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for StorageError {}

/// Write side of a key/value store the form hands the account token to.
pub trait SetStorage: Send + Sync + 'static {
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    state: Arc<RwLock<BTreeMap<String, String>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let state = match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.get(key).cloned()
    }
}

impl SetStorage for InMemoryStorage {
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
