use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Current text of every form field.
///
/// Cloning is cheap and edits never mutate a shared map: `with` hands back a
/// new map, so a snapshot keeps the values it was taken with.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldValues {
    entries: Arc<BTreeMap<FieldKey, String>>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty_for(keys: &[FieldKey]) -> Self {
        Self::from_pairs(keys.iter().map(|key| (*key, String::new())))
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (FieldKey, S)>,
        S: Into<String>,
    {
        Self {
            entries: Arc::new(
                pairs
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }

    /// Value of `key`, or `""` when the field is unknown.
    pub fn get(&self, key: FieldKey) -> &str {
        self.entries.get(&key).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn with(&self, key: FieldKey, value: impl Into<String>) -> Self {
        let mut entries = BTreeMap::clone(&self.entries);
        entries.insert(key, value.into());
        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> + '_ {
        self.entries
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}
