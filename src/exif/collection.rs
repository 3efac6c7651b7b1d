//! Ordered collection of parsed EXIF entries

use std::collections::HashMap;

use log::trace;

use crate::exif::entry::MetadataEntry;
use crate::exif::types::MetadataKey;

/// Ordered sequence of metadata entries, one per key in practice
///
/// Lookups and removals match on key; removal drops every entry with that
/// key.
#[derive(Debug, Clone, Default)]
pub struct ExifValueCollection {
    entries: Vec<MetadataEntry>,
}

impl ExifValueCollection {
    pub fn new(entries: Vec<MetadataEntry>) -> Self {
        ExifValueCollection { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry with the given key
    pub fn get(&self, key: MetadataKey) -> Option<&MetadataEntry> {
        self.entries.iter().find(|entry| entry.key() == key)
    }

    /// Removes every entry with `key`, returning the first one found
    pub fn get_and_remove_value(&mut self, key: MetadataKey) -> Option<MetadataEntry> {
        let index = self.entries.iter().position(|entry| entry.key() == key)?;
        let value = self.entries.remove(index);
        self.remove(key);

        trace!("Removed {} from EXIF collection", key);
        Some(value)
    }

    /// Removes every entry with `key`
    pub fn remove(&mut self, key: MetadataKey) {
        self.entries.retain(|entry| entry.key() != key);
    }

    pub fn push(&mut self, entry: MetadataEntry) {
        self.entries.push(entry);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetadataEntry> {
        self.entries.iter()
    }

    /// Converts into a key map for the writer; the first entry per key wins
    pub fn into_map(self) -> HashMap<MetadataKey, MetadataEntry> {
        let mut map = HashMap::with_capacity(self.entries.len());
        for entry in self.entries {
            map.entry(entry.key()).or_insert(entry);
        }
        map
    }
}

impl IntoIterator for ExifValueCollection {
    type Item = MetadataEntry;
    type IntoIter = std::vec::IntoIter<MetadataEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ExifValueCollection {
    type Item = &'a MetadataEntry;
    type IntoIter = std::slice::Iter<'a, MetadataEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<MetadataEntry> for ExifValueCollection {
    fn from_iter<T: IntoIterator<Item = MetadataEntry>>(iter: T) -> Self {
        ExifValueCollection::new(iter.into_iter().collect())
    }
}
