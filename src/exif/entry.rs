//! Metadata entry value type

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::exif::types::{MetadataKey, MetadataSection, TagDataType};

/// One EXIF tag with its typed payload
///
/// The payload is an owned copy in little-endian byte order. Two entries are
/// equal when their keys are equal, regardless of payload.
#[derive(Clone)]
pub struct MetadataEntry {
    section: MetadataSection,
    tag_id: u16,
    data_type: TagDataType,
    data: Box<[u8]>,
}

impl MetadataEntry {
    /// Creates an entry holding a copy of `data`
    pub fn new(section: MetadataSection, tag_id: u16, data_type: TagDataType, data: &[u8]) -> Self {
        MetadataEntry {
            section,
            tag_id,
            data_type,
            data: data.into(),
        }
    }

    pub fn from_key(key: MetadataKey, data_type: TagDataType, data: &[u8]) -> Self {
        Self::new(key.section, key.tag_id, data_type, data)
    }

    pub fn key(&self) -> MetadataKey {
        MetadataKey::new(self.section, self.tag_id)
    }

    pub fn section(&self) -> MetadataSection {
        self.section
    }

    pub fn tag_id(&self) -> u16 {
        self.tag_id
    }

    pub fn data_type(&self) -> TagDataType {
        self.data_type
    }

    /// Payload bytes (little-endian)
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Length of the payload in bytes
    pub fn len_in_bytes(&self) -> usize {
        self.data.len()
    }

    /// Number of values implied by the payload length
    ///
    /// Returns `None` if the payload is not a whole number of values.
    pub fn count(&self) -> Option<u32> {
        let size = self.data_type.size_in_bytes() as usize;
        if self.data.len() % size != 0 {
            return None;
        }
        u32::try_from(self.data.len() / size).ok()
    }
}

impl PartialEq for MetadataEntry {
    fn eq(&self, other: &Self) -> bool {
        self.section == other.section && self.tag_id == other.tag_id
    }
}

impl Eq for MetadataEntry {}

impl Hash for MetadataEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for MetadataEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Tag# {} (0x{:X}), {}, {} bytes",
               self.section, self.tag_id, self.tag_id, self.data_type.name(), self.data.len())
    }
}
