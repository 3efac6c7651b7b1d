//! Image File Directory (IFD) structures and methods
//!
//! An IFD is an entry count followed by fixed 12-byte entries and a 4-byte
//! offset to the next directory. EXIF uses IFD0 for the Image section and
//! reaches the Exif, GPS and Interop directories through pointer entries.

use std::fmt;
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, trace};

use crate::errors::MetadataResult;
use crate::exif::constants::ifd;
use crate::exif::tag_names;
use crate::exif::types::{MetadataSection, TagDataType};
use crate::io::endian_reader::EndianBinaryReader;
use crate::io::seekable::SeekableReader;

/// Represents an entry in an Image File Directory (IFD)
///
/// `value_offset` holds the value itself when it fits in four bytes,
/// otherwise the offset of the value relative to the TIFF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u32,
    /// Value or offset to values
    pub value_offset: u32,
}

impl IFDEntry {
    /// Size of an entry on disk
    pub const SIZE_OF: u32 = ifd::ENTRY_SIZE;

    pub fn new(tag: u16, field_type: u16, count: u32, value_offset: u32) -> Self {
        IFDEntry {
            tag,
            field_type,
            count,
            value_offset,
        }
    }

    /// Reads one entry at the reader's current position
    pub fn read<R: SeekableReader>(reader: &mut EndianBinaryReader<'_, R>) -> MetadataResult<Self> {
        let tag = reader.read_u16()?;
        let field_type = reader.read_u16()?;
        let count = reader.read_u32()?;
        let value_offset = reader.read_u32()?;

        Ok(IFDEntry::new(tag, field_type, count, value_offset))
    }

    /// Writes the entry in little-endian order
    pub fn write<W: Write>(&self, writer: &mut W) -> MetadataResult<()> {
        writer.write_u16::<LittleEndian>(self.tag)?;
        writer.write_u16::<LittleEndian>(self.field_type)?;
        writer.write_u32::<LittleEndian>(self.count)?;
        writer.write_u32::<LittleEndian>(self.value_offset)?;
        Ok(())
    }

    /// The field type, if it is one this codec understands
    pub fn data_type(&self) -> Option<TagDataType> {
        TagDataType::try_from(self.field_type).ok()
    }

    /// Total value size in bytes, or `None` for unknown field types
    pub fn value_size(&self) -> Option<u64> {
        self.data_type()
            .map(|data_type| data_type.size_in_bytes() as u64 * self.count as u64)
    }

    /// Determines if the value is stored inline in value_offset
    pub fn is_value_inline(&self) -> bool {
        let inline = matches!(self.value_size(), Some(size) if size <= ifd::INLINE_VALUE_SIZE as u64);

        trace!("Tag {:#06x} ({}) value {} inline",
               self.tag, tag_names::get_tag_name_any(self.tag), if inline { "is" } else { "not" });

        inline
    }

    /// Returns a human-readable description of this entry
    pub fn description(&self) -> String {
        let field_type_name = self.data_type().map(|t| t.name()).unwrap_or("UNKNOWN");

        format!("Tag: {:#06x} ({}), Type: {} ({}), Count: {}, Value/Offset: {}",
                self.tag, tag_names::get_tag_name_any(self.tag),
                self.field_type, field_type_name, self.count, self.value_offset)
    }
}

/// Represents an Image File Directory (IFD)
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// Section the directory's tags belong to
    pub section: MetadataSection,
    /// Offset of this IFD relative to the TIFF header
    pub offset: u32,
}

impl IFD {
    pub fn new(section: MetadataSection, offset: u32) -> Self {
        debug!("Creating new {} IFD at offset {}", section.group_name(), offset);

        IFD {
            entries: Vec::new(),
            section,
            offset,
        }
    }

    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("Adding entry to {} IFD: {}", self.section.group_name(), entry.description());
        self.entries.push(entry);
    }

    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.entries.iter().find(|entry| entry.tag == tag)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Size of the directory on disk, excluding out-of-line values
    pub fn byte_size(&self) -> u32 {
        Self::size_for(self.entries.len())
    }

    /// Size of a directory with `entry_count` entries
    pub fn size_for(entry_count: usize) -> u32 {
        ifd::COUNT_SIZE + ifd::ENTRY_SIZE * entry_count as u32 + ifd::NEXT_OFFSET_SIZE
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (offset: {})", self.section.group_name(), self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;
        for entry in &self.entries {
            writeln!(f, "    {}", entry.description())?;
        }
        Ok(())
    }
}
