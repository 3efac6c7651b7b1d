//! EXIF IFD parser
//!
//! Walks the TIFF directory graph of an EXIF APP1 payload and flattens it
//! into an [`ExifValueCollection`]. IFD0 feeds the Image section; the Exif,
//! GPS and Interop directories are reached through their pointer tags.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use log::{debug, info, trace, warn};

use crate::errors::{MetadataError, MetadataResult};
use crate::exif::collection::ExifValueCollection;
use crate::exif::constants::header;
use crate::exif::entry::MetadataEntry;
use crate::exif::ifd::{IFDEntry, IFD};
use crate::exif::types::{MetadataKey, MetadataSection, TagDataType};
use crate::io::buffer_pool::ArrayPool;
use crate::io::byte_order::Endianness;
use crate::io::endian_reader::EndianBinaryReader;
use crate::io::seekable::SeekableReader;

/// Parser for EXIF payloads
pub struct ExifParser<'p> {
    pool: &'p dyn ArrayPool,
}

/// Entries collected so far, one per key
#[derive(Default)]
struct ParseState {
    entries: Vec<MetadataEntry>,
    index: HashMap<MetadataKey, usize>,
    visited: HashSet<u32>,
}

impl ParseState {
    /// Stores an entry, replacing an earlier one with the same key
    fn insert(&mut self, entry: MetadataEntry) {
        let key = entry.key();
        match self.index.get(&key) {
            Some(&i) => {
                debug!("Duplicate {} replaces earlier value", key);
                self.entries[i] = entry;
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }
}

impl<'p> ExifParser<'p> {
    /// Creates a parser renting its scratch buffers from `pool`
    pub fn new(pool: &'p dyn ArrayPool) -> Self {
        ExifParser { pool }
    }

    /// Parses an EXIF payload
    ///
    /// # Arguments
    /// * `bytes` - TIFF data, optionally preceded by the "Exif\0\0" signature
    ///
    /// # Returns
    /// The entries of IFD0 and its sub-IFDs. Truncated data, an unknown byte
    /// order marker or a bad TIFF magic number abort the parse.
    pub fn parse(&self, bytes: &[u8]) -> MetadataResult<ExifValueCollection> {
        let tiff = strip_signature(bytes);
        if tiff.len() < 2 {
            return Err(MetadataError::EndOfStream);
        }

        let endianness = Endianness::detect([tiff[0], tiff[1]])?;
        debug!("EXIF byte order: {}", endianness.name());

        let mut reader = EndianBinaryReader::new(Cursor::new(tiff), endianness, self.pool)?;
        reader.set_position(2)?;

        let magic = reader.read_u16()?;
        if magic != header::TIFF_VERSION {
            return Err(MetadataError::MalformedHeader(format!("unexpected TIFF magic number {}", magic)));
        }

        let ifd0_offset = reader.read_u32()?;
        debug!("IFD0 offset: {}", ifd0_offset);

        let mut state = ParseState::default();
        self.read_directory(&mut reader, MetadataSection::Image, ifd0_offset, &mut state)?;
        reader.into_inner();

        info!("Parsed {} EXIF entries", state.entries.len());
        Ok(ExifValueCollection::new(state.entries))
    }

    /// Reads one directory and everything it points to
    fn read_directory<R: SeekableReader>(
        &self,
        reader: &mut EndianBinaryReader<'_, R>,
        section: MetadataSection,
        offset: u32,
        state: &mut ParseState,
    ) -> MetadataResult<()> {
        if !state.visited.insert(offset) {
            warn!("{} IFD at offset {} was already read, ignoring cyclic pointer", section.group_name(), offset);
            return Ok(());
        }

        reader.set_position(offset as u64)?;
        let entry_count = reader.read_u16()?;

        let mut ifd = IFD::new(section, offset);
        for _ in 0..entry_count {
            ifd.add_entry(IFDEntry::read(reader)?);
        }
        trace!("{}", ifd);

        // Values first, sub-directories afterwards
        let mut sub_directories = Vec::new();
        for entry in &ifd.entries {
            if let Some(sub_section) = MetadataSection::from_pointer_tag(entry.tag) {
                sub_directories.push((sub_section, entry.value_offset));
                continue;
            }

            let Some(data_type) = entry.data_type() else {
                warn!("Skipping tag {:#06x} in {}: unknown field type {}",
                      entry.tag, section.group_name(), entry.field_type);
                continue;
            };

            if data_type == TagDataType::Ifd {
                trace!("Skipping IFD-typed tag {:#06x}", entry.tag);
                continue;
            }

            let data = read_value(reader, entry, data_type)?;
            state.insert(MetadataEntry::new(section, entry.tag, data_type, &data));
        }

        for (sub_section, sub_offset) in sub_directories {
            if sub_offset as u64 >= reader.length() {
                warn!("{} IFD offset {} is outside the {} byte payload, skipping",
                      sub_section.group_name(), sub_offset, reader.length());
                continue;
            }

            debug!("Following {} pointer to offset {}", sub_section.group_name(), sub_offset);
            self.read_directory(reader, sub_section, sub_offset, state)?;
        }

        Ok(())
    }
}

/// Removes a leading APP1 EXIF signature
fn strip_signature(bytes: &[u8]) -> &[u8] {
    if bytes.starts_with(header::EXIF_SIGNATURE) || bytes.starts_with(header::ALTERNATE_EXIF_SIGNATURE) {
        &bytes[header::EXIF_SIGNATURE.len()..]
    } else {
        bytes
    }
}

/// Reads an entry's value and converts it to little-endian order
fn read_value<R: SeekableReader>(
    reader: &mut EndianBinaryReader<'_, R>,
    entry: &IFDEntry,
    data_type: TagDataType,
) -> MetadataResult<Vec<u8>> {
    let size = data_type.size_in_bytes() as u64 * entry.count as u64;

    let mut data = if entry.is_value_inline() {
        // The value field holds the raw bytes in file order
        let raw = match reader.endianness() {
            Endianness::Little => entry.value_offset.to_le_bytes(),
            Endianness::Big => entry.value_offset.to_be_bytes(),
        };
        raw[..size as usize].to_vec()
    } else {
        if entry.value_offset as u64 + size > reader.length() {
            warn!("Value of tag {:#06x} ({} bytes at {}) runs past the end of the payload",
                  entry.tag, size, entry.value_offset);
            return Err(MetadataError::EndOfStream);
        }
        reader.set_position(entry.value_offset as u64)?;
        reader.read_bytes(size as usize)?
    };

    let endianness = reader.endianness();
    for element in data.chunks_exact_mut(data_type.element_size() as usize) {
        endianness.normalize_element(element);
    }

    Ok(data)
}
