//! EXIF IFD writer
//!
//! Serializes a flat set of metadata entries into a little-endian TIFF
//! structure: header, IFD0, then the Exif, GPS and Interop directories that
//! have entries, followed by one contiguous area for values larger than
//! four bytes. Offsets are relative to the start of the TIFF header.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, info, warn};

use crate::errors::{MetadataError, MetadataResult};
use crate::exif::constants::{field_types, header, ifd, limits};
use crate::exif::entry::MetadataEntry;
use crate::exif::helpers;
use crate::exif::ifd::{IFDEntry, IFD};
use crate::exif::types::{keys, ExifColorSpace, MetadataKey, MetadataSection, TagDataType};

/// Builds EXIF APP1 payloads from metadata entries
#[derive(Debug)]
pub struct ExifWriter {
    /// Entries per section, sorted by tag
    sections: BTreeMap<MetadataSection, Vec<MetadataEntry>>,
}

impl ExifWriter {
    /// Creates a writer for `entries`
    ///
    /// Sub-IFD pointer tags and IFD-typed entries are dropped; the writer
    /// creates its own pointers. When `color_space` is given it replaces the
    /// Exif ColorSpace entry.
    pub fn new(mut entries: HashMap<MetadataKey, MetadataEntry>, color_space: Option<ExifColorSpace>) -> Self {
        if let Some(color_space) = color_space {
            debug!("Setting EXIF color space to {:?}", color_space);
            let value = helpers::encode_short(color_space as u16);
            entries.insert(keys::COLOR_SPACE, MetadataEntry::from_key(keys::COLOR_SPACE, TagDataType::Short, &value));
        }

        let mut sections: BTreeMap<MetadataSection, Vec<MetadataEntry>> = BTreeMap::new();
        for (key, entry) in entries {
            if MetadataSection::from_pointer_tag(key.tag_id).is_some() || entry.data_type() == TagDataType::Ifd {
                debug!("Dropping pointer entry {}", key);
                continue;
            }
            sections.entry(key.section).or_default().push(entry);
        }

        for section_entries in sections.values_mut() {
            section_entries.sort_by_key(|entry| entry.tag_id());
        }

        ExifWriter { sections }
    }

    /// Number of entries that will be written, pointers excluded
    pub fn entry_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    /// Serializes the entries as TIFF data without the APP1 signature
    pub fn write_tiff(&self) -> MetadataResult<Vec<u8>> {
        let layout = self.present_sections();
        let (ifd_offsets, value_area_start) = self.calculate_ifd_offsets(&layout);
        let ifds = self.build_ifds(&layout, &ifd_offsets, value_area_start)?;

        let mut output = Vec::new();
        Self::write_header(&mut output, header::TIFF_HEADER_SIZE)?;
        Self::write_ifds(&mut output, &ifds)?;
        self.write_external_data(&mut output, &layout)?;

        info!("Wrote {} EXIF entries in {} IFDs ({} bytes)", self.entry_count(), ifds.len(), output.len());
        Ok(output)
    }

    /// Serializes the entries as a complete APP1 segment body
    pub fn create_exif_app1_payload(&self) -> MetadataResult<Vec<u8>> {
        let tiff = self.write_tiff()?;

        let mut payload = Vec::with_capacity(header::EXIF_SIGNATURE.len() + tiff.len());
        payload.extend_from_slice(header::EXIF_SIGNATURE);
        payload.extend_from_slice(&tiff);

        if payload.len() > limits::MAX_SEGMENT_PAYLOAD {
            warn!("EXIF payload of {} bytes exceeds the {} byte segment limit",
                  payload.len(), limits::MAX_SEGMENT_PAYLOAD);
        }

        Ok(payload)
    }

    /// Sections that get a directory, in file order
    ///
    /// IFD0 is always written; an Interop directory needs an Exif directory
    /// to hold its pointer.
    fn present_sections(&self) -> Vec<MetadataSection> {
        let has = |section: MetadataSection| self.sections.get(&section).map_or(false, |e| !e.is_empty());

        MetadataSection::ALL
            .into_iter()
            .filter(|section| match section {
                MetadataSection::Image => true,
                MetadataSection::Exif => has(MetadataSection::Exif) || has(MetadataSection::Interop),
                MetadataSection::Gps | MetadataSection::Interop => has(*section),
            })
            .collect()
    }

    /// Sub-directories whose pointer lives in `section`
    fn children(section: MetadataSection, layout: &[MetadataSection]) -> Vec<MetadataSection> {
        let candidates: &[MetadataSection] = match section {
            MetadataSection::Image => &[MetadataSection::Exif, MetadataSection::Gps],
            MetadataSection::Exif => &[MetadataSection::Interop],
            MetadataSection::Gps | MetadataSection::Interop => &[],
        };
        candidates.iter().copied().filter(|child| layout.contains(child)).collect()
    }

    fn section_entries(&self, section: MetadataSection) -> &[MetadataEntry] {
        self.sections.get(&section).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries in a directory, pointers included
    fn directory_len(&self, section: MetadataSection, layout: &[MetadataSection]) -> usize {
        self.section_entries(section).len() + Self::children(section, layout).len()
    }

    /// Calculate the offset of each directory and where the value area starts
    fn calculate_ifd_offsets(&self, layout: &[MetadataSection]) -> (HashMap<MetadataSection, u32>, u32) {
        let mut current_offset = header::TIFF_HEADER_SIZE;
        let mut offsets = HashMap::new();

        for section in layout {
            offsets.insert(*section, current_offset);
            current_offset += IFD::size_for(self.directory_len(*section, layout));
        }

        (offsets, current_offset)
    }

    /// Builds directories with resolved value and pointer offsets
    fn build_ifds(
        &self,
        layout: &[MetadataSection],
        ifd_offsets: &HashMap<MetadataSection, u32>,
        value_area_start: u32,
    ) -> MetadataResult<Vec<IFD>> {
        let mut value_offset = value_area_start as u64;
        let mut ifds = Vec::with_capacity(layout.len());

        for section in layout {
            if self.directory_len(*section, layout) > u16::MAX as usize {
                return Err(MetadataError::InvalidEntry(format!(
                    "too many entries in the {} directory", section.group_name()
                )));
            }

            let mut directory = IFD::new(*section, ifd_offsets.get(section).copied().unwrap_or(0));

            for entry in self.section_entries(*section) {
                let count = entry.count().ok_or_else(|| {
                    MetadataError::InvalidEntry(format!(
                        "{}: {} bytes is not a whole number of {} values",
                        entry.key(), entry.len_in_bytes(), entry.data_type().name()
                    ))
                })?;

                let data = entry.data();
                let field = if data.len() <= ifd::INLINE_VALUE_SIZE as usize {
                    let mut inline = [0u8; 4];
                    inline[..data.len()].copy_from_slice(data);
                    u32::from_le_bytes(inline)
                } else {
                    let offset = u32::try_from(value_offset).map_err(|_| {
                        MetadataError::InvalidEntry(format!("{} does not fit in a TIFF structure", entry.key()))
                    })?;
                    value_offset += padded_len(data.len()) as u64;
                    offset
                };

                directory.add_entry(IFDEntry::new(entry.tag_id(), entry.data_type().code(), count, field));
            }

            for child in Self::children(*section, layout) {
                let (Some(tag), Some(offset)) = (child.pointer_tag(), ifd_offsets.get(&child)) else {
                    continue;
                };
                directory.add_entry(IFDEntry::new(tag, field_types::LONG, 1, *offset));
            }

            directory.entries.sort_by_key(|entry| entry.tag);
            ifds.push(directory);
        }

        if value_offset > u32::MAX as u64 {
            return Err(MetadataError::InvalidEntry("EXIF data exceeds 4 GiB".to_string()));
        }

        Ok(ifds)
    }

    /// Write the TIFF header (always little-endian)
    fn write_header(writer: &mut impl Write, first_ifd_offset: u32) -> MetadataResult<()> {
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;
        writer.write_u16::<LittleEndian>(header::TIFF_VERSION)?;
        writer.write_u32::<LittleEndian>(first_ifd_offset)?;
        Ok(())
    }

    /// Write all directories back to back
    ///
    /// The directories are not chained: IFD1 is never written, so every
    /// next-IFD offset is 0.
    fn write_ifds(writer: &mut impl Write, ifds: &[IFD]) -> MetadataResult<()> {
        for directory in ifds {
            writer.write_u16::<LittleEndian>(directory.entry_count() as u16)?;
            for entry in &directory.entries {
                entry.write(writer)?;
            }
            writer.write_u32::<LittleEndian>(0)?;
        }
        Ok(())
    }

    /// Write the out-of-line values in directory order, padded to even offsets
    fn write_external_data(&self, writer: &mut impl Write, layout: &[MetadataSection]) -> MetadataResult<()> {
        for section in layout {
            for entry in self.section_entries(*section) {
                let data = entry.data();
                if data.len() > ifd::INLINE_VALUE_SIZE as usize {
                    writer.write_all(data)?;
                    if data.len() % 2 != 0 {
                        writer.write_u8(0)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn padded_len(len: usize) -> usize {
    len + (len & 1)
}
