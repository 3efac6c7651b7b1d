use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};

use log::info;

use crate::errors::{MetadataError, MetadataResult};
use crate::exif::{helpers, tag_names, MetadataEntry, MetadataSection};
use crate::io::buffer_pool::RecyclingPool;
use crate::jpeg::JpegSegmentCodec;
use crate::pipeline::{self, LoadedImage};
use crate::utils::config::ToolConfig;

/// Buffers kept around between chunk and reader rentals
const RETAINED_BUFFERS: usize = 8;

/// Main interface to the jpegmeta library
pub struct JpegMeta {
    config: ToolConfig,
    codec: JpegSegmentCodec,
    pool: RecyclingPool,
}

impl JpegMeta {
    /// Create a new JpegMeta instance
    ///
    /// # Arguments
    /// * `config` - Encoder settings and EXIF keys to strip when saving
    pub fn new(config: ToolConfig) -> Self {
        JpegMeta {
            config,
            codec: JpegSegmentCodec::new(),
            pool: RecyclingPool::new(RETAINED_BUFFERS),
        }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Load a JPEG file and assemble its metadata
    pub fn load(&self, input_path: &str) -> MetadataResult<LoadedImage> {
        let mut reader = BufReader::new(File::open(input_path)?);
        pipeline::load(&self.codec, &mut reader, &self.pool)
    }

    /// Analyze the metadata of a JPEG file
    ///
    /// # Arguments
    /// * `input_path` - Path to the JPEG file to analyze
    ///
    /// # Returns
    /// String containing the analysis or an error
    pub fn analyze(&self, input_path: &str) -> MetadataResult<String> {
        let image = self.load(input_path)?;
        Ok(describe(&image))
    }

    /// Write the XMP packet of a JPEG file, merged with its extended packet
    ///
    /// # Returns
    /// Number of bytes written, or an error if the file has no XMP
    pub fn extract_xmp(&self, input_path: &str, output_path: &str) -> MetadataResult<usize> {
        let image = self.load(input_path)?;
        let packet = image.xmp
            .ok_or_else(|| MetadataError::Generic(format!("{} contains no XMP packet", input_path)))?;

        fs::write(output_path, &packet)?;
        info!("Wrote {} byte XMP packet to {}", packet.len(), output_path);
        Ok(packet.len())
    }

    /// Rewrite a JPEG file with a replacement XMP packet
    ///
    /// EXIF entries are re-serialized without the configured strip keys and
    /// the ICC profile is carried over. Oversized packets are written as
    /// Extended XMP.
    ///
    /// # Arguments
    /// * `input_path` - Path to the source JPEG
    /// * `xmp_path` - Path to the XMP packet to embed
    /// * `output_path` - Path where to save the new JPEG
    pub fn embed_xmp(&self, input_path: &str, xmp_path: &str, output_path: &str) -> MetadataResult<()> {
        let image = self.load(input_path)?;
        let packet = fs::read(xmp_path)?;

        let mut entries = image.entries_with_orientation();
        for key in &self.config.strip {
            if entries.remove(key).is_some() {
                info!("Stripped {}", key);
            }
        }

        let mut writer = BufWriter::new(File::create(output_path)?);
        pipeline::save(&self.codec, &image.pixels, entries, Some(packet.as_slice()), &self.config.encode, &mut writer)?;
        writer.flush()?;

        info!("Wrote {} with {} byte XMP packet", output_path, packet.len());
        Ok(())
    }
}

/// Human-readable summary of loaded metadata
pub fn describe(image: &LoadedImage) -> String {
    let mut result = String::from("JPEG Metadata:\n");

    match image.orientation {
        Some(orientation) => {
            let _ = writeln!(result, "  Orientation: {} ({})", orientation as u16, orientation.description());
        }
        None => result.push_str("  Orientation: not set\n"),
    }

    match image.icc_profile() {
        Some(profile) => {
            let _ = writeln!(result, "  ICC profile: {} bytes", profile.len());
        }
        None => result.push_str("  ICC profile: none\n"),
    }

    match &image.xmp {
        Some(packet) => {
            let _ = writeln!(result, "  XMP packet: {} bytes", packet.len());
        }
        None => result.push_str("  XMP packet: none\n"),
    }

    let mut sections: BTreeMap<MetadataSection, Vec<&MetadataEntry>> = BTreeMap::new();
    for entry in image.exif.iter().filter(|e| e.key() != crate::exif::keys::INTER_COLOR_PROFILE) {
        sections.entry(entry.section()).or_default().push(entry);
    }

    let _ = writeln!(result, "  EXIF entries: {}", sections.values().map(Vec::len).sum::<usize>());
    for (section, mut entries) in sections {
        entries.sort_by_key(|e| e.tag_id());
        let _ = writeln!(result, "\n[{}]", section.group_name());
        for entry in entries {
            let _ = writeln!(result, "  0x{:04X} {} ({}): {}",
                             entry.tag_id(),
                             tag_names::get_tag_name(section, entry.tag_id()),
                             entry.data_type().name(),
                             helpers::format_value(entry));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::{keys, ExifValueCollection, Orientation, TagDataType};

    #[test]
    fn test_describe_groups_by_section() {
        let exif = ExifValueCollection::new(vec![
            MetadataEntry::new(MetadataSection::Exif, 0xA001, TagDataType::Short, &helpers::encode_short(1)),
            MetadataEntry::new(MetadataSection::Image, 0x010F, TagDataType::Ascii, b"Canon\0"),
            MetadataEntry::from_key(keys::INTER_COLOR_PROFILE, TagDataType::Undefined, &[0u8; 300]),
        ]);
        let image = LoadedImage {
            pixels: Vec::new(),
            orientation: Some(Orientation::RightTop),
            exif,
            xmp: None,
        };

        let text = describe(&image);
        assert!(text.contains("Orientation: 6 (Rotate 90 CW)"));
        assert!(text.contains("ICC profile: 300 bytes"));
        assert!(text.contains("EXIF entries: 2"));
        assert!(text.contains("0x010F Make (ASCII): \"Canon\""));

        let ifd0 = text.find("[IFD0]").unwrap();
        let exif_ifd = text.find("[ExifIFD]").unwrap();
        assert!(ifd0 < exif_ifd);
        assert!(text.contains("0xA001 ColorSpace"));
    }
}
