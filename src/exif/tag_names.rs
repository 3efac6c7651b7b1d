//! EXIF tag name definitions
//!
//! Tag names are loaded from the embedded `exif_tags.toml` table the first
//! time they are needed.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::errors::{MetadataError, MetadataResult};
use crate::exif::types::MetadataSection;

lazy_static! {
    // Parse the TOML table at first use
    static ref EXIF_TAG_DEFINITIONS: ExifTagDefinitions = {
        let content = include_str!("../../exif_tags.toml");
        ExifTagDefinitions::from_str(content).unwrap_or_else(|e| {
            log::warn!("Failed to parse EXIF tag definitions: {}", e);
            ExifTagDefinitions::default()
        })
    };
}

/// Container for tag names per section
#[derive(Debug, Default)]
pub struct ExifTagDefinitions {
    names: HashMap<(MetadataSection, u16), String>,
}

impl ExifTagDefinitions {
    /// Parse tag definitions from a TOML string
    pub fn from_str(content: &str) -> MetadataResult<Self> {
        let toml_value: toml::Value = content
            .parse()
            .map_err(|e| MetadataError::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut defs = ExifTagDefinitions::default();
        for section in MetadataSection::ALL {
            let table_name = section.to_string().to_ascii_lowercase();
            let Some(table) = toml_value.get(&table_name).and_then(|v| v.as_table()) else {
                continue;
            };

            for (k, v) in table {
                let id = k.strip_prefix("0x").and_then(|hex| u16::from_str_radix(hex, 16).ok());
                if let (Some(id), Some(name)) = (id, v.as_str()) {
                    defs.names.insert((section, id), name.to_string());
                }
            }
        }

        Ok(defs)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Get the name of a tag within a section, or "Unknown"
pub fn get_tag_name(section: MetadataSection, tag: u16) -> &'static str {
    EXIF_TAG_DEFINITIONS
        .names
        .get(&(section, tag))
        .map(|s| s.as_str())
        .unwrap_or("Unknown")
}

/// Get the name of a tag when its section is not known yet
///
/// Used while walking directories, before entries are assigned a section.
pub fn get_tag_name_any(tag: u16) -> &'static str {
    MetadataSection::ALL
        .iter()
        .find_map(|section| EXIF_TAG_DEFINITIONS.names.get(&(*section, tag)))
        .map(|s| s.as_str())
        .unwrap_or("Unknown")
}
