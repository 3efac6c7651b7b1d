//! Tool configuration
//!
//! Reads the optional TOML file passed with `--config`:
//!
//! ```toml
//! log_file = "jpegmeta.log"
//!
//! [encode]
//! quality = 90
//! progressive = true
//! chroma_subsampling = "444"
//!
//! [exif]
//! strip = ["Gps:0x0002", "Image:0x010F"]
//! ```
//!
//! Unknown keys are ignored.

use std::fs;
use std::path::Path;

use log::debug;

use crate::errors::{MetadataError, MetadataResult};
use crate::exif::MetadataKey;
use crate::jpeg::{ChromaSubsampling, EncodeOptions};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolConfig {
    pub log_file: Option<String>,
    pub encode: EncodeOptions,
    /// EXIF entries removed before saving
    pub strip: Vec<MetadataKey>,
}

impl ToolConfig {
    /// Reads and parses a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> MetadataResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string
    pub fn from_str(content: &str) -> MetadataResult<Self> {
        let toml_value: toml::Value = content
            .parse()
            .map_err(|e| MetadataError::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut config = ToolConfig::default();

        if let Some(value) = toml_value.get("log_file") {
            let path = value.as_str().ok_or_else(|| invalid("log_file", "a string"))?;
            config.log_file = Some(path.to_string());
        }

        if let Some(encode) = toml_value.get("encode") {
            config.encode = parse_encode(encode)?;
        }

        if let Some(strip) = toml_value.get("exif").and_then(|exif| exif.get("strip")) {
            let items = strip.as_array().ok_or_else(|| invalid("exif.strip", "an array"))?;
            for item in items {
                let text = item.as_str().ok_or_else(|| invalid("exif.strip", "an array of strings"))?;
                let key = MetadataKey::parse(text)
                    .ok_or_else(|| MetadataError::Config(format!("invalid EXIF key '{}'", text)))?;
                config.strip.push(key);
            }
        }

        Ok(config)
    }
}

fn parse_encode(table: &toml::Value) -> MetadataResult<EncodeOptions> {
    let mut options = EncodeOptions::default();

    if let Some(value) = table.get("quality") {
        let quality = value.as_integer().ok_or_else(|| invalid("encode.quality", "an integer"))?;
        options.quality = u8::try_from(quality)
            .ok()
            .filter(|q| *q <= 100)
            .ok_or_else(|| invalid("encode.quality", "between 0 and 100"))?;
    }

    if let Some(value) = table.get("progressive") {
        options.progressive = value.as_bool().ok_or_else(|| invalid("encode.progressive", "a boolean"))?;
    }

    if let Some(value) = table.get("chroma_subsampling") {
        let text = value.as_str().ok_or_else(|| invalid("encode.chroma_subsampling", "a string"))?;
        options.chroma_subsampling = ChromaSubsampling::parse(text)?;
    }

    Ok(options)
}

fn invalid(key: &str, expected: &str) -> MetadataError {
    MetadataError::Config(format!("{} must be {}", key, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::MetadataSection;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ToolConfig::from_str("").unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.encode.quality, 75);
    }

    #[test]
    fn test_full_config() {
        let config = ToolConfig::from_str(
            r#"
            log_file = "out.log"
            unrelated = 1

            [encode]
            quality = 92
            progressive = true
            chroma_subsampling = "4:2:0"

            [exif]
            strip = ["Gps:0x0002", "image:271"]
            "#,
        )
        .unwrap();

        assert_eq!(config.log_file.as_deref(), Some("out.log"));
        assert_eq!(config.encode.quality, 92);
        assert!(config.encode.progressive);
        assert_eq!(config.encode.chroma_subsampling, ChromaSubsampling::Subsampling420);
        assert_eq!(config.strip, vec![
            MetadataKey::new(MetadataSection::Gps, 0x0002),
            MetadataKey::new(MetadataSection::Image, 0x010F),
        ]);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(ToolConfig::from_str("[encode]\nquality = 101"), Err(MetadataError::Config(_))));
        assert!(matches!(ToolConfig::from_str("[encode]\nquality = -1"), Err(MetadataError::Config(_))));
        assert!(matches!(ToolConfig::from_str("[encode]\nprogressive = \"yes\""), Err(MetadataError::Config(_))));
        assert!(matches!(ToolConfig::from_str("[exif]\nstrip = [\"Thumbnail:1\"]"), Err(MetadataError::Config(_))));
        assert!(matches!(ToolConfig::from_str("log_file = ["), Err(MetadataError::Config(_))));
    }
}
