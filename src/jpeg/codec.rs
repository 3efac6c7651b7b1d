//! Image codec seam
//!
//! Pixel compression is delegated to an [`ImageCodec`]. The pipeline only
//! hands metadata payloads across this boundary, so the codec never has to
//! understand EXIF or XMP.

use std::fmt;
use std::io::{Read, Write};

use log::debug;

use crate::errors::{MetadataError, MetadataResult};
use crate::jpeg::segments::{embed_metadata, extract_metadata};

/// Serialized metadata carried next to the pixel data
///
/// EXIF and XMP bodies include their APP1 signatures; the ICC profile is the
/// bare profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataPayloads {
    pub exif: Option<Vec<u8>>,
    pub icc_profile: Option<Vec<u8>>,
    pub standard_xmp: Option<Vec<u8>>,
    pub extended_xmp: Vec<Vec<u8>>,
}

impl MetadataPayloads {
    pub fn is_empty(&self) -> bool {
        self.exif.is_none() && self.icc_profile.is_none() && self.standard_xmp.is_none() && self.extended_xmp.is_empty()
    }

    /// Total payload size in bytes
    pub fn total_len(&self) -> usize {
        [&self.exif, &self.icc_profile, &self.standard_xmp]
            .iter()
            .filter_map(|p| p.as_ref().map(Vec::len))
            .sum::<usize>()
            + self.extended_xmp.iter().map(Vec::len).sum::<usize>()
    }

    /// One-line description for logging
    pub fn summary(&self) -> String {
        let size = |p: &Option<Vec<u8>>| p.as_ref().map_or("none".to_string(), |b| format!("{} bytes", b.len()));
        format!(
            "EXIF {}, ICC {}, XMP {}, {} extended chunks",
            size(&self.exif),
            size(&self.icc_profile),
            size(&self.standard_xmp),
            self.extended_xmp.len()
        )
    }
}

/// Chroma subsampling applied by the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromaSubsampling {
    Subsampling420,
    #[default]
    Subsampling422,
    Subsampling444,
    Subsampling400,
}

impl ChromaSubsampling {
    pub fn parse(value: &str) -> MetadataResult<Self> {
        match value {
            "420" | "4:2:0" => Ok(ChromaSubsampling::Subsampling420),
            "422" | "4:2:2" => Ok(ChromaSubsampling::Subsampling422),
            "444" | "4:4:4" => Ok(ChromaSubsampling::Subsampling444),
            "400" | "4:0:0" => Ok(ChromaSubsampling::Subsampling400),
            other => Err(MetadataError::Config(format!("unknown chroma subsampling '{}'", other))),
        }
    }
}

impl fmt::Display for ChromaSubsampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChromaSubsampling::Subsampling420 => "4:2:0",
            ChromaSubsampling::Subsampling422 => "4:2:2",
            ChromaSubsampling::Subsampling444 => "4:4:4",
            ChromaSubsampling::Subsampling400 => "4:0:0",
        };
        write!(f, "{}", name)
    }
}

/// Encoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// 0 to 100
    pub quality: u8,
    pub chroma_subsampling: ChromaSubsampling,
    pub progressive: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: 75,
            chroma_subsampling: ChromaSubsampling::default(),
            progressive: false,
        }
    }
}

impl EncodeOptions {
    pub fn validate(&self) -> MetadataResult<()> {
        if self.quality > 100 {
            return Err(MetadataError::Config(format!("quality {} is outside 0..=100", self.quality)));
        }
        Ok(())
    }
}

/// Result of decoding an image
#[derive(Debug, Clone, Default)]
pub struct DecodedImage {
    /// Image data as understood by the codec
    pub pixels: Vec<u8>,
    pub metadata: MetadataPayloads,
}

/// Image codec consumed by the metadata pipeline
pub trait ImageCodec {
    /// Decodes an image and returns its raw metadata payloads
    fn decode(&self, input: &mut dyn Read) -> MetadataResult<DecodedImage>;

    /// Encodes an image with the given metadata payloads
    fn encode(
        &self,
        pixels: &[u8],
        metadata: &MetadataPayloads,
        options: &EncodeOptions,
        output: &mut dyn Write,
    ) -> MetadataResult<()>;
}

/// Codec that leaves the compressed JPEG stream untouched
///
/// `pixels` holds the JPEG stream without its metadata segments. Encoding
/// re-inserts the payloads, so the options have no effect on the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegSegmentCodec;

impl JpegSegmentCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for JpegSegmentCodec {
    fn decode(&self, input: &mut dyn Read) -> MetadataResult<DecodedImage> {
        let mut jpeg = Vec::new();
        input.read_to_end(&mut jpeg)?;

        let (metadata, pixels) = extract_metadata(&jpeg)?;
        Ok(DecodedImage { pixels, metadata })
    }

    fn encode(
        &self,
        pixels: &[u8],
        metadata: &MetadataPayloads,
        options: &EncodeOptions,
        output: &mut dyn Write,
    ) -> MetadataResult<()> {
        options.validate()?;
        debug!(
            "Encoding with quality {}, {} chroma, progressive {} (stream is passed through)",
            options.quality, options.chroma_subsampling, options.progressive
        );

        let jpeg = embed_metadata(pixels, metadata)?;
        output.write_all(&jpeg)?;
        Ok(())
    }
}
