//! Load and save orchestration
//!
//! Turns the raw payloads an [`ImageCodec`] reports into host-facing
//! metadata and back. EXIF problems that leave the structure unreadable
//! abort the load; Extended XMP problems only cost the extended packet.

use std::collections::HashMap;
use std::io::{Read, Write};

use log::{debug, info, warn};

use crate::errors::{MetadataError, MetadataResult};
use crate::exif::{helpers, keys, ExifColorSpace, ExifParser, ExifValueCollection, ExifWriter, MetadataEntry,
                  MetadataKey, Orientation, TagDataType};
use crate::io::buffer_pool::ArrayPool;
use crate::jpeg::{EncodeOptions, ImageCodec, MetadataPayloads};
use crate::xmp::{self, XmlDocument};

/// Image and metadata as handed to the host
#[derive(Debug, Clone, Default)]
pub struct LoadedImage {
    pub pixels: Vec<u8>,
    /// Orientation taken out of the EXIF entries
    pub orientation: Option<Orientation>,
    /// EXIF entries; the ICC profile, if any, is carried as Image 0x8773
    pub exif: ExifValueCollection,
    /// XMP packet without signature, merged with its extended packet
    pub xmp: Option<Vec<u8>>,
}

impl LoadedImage {
    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.exif.get(keys::INTER_COLOR_PROFILE).map(MetadataEntry::data)
    }

    /// EXIF entries for saving, with the orientation put back
    pub fn entries_with_orientation(&self) -> HashMap<MetadataKey, MetadataEntry> {
        let mut entries = self.exif.clone().into_map();
        if let Some(orientation) = self.orientation {
            let data = helpers::encode_short(orientation as u16);
            entries.insert(keys::ORIENTATION, MetadataEntry::from_key(keys::ORIENTATION, TagDataType::Short, &data));
        }
        entries
    }
}

/// Decodes an image and assembles its metadata
///
/// # Arguments
/// * `codec` - Codec that decodes the stream and reports raw payloads
/// * `input` - Encoded image
/// * `pool` - Scratch buffer allocator
pub fn load<C: ImageCodec + ?Sized>(codec: &C, input: &mut dyn Read, pool: &dyn ArrayPool) -> MetadataResult<LoadedImage> {
    let decoded = codec.decode(input)?;
    let metadata = decoded.metadata;

    let mut exif = match &metadata.exif {
        Some(payload) => ExifParser::new(pool).parse(payload)?,
        None => ExifValueCollection::default(),
    };

    let orientation = exif.get_and_remove_value(keys::ORIENTATION).and_then(|entry| {
        let value = helpers::try_decode_short(&entry)?;
        let orientation = Orientation::from_value(value);
        if orientation.is_none() {
            warn!("Ignoring invalid orientation {}", value);
        }
        orientation
    });

    // The APP2 profile is authoritative
    exif.remove(keys::INTER_COLOR_PROFILE);
    if let Some(profile) = &metadata.icc_profile {
        exif.push(MetadataEntry::from_key(keys::INTER_COLOR_PROFILE, TagDataType::Undefined, profile));
    }

    let xmp = resolve_xmp(metadata.standard_xmp.as_deref(), &metadata.extended_xmp, pool)?;

    info!("Loaded {} EXIF entries, orientation {:?}, XMP {}",
          exif.len(), orientation, xmp.as_ref().map_or(0, Vec::len));

    Ok(LoadedImage { pixels: decoded.pixels, orientation, exif, xmp })
}

/// Standard packet merged with its extended packet where possible
fn resolve_xmp(standard: Option<&[u8]>, extended: &[Vec<u8>], pool: &dyn ArrayPool) -> MetadataResult<Option<Vec<u8>>> {
    let Some(segment) = standard else {
        if !extended.is_empty() {
            warn!("Ignoring {} Extended XMP chunks without a standard packet", extended.len());
        }
        return Ok(None);
    };

    let packet = xmp::strip_standard_signature(segment);
    if packet.is_empty() {
        return Ok(None);
    }

    let document = match XmlDocument::parse(packet) {
        Ok(document) => document,
        Err(e) => {
            warn!("Standard XMP packet is not well-formed, keeping it unmodified: {}", e);
            return Ok(Some(packet.to_vec()));
        }
    };

    let Some(guid) = xmp::try_get_extended_xmp_guid(&document) else {
        if !extended.is_empty() {
            debug!("Standard XMP references no extended packet, ignoring {} chunks", extended.len());
        }
        return Ok(Some(packet.to_vec()));
    };

    if extended.is_empty() {
        warn!("Extended XMP {} is referenced but missing", guid);
        return Ok(Some(packet.to_vec()));
    }

    match merge_extended(&document, extended, &guid, pool) {
        Ok(merged) => Ok(Some(merged)),
        Err(e) if e.is_recoverable() => {
            warn!("Using the standard XMP packet only: {}", e);
            Ok(Some(packet.to_vec()))
        }
        Err(e) => Err(e),
    }
}

fn merge_extended(standard: &XmlDocument, chunks: &[Vec<u8>], guid: &str, pool: &dyn ArrayPool) -> MetadataResult<Vec<u8>> {
    let extended_packet = xmp::recombine(chunks, guid, pool)?;
    let extended = XmlDocument::parse(&extended_packet)?;
    let merged = xmp::merge(standard, &extended)?;
    debug!("Merged {} byte extended XMP packet {}", extended_packet.len(), guid);
    merged.to_bytes()
}

/// Serializes metadata into the payloads handed to a codec
///
/// An InterColorProfile entry becomes the ICC payload and marks the EXIF
/// color space as uncalibrated; without one the color space is sRGB. No
/// entries at all means no EXIF segment.
pub fn build_payloads(mut entries: HashMap<MetadataKey, MetadataEntry>, xmp_packet: Option<&[u8]>) -> MetadataResult<MetadataPayloads> {
    let mut payloads = MetadataPayloads::default();

    if !entries.is_empty() {
        let color_space = match entries.remove(&keys::INTER_COLOR_PROFILE) {
            Some(profile) => {
                payloads.icc_profile = Some(profile.data().to_vec());
                ExifColorSpace::Uncalibrated
            }
            None => ExifColorSpace::Srgb,
        };

        let writer = ExifWriter::new(entries, Some(color_space));
        payloads.exif = Some(writer.create_exif_app1_payload()?);
    }

    if let Some(packet) = xmp_packet.filter(|p| !p.is_empty()) {
        let data = xmp::split(packet)?;
        payloads.standard_xmp = Some(data.standard_packet);
        payloads.extended_xmp = data.extended_chunks;
    }

    debug!("Built payloads: {}", payloads.summary());
    Ok(payloads)
}

/// Encodes an image with the given metadata
pub fn save<C: ImageCodec + ?Sized>(
    codec: &C,
    pixels: &[u8],
    entries: HashMap<MetadataKey, MetadataEntry>,
    xmp_packet: Option<&[u8]>,
    options: &EncodeOptions,
    output: &mut dyn Write,
) -> MetadataResult<()> {
    if pixels.is_empty() {
        return Err(MetadataError::Generic("no image data to save".to_string()));
    }

    let payloads = build_payloads(entries, xmp_packet)?;
    codec.encode(pixels, &payloads, options, output)?;
    info!("Saved image with {}", payloads.summary());
    Ok(())
}
