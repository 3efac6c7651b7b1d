//! JPEG marker segment scanning and insertion
//!
//! Metadata lives in APP1 (EXIF, standard and Extended XMP) and APP2
//! (ICC profile) segments ahead of the first scan. Extraction moves those
//! segments out of the stream; embedding writes them back right after SOI
//! and an optional JFIF APP0.

use std::collections::BTreeMap;
use std::io::Write;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use log::{debug, trace, warn};

use crate::errors::{MetadataError, MetadataResult};
use crate::exif::constants::{header, limits};
use crate::jpeg::codec::MetadataPayloads;
use crate::xmp::constants::{EXTENDED_XMP_SIGNATURE, STANDARD_XMP_SIGNATURE};

/// JPEG markers
pub mod markers {
    pub const PREFIX: u8 = 0xFF;
    pub const TEM: u8 = 0x01;
    pub const RST0: u8 = 0xD0;
    pub const RST7: u8 = 0xD7;
    pub const SOI: u8 = 0xD8;
    pub const EOI: u8 = 0xD9;
    pub const SOS: u8 = 0xDA;
    pub const APP0: u8 = 0xE0;
    pub const APP1: u8 = 0xE1;
    pub const APP2: u8 = 0xE2;
}

/// Signature of an APP2 ICC profile chunk
pub const ICC_SIGNATURE: &[u8] = b"ICC_PROFILE\0";

/// Signature plus sequence number and chunk count
const ICC_HEADER_LENGTH: usize = 14;

/// Largest ICC payload per APP2 segment
pub const MAX_ICC_CHUNK_PAYLOAD: usize = limits::MAX_SEGMENT_PAYLOAD - ICC_HEADER_LENGTH;

fn is_standalone(marker: u8) -> bool {
    marker == markers::TEM || (markers::RST0..=markers::RST7).contains(&marker)
}

fn segment_error(offset: usize, reason: impl Into<String>) -> MetadataError {
    MetadataError::InvalidSegment(format!("at offset {}: {}", offset, reason.into()))
}

/// Pulls the metadata segments out of a JPEG stream
///
/// # Returns
/// The first EXIF segment, the first standard XMP segment, every Extended
/// XMP segment and the reassembled ICC profile, plus the JPEG without
/// those segments. Other segments and the scan data are kept untouched.
pub fn extract_metadata(jpeg: &[u8]) -> MetadataResult<(MetadataPayloads, Vec<u8>)> {
    if jpeg.len() < 2 || jpeg[0] != markers::PREFIX || jpeg[1] != markers::SOI {
        return Err(segment_error(0, "missing SOI marker"));
    }

    let mut payloads = MetadataPayloads::default();
    let mut icc_chunks: BTreeMap<u8, &[u8]> = BTreeMap::new();
    let mut icc_counts: Vec<u8> = Vec::new();
    let mut stripped = Vec::with_capacity(jpeg.len());
    stripped.extend_from_slice(&jpeg[..2]);

    let mut pos = 2;
    loop {
        if pos + 2 > jpeg.len() {
            return Err(segment_error(pos, "stream ends before the first scan"));
        }
        if jpeg[pos] != markers::PREFIX {
            return Err(segment_error(pos, format!("expected 0xFF, got {:#04x}", jpeg[pos])));
        }

        let marker = jpeg[pos + 1];
        if marker == markers::PREFIX {
            // Fill byte
            pos += 1;
            continue;
        }
        if is_standalone(marker) {
            stripped.extend_from_slice(&jpeg[pos..pos + 2]);
            pos += 2;
            continue;
        }
        if marker == markers::SOS || marker == markers::EOI {
            stripped.extend_from_slice(&jpeg[pos..]);
            break;
        }

        if pos + 4 > jpeg.len() {
            return Err(segment_error(pos, "truncated segment length"));
        }
        let length = BigEndian::read_u16(&jpeg[pos + 2..pos + 4]) as usize;
        let end = pos + 2 + length;
        if length < 2 || end > jpeg.len() {
            return Err(segment_error(pos, format!("segment length {} runs past the end", length)));
        }
        let body = &jpeg[pos + 4..end];
        trace!("Marker {:#04x} at {} with {} bytes", marker, pos, body.len());

        let consumed = match marker {
            markers::APP1 => take_app1(body, &mut payloads),
            markers::APP2 if body.starts_with(ICC_SIGNATURE) && body.len() >= ICC_HEADER_LENGTH => {
                let sequence = body[ICC_SIGNATURE.len()];
                icc_counts.push(body[ICC_SIGNATURE.len() + 1]);
                if icc_chunks.insert(sequence, &body[ICC_HEADER_LENGTH..]).is_some() {
                    warn!("Duplicate ICC profile chunk {}", sequence);
                }
                true
            }
            _ => false,
        };

        if !consumed {
            stripped.extend_from_slice(&jpeg[pos..end]);
        }
        pos = end;
    }

    if !icc_chunks.is_empty() {
        payloads.icc_profile = assemble_icc_profile(&icc_chunks, &icc_counts);
    }

    debug!("Extracted metadata: {}", payloads.summary());
    Ok((payloads, stripped))
}

/// Concatenates ICC chunks, or `None` if the set is incomplete or inconsistent
fn assemble_icc_profile(chunks: &BTreeMap<u8, &[u8]>, counts: &[u8]) -> Option<Vec<u8>> {
    let count = counts[0];
    if counts.iter().any(|&c| c != count) {
        warn!("Dropping ICC profile: chunks disagree on the chunk count");
        return None;
    }
    if chunks.keys().any(|&seq| seq == 0 || seq > count) {
        warn!("Dropping ICC profile: sequence number outside 1..={}", count);
        return None;
    }
    if chunks.len() != count as usize {
        warn!("Dropping ICC profile: {} of {} chunks present", chunks.len(), count);
        return None;
    }

    let profile: Vec<u8> = chunks.values().flat_map(|chunk| chunk.iter().copied()).collect();
    debug!("Reassembled {} byte ICC profile from {} chunks", profile.len(), chunks.len());
    Some(profile)
}

/// Files an APP1 body under the matching payload, returning whether it was taken
fn take_app1(body: &[u8], payloads: &mut MetadataPayloads) -> bool {
    if body.starts_with(header::EXIF_SIGNATURE) || body.starts_with(header::ALTERNATE_EXIF_SIGNATURE) {
        if payloads.exif.is_some() {
            debug!("Dropping additional EXIF segment");
        } else {
            payloads.exif = Some(body.to_vec());
        }
        return true;
    }

    if body.starts_with(STANDARD_XMP_SIGNATURE) {
        if payloads.standard_xmp.is_some() {
            debug!("Dropping additional standard XMP segment");
        } else {
            payloads.standard_xmp = Some(body.to_vec());
        }
        return true;
    }

    if body.starts_with(EXTENDED_XMP_SIGNATURE) {
        payloads.extended_xmp.push(body.to_vec());
        return true;
    }

    false
}

/// Inserts metadata segments into a JPEG stream without metadata
///
/// Segments go after SOI and a leading APP0 in the order EXIF, standard
/// XMP, Extended XMP, ICC profile. Extended XMP without a standard packet
/// is dropped since nothing would reference it.
pub fn embed_metadata(jpeg: &[u8], payloads: &MetadataPayloads) -> MetadataResult<Vec<u8>> {
    if jpeg.len() < 2 || jpeg[0] != markers::PREFIX || jpeg[1] != markers::SOI {
        return Err(segment_error(0, "missing SOI marker"));
    }

    let mut insert_at = 2;
    if jpeg.len() >= 6 && jpeg[2] == markers::PREFIX && jpeg[3] == markers::APP0 {
        let length = BigEndian::read_u16(&jpeg[4..6]) as usize;
        if 4 + length > jpeg.len() {
            return Err(segment_error(2, "truncated APP0 segment"));
        }
        insert_at = 4 + length;
    }

    let mut output = Vec::with_capacity(jpeg.len() + payloads.total_len() + 64);
    output.extend_from_slice(&jpeg[..insert_at]);

    if let Some(exif) = &payloads.exif {
        write_segment(&mut output, markers::APP1, exif)?;
    }

    match &payloads.standard_xmp {
        Some(xmp) => {
            write_segment(&mut output, markers::APP1, xmp)?;
            for chunk in &payloads.extended_xmp {
                write_segment(&mut output, markers::APP1, chunk)?;
            }
        }
        None if !payloads.extended_xmp.is_empty() => {
            warn!("Dropping {} Extended XMP chunks without a standard XMP packet", payloads.extended_xmp.len());
        }
        None => {}
    }

    if let Some(profile) = &payloads.icc_profile {
        write_icc_profile(&mut output, profile)?;
    }

    output.extend_from_slice(&jpeg[insert_at..]);
    Ok(output)
}

/// Writes one marker segment
pub fn write_segment(writer: &mut impl Write, marker: u8, body: &[u8]) -> MetadataResult<()> {
    if body.len() > limits::MAX_SEGMENT_PAYLOAD {
        return Err(MetadataError::InvalidSegment(format!(
            "{} byte payload for marker {:#04x} exceeds the {} byte limit",
            body.len(), marker, limits::MAX_SEGMENT_PAYLOAD
        )));
    }

    writer.write_u8(markers::PREFIX)?;
    writer.write_u8(marker)?;
    writer.write_u16::<BigEndian>((body.len() + 2) as u16)?;
    writer.write_all(body)?;
    Ok(())
}

/// Writes an ICC profile as numbered APP2 chunks
fn write_icc_profile(writer: &mut impl Write, profile: &[u8]) -> MetadataResult<()> {
    let chunk_count = profile.len().div_ceil(MAX_ICC_CHUNK_PAYLOAD).max(1);
    if chunk_count > u8::MAX as usize {
        return Err(MetadataError::InvalidSegment(format!("ICC profile of {} bytes is too large", profile.len())));
    }

    let mut body = Vec::with_capacity(limits::MAX_SEGMENT_PAYLOAD);
    for (index, chunk) in profile.chunks(MAX_ICC_CHUNK_PAYLOAD).enumerate() {
        body.clear();
        body.extend_from_slice(ICC_SIGNATURE);
        body.push((index + 1) as u8);
        body.push(chunk_count as u8);
        body.extend_from_slice(chunk);
        write_segment(writer, markers::APP2, &body)?;
    }

    Ok(())
}
