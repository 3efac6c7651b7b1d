//! Reassembly of Extended XMP chunks

use log::{debug, warn};

use crate::errors::{MetadataError, MetadataResult};
use crate::io::buffer_pool::ArrayPool;
use crate::xmp::chunk::ExtendedXmpChunk;
use crate::xmp::constants::{EXTENDED_HEADER_LENGTH, EXTENDED_XMP_SIGNATURE};

/// Rebuilds an extended packet from its chunks
///
/// # Arguments
/// * `blobs` - Extended XMP segment bodies, in any order
/// * `expected_guid` - GUID named by the standard packet
/// * `pool` - Allocator for chunk payload copies
///
/// # Returns
/// The packet bytes. A chunk with another GUID, a conflicting total length,
/// a payload past the declared end, or a gap in the covered range is an
/// `InconsistentChunk` error.
pub fn recombine<B: AsRef<[u8]>>(blobs: &[B], expected_guid: &str, pool: &dyn ArrayPool) -> MetadataResult<Vec<u8>> {
    if blobs.is_empty() {
        return Err(MetadataError::InconsistentChunk("no Extended XMP chunks".to_string()));
    }

    // Upper bound on the bytes the chunks can cover
    let available: usize = blobs.iter()
        .map(|blob| {
            let blob = blob.as_ref();
            let blob = blob.strip_prefix(EXTENDED_XMP_SIGNATURE).unwrap_or(blob);
            blob.len().saturating_sub(EXTENDED_HEADER_LENGTH)
        })
        .sum();

    let mut packet: Option<Vec<u8>> = None;
    let mut covered: Vec<(usize, usize)> = Vec::with_capacity(blobs.len());

    for blob in blobs {
        let chunk = ExtendedXmpChunk::parse(blob.as_ref(), pool)?;

        if !chunk.guid().eq_ignore_ascii_case(expected_guid) {
            warn!("Extended XMP chunk GUID {} does not match {}", chunk.guid(), expected_guid);
            return Err(MetadataError::InconsistentChunk(format!(
                "GUID {} does not match {}", chunk.guid(), expected_guid
            )));
        }

        let total_length = chunk.total_length() as usize;
        if total_length > available {
            return Err(MetadataError::InconsistentChunk(format!(
                "total length {} declared, chunks hold only {} bytes", total_length, available
            )));
        }
        let buffer = packet.get_or_insert_with(|| vec![0u8; total_length]);
        if buffer.len() != total_length {
            return Err(MetadataError::InconsistentChunk(format!(
                "total length {} conflicts with {}", total_length, buffer.len()
            )));
        }

        let start = chunk.offset() as usize;
        let end = start + chunk.data().len();
        if end > total_length {
            return Err(MetadataError::InconsistentChunk(format!(
                "chunk at offset {} with {} bytes overruns {} bytes", start, chunk.data().len(), total_length
            )));
        }

        buffer[start..end].copy_from_slice(chunk.data());
        covered.push((start, end));
        chunk.release();
    }

    let packet = packet.unwrap_or_default();
    check_coverage(&mut covered, packet.len())?;

    debug!("Recombined {} Extended XMP chunks into {} bytes", blobs.len(), packet.len());
    Ok(packet)
}

/// Fails unless the ranges cover `0..length` without gaps
fn check_coverage(ranges: &mut [(usize, usize)], length: usize) -> MetadataResult<()> {
    ranges.sort_unstable();

    let mut reached = 0;
    for &(start, end) in ranges.iter() {
        if start > reached {
            break;
        }
        reached = reached.max(end);
    }

    if reached < length {
        return Err(MetadataError::InconsistentChunk(format!(
            "chunks cover only {} of {} bytes", reached, length
        )));
    }
    Ok(())
}
