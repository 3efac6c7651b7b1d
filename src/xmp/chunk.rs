//! Parsed Extended XMP chunk

use byteorder::{BigEndian, ByteOrder};
use log::trace;

use crate::errors::{MetadataError, MetadataResult};
use crate::io::buffer_pool::{ArrayPool, PooledBuffer};
use crate::xmp::constants::{EXTENDED_HEADER_LENGTH, EXTENDED_XMP_SIGNATURE, GUID_LENGTH};

/// One chunk of an extended packet
///
/// The payload lives in a buffer rented from the caller's pool and goes back
/// to it when the chunk is dropped or released.
#[derive(Debug)]
pub struct ExtendedXmpChunk<'p> {
    guid: String,
    total_length: u32,
    offset: u32,
    data: PooledBuffer<'p>,
}

impl<'p> ExtendedXmpChunk<'p> {
    /// Parses a chunk blob
    ///
    /// # Arguments
    /// * `blob` - Segment body, with or without the Extended XMP signature
    /// * `pool` - Allocator for the payload copy
    ///
    /// # Returns
    /// The chunk, or `InconsistentChunk` when the blob is too short to hold a
    /// header and a payload
    pub fn parse(blob: &[u8], pool: &'p dyn ArrayPool) -> MetadataResult<Self> {
        let blob = blob.strip_prefix(EXTENDED_XMP_SIGNATURE).unwrap_or(blob);
        if blob.len() <= EXTENDED_HEADER_LENGTH {
            return Err(MetadataError::InconsistentChunk(format!(
                "{} bytes is too short for an Extended XMP chunk",
                blob.len()
            )));
        }

        let guid_bytes = &blob[..GUID_LENGTH];
        if !guid_bytes.is_ascii() {
            return Err(MetadataError::InconsistentChunk("GUID is not ASCII".to_string()));
        }
        let guid = String::from_utf8_lossy(guid_bytes).into_owned();
        let total_length = BigEndian::read_u32(&blob[GUID_LENGTH..GUID_LENGTH + 4]);
        let offset = BigEndian::read_u32(&blob[GUID_LENGTH + 4..EXTENDED_HEADER_LENGTH]);

        let payload = &blob[EXTENDED_HEADER_LENGTH..];
        let mut data = PooledBuffer::new(pool, payload.len());
        data.copy_from_slice(payload);

        trace!("Extended XMP chunk {}: offset {}, {} of {} bytes", guid, offset, payload.len(), total_length);

        Ok(ExtendedXmpChunk { guid, total_length, offset, data })
    }

    /// 32 character hex MD5 digest of the whole packet
    pub fn guid(&self) -> &str {
        &self.guid
    }

    /// Length of the whole packet
    pub fn total_length(&self) -> u32 {
        self.total_length
    }

    /// Position of this chunk within the packet
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the payload buffer to its pool
    pub fn release(self) {
        self.data.release();
    }
}
