//! Splitting of oversized XMP packets into Extended XMP
//!
//! A packet that does not fit one APP1 segment is written as a small
//! standard packet that names the extended packet by its MD5 digest, plus
//! the full packet cut into signed, offset-labelled chunks.

use log::{debug, info};

use crate::errors::{MetadataError, MetadataResult};
use crate::xmp::constants::{
    ns, EXTENDED_HEADER_LENGTH, EXTENDED_XMP_SIGNATURE, MAX_EXTENDED_CHUNK_PAYLOAD,
    MAX_STANDARD_PACKET_LENGTH, STANDARD_STUB_TARGET_LENGTH, STANDARD_XMP_SIGNATURE,
};

/// Segment bodies produced for one XMP packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedXmpData {
    /// Standard packet with its signature
    pub standard_packet: Vec<u8>,
    /// Extended chunks with their signatures, in offset order
    pub extended_chunks: Vec<Vec<u8>>,
}

impl ExtendedXmpData {
    pub fn has_extended_chunks(&self) -> bool {
        !self.extended_chunks.is_empty()
    }
}

/// Prefixes a packet with the standard XMP signature
pub fn add_signature_to_standard_packet(packet: &[u8]) -> Vec<u8> {
    let mut segment = Vec::with_capacity(STANDARD_XMP_SIGNATURE.len() + packet.len());
    segment.extend_from_slice(STANDARD_XMP_SIGNATURE);
    segment.extend_from_slice(packet);
    segment
}

/// Prepares a packet for embedding
///
/// Packets up to [`MAX_STANDARD_PACKET_LENGTH`] bytes are returned as a
/// single standard segment; larger ones are split.
pub fn split(packet: &[u8]) -> MetadataResult<ExtendedXmpData> {
    if packet.len() <= MAX_STANDARD_PACKET_LENGTH {
        debug!("XMP packet of {} bytes fits a standard segment", packet.len());
        return Ok(ExtendedXmpData {
            standard_packet: add_signature_to_standard_packet(packet),
            extended_chunks: Vec::new(),
        });
    }

    split_into_extended(packet)
}

/// Splits a packet into a standard stub and Extended XMP chunks
///
/// Unlike [`split`] this always produces chunks, whatever the packet size.
pub fn split_into_extended(packet: &[u8]) -> MetadataResult<ExtendedXmpData> {
    let total_length = u32::try_from(packet.len())
        .map_err(|_| MetadataError::Generic(format!("XMP packet of {} bytes is too large", packet.len())))?;

    let guid = format!("{:X}", md5::compute(packet));
    let standard_packet = add_signature_to_standard_packet(&create_standard_stub(&guid));

    let mut extended_chunks = Vec::with_capacity(packet.len().div_ceil(MAX_EXTENDED_CHUNK_PAYLOAD));
    for (index, payload) in packet.chunks(MAX_EXTENDED_CHUNK_PAYLOAD).enumerate() {
        let offset = (index * MAX_EXTENDED_CHUNK_PAYLOAD) as u32;

        let mut chunk = Vec::with_capacity(EXTENDED_XMP_SIGNATURE.len() + EXTENDED_HEADER_LENGTH + payload.len());
        chunk.extend_from_slice(EXTENDED_XMP_SIGNATURE);
        chunk.extend_from_slice(guid.as_bytes());
        chunk.extend_from_slice(&total_length.to_be_bytes());
        chunk.extend_from_slice(&offset.to_be_bytes());
        chunk.extend_from_slice(payload);
        extended_chunks.push(chunk);
    }

    info!("Split {} byte XMP packet into {} Extended XMP chunks (GUID {})",
          packet.len(), extended_chunks.len(), guid);

    Ok(ExtendedXmpData { standard_packet, extended_chunks })
}

/// Standard packet that only points at the extended packet
///
/// Padded with spaces to [`STANDARD_STUB_TARGET_LENGTH`] bytes so the
/// packet can be edited in place.
fn create_standard_stub(guid: &str) -> Vec<u8> {
    let begin = format!(
        "<?xpacket begin=\"\u{FEFF}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n\
         <x:xmpmeta xmlns:x=\"{x}\">\n\
         \x20<rdf:RDF xmlns:rdf=\"{rdf}\">\n\
         \x20 <rdf:Description rdf:about=\"\" xmlns:xmpNote=\"{note}\" xmpNote:HasExtendedXMP=\"{guid}\" />\n\
         \x20</rdf:RDF>\n\
         </x:xmpmeta>",
        x = ns::X,
        rdf = ns::RDF,
        note = ns::XMP_NOTE,
        guid = guid,
    );
    let end = "\n<?xpacket end=\"w\"?>";

    let padding = STANDARD_STUB_TARGET_LENGTH.saturating_sub(begin.len() + end.len());

    let mut stub = String::with_capacity(begin.len() + padding + end.len());
    stub.push_str(&begin);
    stub.extend(std::iter::repeat(' ').take(padding));
    stub.push_str(end);
    stub.into_bytes()
}
