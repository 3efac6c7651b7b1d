//! Tests for packet splitting

use byteorder::{BigEndian, ByteOrder};

use crate::xmp::constants::{
    EXTENDED_XMP_SIGNATURE, MAX_EXTENDED_CHUNK_PAYLOAD, MAX_STANDARD_PACKET_LENGTH,
    STANDARD_STUB_TARGET_LENGTH, STANDARD_XMP_SIGNATURE,
};
use crate::xmp::dom::XmlDocument;
use crate::xmp::merge::try_get_extended_xmp_guid;
use crate::xmp::split::{split, split_into_extended};
use crate::xmp::strip_standard_signature;
use crate::xmp::tests::test_utils::{large_packet, packet};

#[test]
fn test_small_packet_stays_standard() {
    let xml = packet("", "xmp:Rating=\"5\"", "").into_bytes();
    let data = split(&xml).unwrap();

    assert!(!data.has_extended_chunks());
    assert_eq!(&data.standard_packet[..STANDARD_XMP_SIGNATURE.len()], STANDARD_XMP_SIGNATURE);
    assert_eq!(&data.standard_packet[STANDARD_XMP_SIGNATURE.len()..], &xml[..]);
}

#[test]
fn test_threshold() {
    let at_limit = vec![b' '; MAX_STANDARD_PACKET_LENGTH];
    let data = split(&at_limit).unwrap();
    assert!(data.extended_chunks.is_empty());
    assert_eq!(data.standard_packet.len(), STANDARD_XMP_SIGNATURE.len() + MAX_STANDARD_PACKET_LENGTH);

    let over_limit = vec![b' '; MAX_STANDARD_PACKET_LENGTH + 1];
    let data = split(&over_limit).unwrap();
    assert_eq!(data.extended_chunks.len(), 2);
}

#[test]
fn test_chunk_layout() {
    let xml = large_packet(200_000);
    let data = split(&xml).unwrap();

    let expected_chunks = xml.len().div_ceil(MAX_EXTENDED_CHUNK_PAYLOAD);
    assert_eq!(data.extended_chunks.len(), expected_chunks);

    let guid = format!("{:X}", md5::compute(&xml));
    let mut reassembled = Vec::new();
    for (index, chunk) in data.extended_chunks.iter().enumerate() {
        assert!(chunk.starts_with(EXTENDED_XMP_SIGNATURE));
        let header = &chunk[EXTENDED_XMP_SIGNATURE.len()..];

        assert_eq!(&header[..32], guid.as_bytes());
        assert_eq!(BigEndian::read_u32(&header[32..36]) as usize, xml.len());
        assert_eq!(BigEndian::read_u32(&header[36..40]) as usize, index * MAX_EXTENDED_CHUNK_PAYLOAD);

        let payload = &header[40..];
        if index + 1 < expected_chunks {
            assert_eq!(payload.len(), MAX_EXTENDED_CHUNK_PAYLOAD);
        }
        reassembled.extend_from_slice(payload);
    }
    assert_eq!(reassembled, xml);
}

#[test]
fn test_standard_stub() {
    let xml = large_packet(70_000);
    let data = split(&xml).unwrap();

    let stub = strip_standard_signature(&data.standard_packet);
    assert_eq!(stub.len(), STANDARD_STUB_TARGET_LENGTH);
    assert!(stub.ends_with(b"<?xpacket end=\"w\"?>"));

    let document = XmlDocument::parse(stub).unwrap();
    let guid = try_get_extended_xmp_guid(&document).unwrap();
    assert_eq!(guid, format!("{:X}", md5::compute(&xml)));
    assert!(guid.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
}

#[test]
fn test_forced_split_of_small_packet() {
    let xml = packet("", "", "").into_bytes();
    let data = split_into_extended(&xml).unwrap();
    assert_eq!(data.extended_chunks.len(), 1);
    assert_eq!(data.extended_chunks[0].len(), EXTENDED_XMP_SIGNATURE.len() + 40 + xml.len());
}
