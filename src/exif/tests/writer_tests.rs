//! Tests for the EXIF IFD writer

use std::collections::HashMap;

use crate::errors::MetadataError;
use crate::exif::entry::MetadataEntry;
use crate::exif::helpers;
use crate::exif::parser::ExifParser;
use crate::exif::tests::test_utils::camera_like_be;
use crate::exif::types::{keys, ExifColorSpace, MetadataKey, MetadataSection, TagDataType};
use crate::exif::writer::ExifWriter;
use crate::io::buffer_pool::HeapPool;

fn entry(section: MetadataSection, tag: u16, data_type: TagDataType, data: &[u8]) -> MetadataEntry {
    MetadataEntry::new(section, tag, data_type, data)
}

fn to_map(entries: Vec<MetadataEntry>) -> HashMap<MetadataKey, MetadataEntry> {
    entries.into_iter().map(|e| (e.key(), e)).collect()
}

fn sample_entries() -> Vec<MetadataEntry> {
    vec![
        entry(MetadataSection::Image, 0x010F, TagDataType::Ascii, b"Canon\0"),
        entry(MetadataSection::Image, 0x0110, TagDataType::Ascii, b"EOS R5\0"),
        entry(MetadataSection::Image, 0x0112, TagDataType::Short, &helpers::encode_short(6)),
        entry(MetadataSection::Image, 0x011A, TagDataType::Rational, &[72, 0, 0, 0, 1, 0, 0, 0]),
        entry(MetadataSection::Exif, 0x829A, TagDataType::Rational, &[1, 0, 0, 0, 250, 0, 0, 0]),
        entry(MetadataSection::Exif, 0x9204, TagDataType::SRational, &[0xFF, 0xFF, 0xFF, 0xFF, 3, 0, 0, 0]),
        entry(MetadataSection::Exif, 0xA002, TagDataType::Long, &helpers::encode_long(8192)),
        entry(MetadataSection::Exif, 0x927C, TagDataType::Undefined, &[7u8; 33]),
        entry(MetadataSection::Gps, 0x0000, TagDataType::Byte, &[2, 3, 0, 0]),
        entry(MetadataSection::Gps, 0x0002, TagDataType::Rational, &[0u8; 24]),
        entry(MetadataSection::Interop, 0x0001, TagDataType::Ascii, b"R98\0"),
        entry(MetadataSection::Image, 0x0102, TagDataType::Short, &[8, 0, 8, 0, 8, 0]),
        entry(MetadataSection::Exif, 0xA433, TagDataType::Ascii, b""),
        entry(MetadataSection::Exif, 0xA500, TagDataType::Double, &2.2f64.to_le_bytes()),
    ]
}

fn assert_same_entries(expected: &[MetadataEntry], actual: &[MetadataEntry]) {
    assert_eq!(expected.len(), actual.len());
    for wanted in expected {
        let found = actual.iter().find(|e| e.key() == wanted.key())
            .unwrap_or_else(|| panic!("missing {}", wanted.key()));
        assert_eq!(found.data_type(), wanted.data_type(), "{}", wanted.key());
        assert_eq!(found.data(), wanted.data(), "{}", wanted.key());
    }
}

#[test]
fn test_round_trip() {
    let entries = sample_entries();
    let tiff = ExifWriter::new(to_map(entries.clone()), None).write_tiff().unwrap();

    let parsed = ExifParser::new(&HeapPool).parse(&tiff).unwrap();
    let parsed: Vec<MetadataEntry> = parsed.into_iter().collect();
    assert_same_entries(&entries, &parsed);
}

#[test]
fn test_round_trip_from_big_endian_source() {
    let pool = HeapPool;
    let original: Vec<MetadataEntry> = ExifParser::new(&pool).parse(&camera_like_be()).unwrap().into_iter().collect();

    let payload = ExifWriter::new(to_map(original.clone()), None).create_exif_app1_payload().unwrap();
    assert!(payload.starts_with(b"Exif\0\0II*\0"));

    let reparsed: Vec<MetadataEntry> = ExifParser::new(&pool).parse(&payload).unwrap().into_iter().collect();
    assert_same_entries(&original, &reparsed);
}

#[test]
fn test_header_and_ifd0_layout() {
    let map = to_map(vec![entry(MetadataSection::Image, 0x0112, TagDataType::Short, &helpers::encode_short(3))]);
    let tiff = ExifWriter::new(map, None).write_tiff().unwrap();

    assert_eq!(tiff, vec![
        0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00,
        0x01, 0x00,
        0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
    ]);
}

#[test]
fn test_empty_input_writes_empty_ifd0() {
    let tiff = ExifWriter::new(HashMap::new(), None).write_tiff().unwrap();
    assert_eq!(tiff.len(), 8 + 6);

    let parsed = ExifParser::new(&HeapPool).parse(&tiff).unwrap();
    assert!(parsed.is_empty());
}

#[test]
fn test_color_space_is_written() {
    let map = to_map(vec![entry(MetadataSection::Exif, 0xA001, TagDataType::Short, &helpers::encode_short(1))]);
    let tiff = ExifWriter::new(map, Some(ExifColorSpace::Uncalibrated)).write_tiff().unwrap();

    let parsed = ExifParser::new(&HeapPool).parse(&tiff).unwrap();
    assert_eq!(helpers::try_decode_short(parsed.get(keys::COLOR_SPACE).unwrap()), Some(0xFFFF));
}

#[test]
fn test_interop_only_creates_exif_directory() {
    let map = to_map(vec![entry(MetadataSection::Interop, 0x0001, TagDataType::Ascii, b"R98\0")]);
    let tiff = ExifWriter::new(map, None).write_tiff().unwrap();

    let parsed = ExifParser::new(&HeapPool).parse(&tiff).unwrap();
    assert_eq!(parsed.len(), 1);
    assert!(parsed.get(MetadataKey::new(MetadataSection::Interop, 0x0001)).is_some());
}

#[test]
fn test_caller_pointers_are_replaced() {
    let map = to_map(vec![
        entry(MetadataSection::Image, 0x8769, TagDataType::Long, &helpers::encode_long(9999)),
        entry(MetadataSection::Image, 0x0112, TagDataType::Short, &helpers::encode_short(1)),
        entry(MetadataSection::Image, 0x014A, TagDataType::Ifd, &helpers::encode_long(9999)),
    ]);
    let writer = ExifWriter::new(map, None);
    assert_eq!(writer.entry_count(), 1);

    let parsed = ExifParser::new(&HeapPool).parse(&writer.write_tiff().unwrap()).unwrap();
    assert_eq!(parsed.len(), 1);
}

#[test]
fn test_values_are_word_aligned() {
    let map = to_map(vec![
        entry(MetadataSection::Image, 0x010F, TagDataType::Ascii, b"Nikon"),
        entry(MetadataSection::Image, 0x0110, TagDataType::Ascii, b"Z 9\0\0\0\0"),
    ]);
    let tiff = ExifWriter::new(map, None).write_tiff().unwrap();

    // Header, IFD0 with two entries, then "Nikon" padded to 6 and the model
    let value_area = 8 + 2 + 24 + 4;
    assert_eq!(&tiff[value_area..value_area + 6], b"Nikon\0");
    assert_eq!(tiff.len(), value_area + 6 + 8);

    let model_offset = u32::from_le_bytes([tiff[8 + 2 + 12 + 8], tiff[8 + 2 + 12 + 9], tiff[8 + 2 + 12 + 10], tiff[8 + 2 + 12 + 11]]);
    assert_eq!(model_offset as usize, value_area + 6);
}

#[test]
fn test_ragged_payload_is_rejected() {
    let map = to_map(vec![entry(MetadataSection::Image, 0x0100, TagDataType::Short, &[1, 2, 3])]);
    let result = ExifWriter::new(map, None).write_tiff();
    assert!(matches!(result, Err(MetadataError::InvalidEntry(_))));
}
