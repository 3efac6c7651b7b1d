//! Tests for the byte order module

use crate::errors::MetadataError;
use crate::io::byte_order::Endianness;

#[test]
fn test_byte_order_detection_little_endian() {
    assert_eq!(Endianness::detect(*b"II").unwrap(), Endianness::Little);
}

#[test]
fn test_byte_order_detection_big_endian() {
    assert_eq!(Endianness::detect(*b"MM").unwrap(), Endianness::Big);
}

#[test]
fn test_byte_order_detection_invalid() {
    let result = Endianness::detect([0x12, 0x34]);
    assert!(matches!(result, Err(MetadataError::MalformedHeader(_))));
}

#[test]
fn test_compose_values() {
    let bytes = [0x12, 0x34, 0x56, 0x78, 0x90, 0xAB, 0xCD, 0xEF];

    assert_eq!(Endianness::Big.compose_u16(&bytes), 0x1234);
    assert_eq!(Endianness::Little.compose_u16(&bytes), 0x3412);
    assert_eq!(Endianness::Big.compose_u32(&bytes), 0x12345678);
    assert_eq!(Endianness::Little.compose_u32(&bytes), 0x78563412);
    assert_eq!(Endianness::Big.compose_u64(&bytes), 0x1234567890ABCDEF);
    assert_eq!(Endianness::Little.compose_u64(&bytes), 0xEFCDAB9078563412);
}

#[test]
fn test_normalize_element() {
    let mut element = [0x00, 0x03];
    Endianness::Big.normalize_element(&mut element);
    assert_eq!(element, [0x03, 0x00]);

    let mut element = [0x03, 0x00];
    Endianness::Little.normalize_element(&mut element);
    assert_eq!(element, [0x03, 0x00]);
}
