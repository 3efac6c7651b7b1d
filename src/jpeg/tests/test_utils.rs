//! Minimal JPEG streams for segment tests

use crate::jpeg::segments::{markers, write_segment};

/// SOI, JFIF APP0, a quantization table, one scan and EOI
pub fn bare_jpeg() -> Vec<u8> {
    let mut jpeg = vec![markers::PREFIX, markers::SOI];
    push_segment(&mut jpeg, markers::APP0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
    push_segment(&mut jpeg, 0xDB, &[0u8; 65]);
    push_scan(&mut jpeg);
    jpeg
}

/// SOS header, entropy-coded data with a stuffed byte and a restart marker, then EOI
pub fn push_scan(jpeg: &mut Vec<u8>) {
    push_segment(jpeg, markers::SOS, &[1, 1, 0, 0, 63, 0]);
    jpeg.extend_from_slice(&[0x12, 0xFF, 0x00, 0x34, 0xFF, 0xD0, 0x56]);
    jpeg.extend_from_slice(&[markers::PREFIX, markers::EOI]);
}

pub fn push_segment(jpeg: &mut Vec<u8>, marker: u8, body: &[u8]) {
    write_segment(jpeg, marker, body).unwrap();
}
