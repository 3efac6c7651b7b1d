//! Tests for the buffered endian reader

use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::errors::MetadataError;
use crate::io::buffer_pool::{HeapPool, RecyclingPool};
use crate::io::byte_order::Endianness;
use crate::io::endian_reader::{EndianBinaryReader, MAX_BUFFER_SIZE};

/// Source that hands out at most one byte per read call
struct TrickleSource {
    inner: Cursor<Vec<u8>>,
}

impl Read for TrickleSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let limit = buf.len().min(1);
        self.inner.read(&mut buf[..limit])
    }
}

impl Seek for TrickleSource {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.inner.seek(pos)
    }
}

fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}

#[test]
fn test_little_endian_values() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x1234).unwrap();
    buffer.write_u32::<LittleEndian>(0x12345678).unwrap();
    buffer.write_u64::<LittleEndian>(0x1234567890ABCDEF).unwrap();
    buffer.write_f32::<LittleEndian>(1.5).unwrap();
    buffer.write_f64::<LittleEndian>(-2.25).unwrap();
    buffer.write_i16::<LittleEndian>(-2).unwrap();

    let pool = HeapPool;
    let mut reader = EndianBinaryReader::new(Cursor::new(buffer), Endianness::Little, &pool).unwrap();

    assert_eq!(reader.read_u16().unwrap(), 0x1234);
    assert_eq!(reader.read_u32().unwrap(), 0x12345678);
    assert_eq!(reader.read_u64().unwrap(), 0x1234567890ABCDEF);
    assert_eq!(reader.read_f32().unwrap(), 1.5);
    assert_eq!(reader.read_f64().unwrap(), -2.25);
    assert_eq!(reader.read_i16().unwrap(), -2);
    assert!(matches!(reader.read_u8(), Err(MetadataError::EndOfStream)));
}

#[test]
fn test_big_endian_values() {
    let mut buffer = Vec::new();
    buffer.write_u16::<BigEndian>(0x1234).unwrap();
    buffer.write_u32::<BigEndian>(0x12345678).unwrap();
    buffer.write_u64::<BigEndian>(0x1234567890ABCDEF).unwrap();
    buffer.write_i32::<BigEndian>(-70000).unwrap();
    buffer.write_i64::<BigEndian>(-5).unwrap();

    let pool = HeapPool;
    let mut reader = EndianBinaryReader::new(Cursor::new(buffer), Endianness::Big, &pool).unwrap();

    assert_eq!(reader.read_u16().unwrap(), 0x1234);
    assert_eq!(reader.read_u32().unwrap(), 0x12345678);
    assert_eq!(reader.read_u64().unwrap(), 0x1234567890ABCDEF);
    assert_eq!(reader.read_i32().unwrap(), -70000);
    assert_eq!(reader.read_i64().unwrap(), -5);
}

#[test]
fn test_buffer_capacity_is_bounded_by_source() {
    let pool = HeapPool;
    let small = EndianBinaryReader::new(Cursor::new(vec![0u8; 10]), Endianness::Little, &pool).unwrap();
    assert_eq!(small.buffer_capacity(), 10);

    let large = EndianBinaryReader::new(Cursor::new(vec![0u8; 10_000]), Endianness::Little, &pool).unwrap();
    assert_eq!(large.buffer_capacity(), MAX_BUFFER_SIZE);
}

#[test]
fn test_mixed_width_reads_across_refills() {
    // Lengths on both sides of the buffer capacity, odd strides to straddle refills
    for len in [7usize, 64, 4095, 4096, 4097, 9000] {
        let data = patterned_bytes(len);
        let pool = HeapPool;
        let mut reader = EndianBinaryReader::new(Cursor::new(data.clone()), Endianness::Big, &pool).unwrap();

        let mut out = Vec::with_capacity(len);
        let widths = [1usize, 2, 4, 8, 3, 13, 5000];
        let mut i = 0;
        while out.len() < len {
            let remaining = len - out.len();
            let width = widths[i % widths.len()].min(remaining);
            match width {
                1 => out.push(reader.read_u8().unwrap()),
                2 => out.extend_from_slice(&reader.read_u16().unwrap().to_be_bytes()),
                4 => out.extend_from_slice(&reader.read_u32().unwrap().to_be_bytes()),
                8 => out.extend_from_slice(&reader.read_u64().unwrap().to_be_bytes()),
                n => out.extend_from_slice(&reader.read_bytes(n).unwrap()),
            }
            assert_eq!(reader.position(), out.len() as u64);
            i += 1;
        }

        assert_eq!(out, data, "length {}", len);
    }
}

#[test]
fn test_trickle_source_fills_buffer() {
    let data = patterned_bytes(300);
    let source = TrickleSource { inner: Cursor::new(data.clone()) };
    let pool = HeapPool;
    let mut reader = EndianBinaryReader::new(source, Endianness::Little, &pool).unwrap();

    assert_eq!(reader.read_u32().unwrap(), u32::from_le_bytes([data[0], data[1], data[2], data[3]]));
    let rest = reader.read_bytes(296).unwrap();
    assert_eq!(rest, &data[4..]);
}

#[test]
fn test_set_position_within_buffer_and_outside() {
    let data = patterned_bytes(6000);
    let pool = HeapPool;
    let mut reader = EndianBinaryReader::new(Cursor::new(data.clone()), Endianness::Little, &pool).unwrap();

    reader.read_u8().unwrap();
    reader.set_position(100).unwrap();
    assert_eq!(reader.position(), 100);
    assert_eq!(reader.read_u8().unwrap(), data[100]);

    // Backwards inside the window
    reader.set_position(2).unwrap();
    assert_eq!(reader.read_u16().unwrap(), u16::from_le_bytes([data[2], data[3]]));

    // Beyond the buffered window
    reader.set_position(5000).unwrap();
    assert_eq!(reader.position(), 5000);
    assert_eq!(reader.read_u8().unwrap(), data[5000]);

    // And back to the start
    reader.set_position(0).unwrap();
    assert_eq!(reader.read_u8().unwrap(), data[0]);
}

#[test]
fn test_exact_read_fails_at_end_of_stream() {
    let pool = HeapPool;
    let mut reader = EndianBinaryReader::new(Cursor::new(vec![1u8, 2, 3]), Endianness::Little, &pool).unwrap();
    assert!(matches!(reader.read_u32(), Err(MetadataError::EndOfStream)));

    // The unread tail is still there for a best-effort read
    let mut buf = [0u8; 8];
    assert_eq!(reader.read(&mut buf).unwrap(), 3);
    assert_eq!(&buf[..3], &[1, 2, 3]);
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_best_effort_read_returns_partial_count() {
    let data = patterned_bytes(50);
    let pool = HeapPool;
    let mut reader = EndianBinaryReader::new(Cursor::new(data.clone()), Endianness::Little, &pool).unwrap();
    reader.set_position(40).unwrap();

    let mut buf = [0u8; 20];
    assert_eq!(reader.read(&mut buf).unwrap(), 10);
    assert_eq!(&buf[..10], &data[40..]);

    let mut exact = [0u8; 1];
    assert!(matches!(reader.read_exact_into(&mut exact), Err(MetadataError::EndOfStream)));
}

#[test]
fn test_release_returns_buffer_and_honors_leave_open() {
    let pool = RecyclingPool::new(2);

    let reader = EndianBinaryReader::with_leave_open(Cursor::new(vec![0u8; 16]), Endianness::Big, true, &pool).unwrap();
    assert_eq!(pool.outstanding(), 1);
    let stream = reader.into_inner();
    assert!(stream.is_some());
    assert_eq!(pool.outstanding(), 0);

    let reader = EndianBinaryReader::new(Cursor::new(vec![0u8; 16]), Endianness::Big, &pool).unwrap();
    assert!(reader.into_inner().is_none());
    assert_eq!(pool.outstanding(), 0);
}

#[test]
fn test_reader_starts_at_the_source_position() {
    let data = patterned_bytes(64);
    let mut source = Cursor::new(data.clone());
    source.seek(SeekFrom::Start(10)).unwrap();

    let pool = HeapPool;
    let mut reader = EndianBinaryReader::new(source, Endianness::Little, &pool).unwrap();
    assert_eq!(reader.length(), 64);
    assert_eq!(reader.position(), 10);
    assert_eq!(reader.read_u8().unwrap(), data[10]);
}
