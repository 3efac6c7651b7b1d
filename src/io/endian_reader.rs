//! Buffered endian-aware binary reader
//!
//! Reads fixed-width values in a configurable byte order from any seekable
//! source. Small reads are served from a scratch buffer of at most
//! [`MAX_BUFFER_SIZE`] bytes that is rented from an [`ArrayPool`]; seeks that
//! land inside the buffered window only move the cursor.

use std::io::SeekFrom;

use log::trace;

use crate::errors::{MetadataError, MetadataResult};
use crate::io::buffer_pool::{ArrayPool, PooledBuffer};
use crate::io::byte_order::Endianness;
use crate::io::seekable::SeekableReader;

/// Upper bound for the scratch buffer size
pub const MAX_BUFFER_SIZE: usize = 4096;

/// Buffered reader over a seekable byte source
///
/// The reader must not be shared between callers; every read moves its
/// cursor.
pub struct EndianBinaryReader<'p, R: SeekableReader> {
    stream: R,
    buffer: PooledBuffer<'p>,
    /// Position of the underlying source
    stream_position: u64,
    /// Cursor within the buffer
    read_offset: usize,
    /// Number of valid bytes in the buffer
    read_length: usize,
    length: u64,
    endianness: Endianness,
    leave_open: bool,
}

impl<'p, R: SeekableReader> EndianBinaryReader<'p, R> {
    /// Creates a reader that closes `stream` when released
    pub fn new(stream: R, endianness: Endianness, pool: &'p dyn ArrayPool) -> MetadataResult<Self> {
        Self::with_leave_open(stream, endianness, false, pool)
    }

    /// Creates a reader, choosing whether `into_inner` hands the stream back
    pub fn with_leave_open(
        mut stream: R,
        endianness: Endianness,
        leave_open: bool,
        pool: &'p dyn ArrayPool,
    ) -> MetadataResult<Self> {
        let length = SeekableReader::stream_len(&mut stream)?;
        let stream_position = stream.stream_position()?;
        let buffer_size = length.min(MAX_BUFFER_SIZE as u64) as usize;

        trace!("EndianBinaryReader: length={}, buffer={} bytes, {}",
               length, buffer_size, endianness.name());

        Ok(EndianBinaryReader {
            stream,
            buffer: PooledBuffer::new(pool, buffer_size),
            stream_position,
            read_offset: 0,
            read_length: 0,
            length,
            endianness,
            leave_open,
        })
    }

    /// Byte order used for multi-byte reads
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Total length of the underlying source
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Capacity of the scratch buffer
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.requested_length()
    }

    /// Absolute position of the next byte to be read
    pub fn position(&self) -> u64 {
        self.stream_position - (self.read_length - self.read_offset) as u64
    }

    /// Moves to an absolute position
    ///
    /// Positions inside the buffered window only move the cursor; anything
    /// else drops the buffer and seeks the source.
    pub fn set_position(&mut self, value: u64) -> MetadataResult<()> {
        let current = self.position();
        if value == current {
            return Ok(());
        }

        let buffer_start = current - self.read_offset as u64;
        let buffer_end = buffer_start + self.read_length as u64;

        if value >= buffer_start && value <= buffer_end {
            self.read_offset = (value - buffer_start) as usize;
        } else {
            self.invalidate_buffer();
            self.stream_position = self.stream.seek(SeekFrom::Start(value))?;
        }

        Ok(())
    }

    /// Reads a single byte
    pub fn read_u8(&mut self) -> MetadataResult<u8> {
        self.ensure_buffer(1)?;
        let value = self.buffer[self.read_offset];
        self.read_offset += 1;
        Ok(value)
    }

    /// Reads a u16 in the configured byte order
    pub fn read_u16(&mut self) -> MetadataResult<u16> {
        self.ensure_buffer(2)?;
        let value = self.endianness.compose_u16(&self.buffer[self.read_offset..]);
        self.read_offset += 2;
        Ok(value)
    }

    /// Reads a u32 in the configured byte order
    pub fn read_u32(&mut self) -> MetadataResult<u32> {
        self.ensure_buffer(4)?;
        let value = self.endianness.compose_u32(&self.buffer[self.read_offset..]);
        self.read_offset += 4;
        Ok(value)
    }

    /// Reads a u64 in the configured byte order
    pub fn read_u64(&mut self) -> MetadataResult<u64> {
        self.ensure_buffer(8)?;
        let value = self.endianness.compose_u64(&self.buffer[self.read_offset..]);
        self.read_offset += 8;
        Ok(value)
    }

    pub fn read_i16(&mut self) -> MetadataResult<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_i32(&mut self) -> MetadataResult<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_i64(&mut self) -> MetadataResult<i64> {
        Ok(self.read_u64()? as i64)
    }

    pub fn read_f32(&mut self) -> MetadataResult<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> MetadataResult<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Reads exactly `count` bytes into a new vector
    pub fn read_bytes(&mut self, count: usize) -> MetadataResult<Vec<u8>> {
        let mut bytes = vec![0u8; count];
        self.read_exact_into(&mut bytes)?;
        Ok(bytes)
    }

    /// Fills `bytes` completely or fails with `EndOfStream`
    pub fn read_exact_into(&mut self, bytes: &mut [u8]) -> MetadataResult<()> {
        let mut total = 0;
        while total < bytes.len() {
            let n = self.read_internal(&mut bytes[total..])?;
            if n == 0 {
                return Err(MetadataError::EndOfStream);
            }
            total += n;
        }

        Ok(())
    }

    /// Reads up to `bytes.len()` bytes, returning how many were read
    ///
    /// Returns 0 only at the end of the stream.
    pub fn read(&mut self, bytes: &mut [u8]) -> MetadataResult<usize> {
        self.read_internal(bytes)
    }

    /// Releases the scratch buffer and hands the source back
    ///
    /// Returns `None` (and drops the source) unless the reader was created
    /// with `leave_open`.
    pub fn into_inner(self) -> Option<R> {
        let EndianBinaryReader { stream, buffer, leave_open, .. } = self;
        buffer.release();

        if leave_open {
            Some(stream)
        } else {
            None
        }
    }

    fn invalidate_buffer(&mut self) {
        self.read_offset = 0;
        self.read_length = 0;
    }

    fn ensure_buffer(&mut self, count: usize) -> MetadataResult<()> {
        if self.read_offset + count > self.read_length {
            self.fill_buffer(count)?;
        }
        Ok(())
    }

    /// Refills the buffer so that at least `min_bytes` unread bytes are available
    fn fill_buffer(&mut self, min_bytes: usize) -> MetadataResult<()> {
        let bytes_unread = self.read_length - self.read_offset;
        if bytes_unread > 0 {
            self.buffer.copy_within(self.read_offset..self.read_length, 0);
        }
        self.invalidate_buffer();

        let capacity = self.buffer.len();
        let mut bytes_read = bytes_unread;
        while bytes_read < min_bytes {
            let n = self.stream.read(&mut self.buffer[bytes_read..capacity])?;
            if n == 0 {
                // Keep the tail readable for a later best-effort read
                self.read_length = bytes_read;
                return Err(MetadataError::EndOfStream);
            }
            bytes_read += n;
            self.stream_position += n as u64;
        }

        self.read_length = bytes_read;
        Ok(())
    }

    fn read_internal(&mut self, bytes: &mut [u8]) -> MetadataResult<usize> {
        let count = bytes.len();
        if count == 0 {
            return Ok(0);
        }

        if self.read_offset + count <= self.read_length {
            bytes.copy_from_slice(&self.buffer[self.read_offset..self.read_offset + count]);
            self.read_offset += count;
            return Ok(count);
        }

        // Drain whatever is still buffered, then go straight to the source
        let bytes_unread = self.read_length - self.read_offset;
        if bytes_unread > 0 {
            bytes[..bytes_unread].copy_from_slice(&self.buffer[self.read_offset..self.read_length]);
        }
        self.invalidate_buffer();

        let mut total = bytes_unread;
        while total < count {
            let n = self.stream.read(&mut bytes[total..])?;
            if n == 0 {
                break;
            }
            total += n;
            self.stream_position += n as u64;
        }

        Ok(total)
    }
}
