//! Seekable reader trait and implementations
//!
//! This module provides a unified trait for byte sources that support both
//! reading and seeking operations.

use std::io::{Read, Seek, SeekFrom};

/// Trait for byte sources that can both read and seek
///
/// The endian reader is generic over this trait so it can sit on top of
/// files, in-memory cursors, or borrowed streams alike.
pub trait SeekableReader: Read + Seek {
    /// Returns the total length of the source without moving the position
    fn stream_len(&mut self) -> std::io::Result<u64> {
        let current = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        if current != end {
            self.seek(SeekFrom::Start(current))?;
        }
        Ok(end)
    }
}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek + ?Sized> SeekableReader for T {}
