//! Byte order handling for TIFF data
//!
//! EXIF payloads carry their own byte order in the TIFF header. This module
//! detects it and composes multi-byte values byte by byte in either order.

use crate::errors::{MetadataError, MetadataResult};
use crate::exif::constants::header;

/// Represents the byte order of a TIFF stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// Little-endian byte order (II)
    Little,
    /// Big-endian byte order (MM)
    Big,
}

impl Endianness {
    /// Detects the byte order from the two marker bytes of a TIFF header
    pub fn detect(marker: [u8; 2]) -> MetadataResult<Self> {
        match marker {
            header::LITTLE_ENDIAN_MARKER => Ok(Endianness::Little),
            header::BIG_ENDIAN_MARKER => Ok(Endianness::Big),
            _ => Err(MetadataError::MalformedHeader(format!(
                "invalid byte order marker: {:#04x} {:#04x}",
                marker[0], marker[1]
            ))),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            Endianness::Little => "Little Endian (II)",
            Endianness::Big => "Big Endian (MM)",
        }
    }

    /// Composes a u16 from the first two bytes of `bytes`
    pub fn compose_u16(&self, bytes: &[u8]) -> u16 {
        match self {
            Endianness::Big => ((bytes[0] as u16) << 8) | bytes[1] as u16,
            Endianness::Little => bytes[0] as u16 | ((bytes[1] as u16) << 8),
        }
    }

    /// Composes a u32 from the first four bytes of `bytes`
    pub fn compose_u32(&self, bytes: &[u8]) -> u32 {
        match self {
            Endianness::Big => {
                ((bytes[0] as u32) << 24)
                    | ((bytes[1] as u32) << 16)
                    | ((bytes[2] as u32) << 8)
                    | bytes[3] as u32
            }
            Endianness::Little => {
                bytes[0] as u32
                    | ((bytes[1] as u32) << 8)
                    | ((bytes[2] as u32) << 16)
                    | ((bytes[3] as u32) << 24)
            }
        }
    }

    /// Composes a u64 from the first eight bytes of `bytes`
    ///
    /// The value is assembled from two 32-bit halves.
    pub fn compose_u64(&self, bytes: &[u8]) -> u64 {
        let (hi, lo) = match self {
            Endianness::Big => (self.compose_u32(&bytes[0..4]), self.compose_u32(&bytes[4..8])),
            Endianness::Little => (self.compose_u32(&bytes[4..8]), self.compose_u32(&bytes[0..4])),
        };

        ((hi as u64) << 32) | lo as u64
    }

    /// Rewrites one element read in this byte order into little-endian order
    ///
    /// Used to normalize value payloads read from big-endian streams.
    pub fn normalize_element(&self, element: &mut [u8]) {
        if *self == Endianness::Big {
            element.reverse();
        }
    }
}
