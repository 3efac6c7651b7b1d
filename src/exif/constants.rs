//! TIFF/EXIF format constants
//!
//! This module defines constants used throughout the EXIF processing code,
//! replacing magic numbers with descriptive names.

/// TIFF header constants
pub mod header {
    /// Standard TIFF version number (42)
    pub const TIFF_VERSION: u16 = 42;

    /// "II" byte order marker for little-endian
    pub const LITTLE_ENDIAN_MARKER: [u8; 2] = [0x49, 0x49];

    /// "MM" byte order marker for big-endian
    pub const BIG_ENDIAN_MARKER: [u8; 2] = [0x4D, 0x4D];

    /// Size of the TIFF header (marker, version, IFD0 offset)
    pub const TIFF_HEADER_SIZE: u32 = 8;

    /// Signature in front of the TIFF header inside an APP1 segment
    pub const EXIF_SIGNATURE: &[u8] = b"Exif\0\0";

    /// Variant signature written by some cameras
    pub const ALTERNATE_EXIF_SIGNATURE: &[u8] = b"Exif\0\xFF";
}

/// IFD layout constants
pub mod ifd {
    /// Size of one directory entry
    pub const ENTRY_SIZE: u32 = 12;

    /// Size of the entry count field
    pub const COUNT_SIZE: u32 = 2;

    /// Size of the next-IFD offset field
    pub const NEXT_OFFSET_SIZE: u32 = 4;

    /// Largest value stored inside the entry itself
    pub const INLINE_VALUE_SIZE: u32 = 4;
}

/// Field types as defined by TIFF 6.0
pub mod field_types {
    pub const BYTE: u16 = 1;       // 8-bit unsigned integer
    pub const ASCII: u16 = 2;      // 8-bit byte containing ASCII character
    pub const SHORT: u16 = 3;      // 16-bit unsigned integer
    pub const LONG: u16 = 4;       // 32-bit unsigned integer
    pub const RATIONAL: u16 = 5;   // Two LONGs: numerator and denominator
    pub const SBYTE: u16 = 6;      // 8-bit signed integer
    pub const UNDEFINED: u16 = 7;  // 8-bit byte with unspecified format
    pub const SSHORT: u16 = 8;     // 16-bit signed integer
    pub const SLONG: u16 = 9;      // 32-bit signed integer
    pub const SRATIONAL: u16 = 10; // Two SLONGs: numerator and denominator
    pub const FLOAT: u16 = 11;     // Single precision IEEE floating point
    pub const DOUBLE: u16 = 12;    // Double precision IEEE floating point
    pub const IFD: u16 = 13;       // 32-bit offset to a sub-IFD
}

/// Tags referenced by the parser, writer and pipeline
pub mod tags {
    // Sub-IFD pointers
    pub const EXIF_IFD_POINTER: u16 = 0x8769;
    pub const GPS_IFD_POINTER: u16 = 0x8825;
    pub const INTEROP_IFD_POINTER: u16 = 0xA005;

    // Image section
    pub const ORIENTATION: u16 = 0x0112;
    pub const INTER_COLOR_PROFILE: u16 = 0x8773;

    // Exif section
    pub const COLOR_SPACE: u16 = 0xA001;
}

/// JPEG segment limits
pub mod limits {
    /// Largest payload of a single marker segment (length field excluded)
    pub const MAX_SEGMENT_PAYLOAD: usize = 65_533;
}
