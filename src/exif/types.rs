//! Core EXIF metadata value types

use std::fmt;

use crate::errors::MetadataError;
use crate::exif::constants::{field_types, tags};

/// Logical IFD a tag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataSection {
    Image,
    Exif,
    Gps,
    Interop,
}

impl MetadataSection {
    /// All sections in serialization order
    pub const ALL: [MetadataSection; 4] = [
        MetadataSection::Image,
        MetadataSection::Exif,
        MetadataSection::Gps,
        MetadataSection::Interop,
    ];

    /// Tag of the pointer entry that leads to this section's IFD
    ///
    /// The Image section is IFD0 itself and has no pointer.
    pub fn pointer_tag(&self) -> Option<u16> {
        match self {
            MetadataSection::Image => None,
            MetadataSection::Exif => Some(tags::EXIF_IFD_POINTER),
            MetadataSection::Gps => Some(tags::GPS_IFD_POINTER),
            MetadataSection::Interop => Some(tags::INTEROP_IFD_POINTER),
        }
    }

    /// Section reached through a sub-IFD pointer tag
    pub fn from_pointer_tag(tag: u16) -> Option<Self> {
        match tag {
            tags::EXIF_IFD_POINTER => Some(MetadataSection::Exif),
            tags::GPS_IFD_POINTER => Some(MetadataSection::Gps),
            tags::INTEROP_IFD_POINTER => Some(MetadataSection::Interop),
            _ => None,
        }
    }

    /// Conventional group name of the section's directory
    pub fn group_name(&self) -> &'static str {
        match self {
            MetadataSection::Image => "IFD0",
            MetadataSection::Exif => "ExifIFD",
            MetadataSection::Gps => "GPS",
            MetadataSection::Interop => "InteropIFD",
        }
    }

    /// Parses the names used in configuration files
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "image" | "ifd0" => Some(MetadataSection::Image),
            "exif" | "exififd" => Some(MetadataSection::Exif),
            "gps" => Some(MetadataSection::Gps),
            "interop" | "interopifd" => Some(MetadataSection::Interop),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetadataSection::Image => "Image",
            MetadataSection::Exif => "Exif",
            MetadataSection::Gps => "Gps",
            MetadataSection::Interop => "Interop",
        };
        f.write_str(name)
    }
}

/// TIFF field type of a metadata value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TagDataType {
    Byte = field_types::BYTE,
    Ascii = field_types::ASCII,
    Short = field_types::SHORT,
    Long = field_types::LONG,
    Rational = field_types::RATIONAL,
    SByte = field_types::SBYTE,
    Undefined = field_types::UNDEFINED,
    SShort = field_types::SSHORT,
    SLong = field_types::SLONG,
    SRational = field_types::SRATIONAL,
    Float = field_types::FLOAT,
    Double = field_types::DOUBLE,
    Ifd = field_types::IFD,
}

impl TagDataType {
    /// Size in bytes of a single value of this type
    pub fn size_in_bytes(&self) -> u32 {
        match self {
            TagDataType::Byte | TagDataType::Ascii | TagDataType::SByte | TagDataType::Undefined => 1,
            TagDataType::Short | TagDataType::SShort => 2,
            TagDataType::Long | TagDataType::SLong | TagDataType::Float | TagDataType::Ifd => 4,
            TagDataType::Rational | TagDataType::SRational | TagDataType::Double => 8,
        }
    }

    /// Size of one byte-order sensitive element
    ///
    /// Rationals are two independent 32-bit halves.
    pub fn element_size(&self) -> u32 {
        match self {
            TagDataType::Rational | TagDataType::SRational => 4,
            _ => self.size_in_bytes(),
        }
    }

    /// Raw TIFF field type code
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Returns a human-readable name of this type
    pub fn name(&self) -> &'static str {
        match self {
            TagDataType::Byte => "BYTE",
            TagDataType::Ascii => "ASCII",
            TagDataType::Short => "SHORT",
            TagDataType::Long => "LONG",
            TagDataType::Rational => "RATIONAL",
            TagDataType::SByte => "SBYTE",
            TagDataType::Undefined => "UNDEFINED",
            TagDataType::SShort => "SSHORT",
            TagDataType::SLong => "SLONG",
            TagDataType::SRational => "SRATIONAL",
            TagDataType::Float => "FLOAT",
            TagDataType::Double => "DOUBLE",
            TagDataType::Ifd => "IFD",
        }
    }
}

impl TryFrom<u16> for TagDataType {
    type Error = MetadataError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let data_type = match value {
            field_types::BYTE => TagDataType::Byte,
            field_types::ASCII => TagDataType::Ascii,
            field_types::SHORT => TagDataType::Short,
            field_types::LONG => TagDataType::Long,
            field_types::RATIONAL => TagDataType::Rational,
            field_types::SBYTE => TagDataType::SByte,
            field_types::UNDEFINED => TagDataType::Undefined,
            field_types::SSHORT => TagDataType::SShort,
            field_types::SLONG => TagDataType::SLong,
            field_types::SRATIONAL => TagDataType::SRational,
            field_types::FLOAT => TagDataType::Float,
            field_types::DOUBLE => TagDataType::Double,
            field_types::IFD => TagDataType::Ifd,
            _ => return Err(MetadataError::InvalidEntry(format!("unsupported field type: {}", value))),
        };
        Ok(data_type)
    }
}

/// Identity of a metadata entry within one image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetadataKey {
    pub section: MetadataSection,
    pub tag_id: u16,
}

impl MetadataKey {
    pub const fn new(section: MetadataSection, tag_id: u16) -> Self {
        MetadataKey { section, tag_id }
    }

    /// Parses "Section:0xTAG" or "Section:TAG"
    pub fn parse(text: &str) -> Option<Self> {
        let (section, tag) = text.split_once(':')?;
        let section = MetadataSection::from_name(section.trim())?;
        let tag = tag.trim();
        let tag_id = match tag.strip_prefix("0x").or_else(|| tag.strip_prefix("0X")) {
            Some(hex) => u16::from_str_radix(hex, 16).ok()?,
            None => tag.parse().ok()?,
        };
        Some(MetadataKey::new(section, tag_id))
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Tag# {} (0x{:04X})", self.section, self.tag_id, self.tag_id)
    }
}

/// Well-known keys
pub mod keys {
    use super::{MetadataKey, MetadataSection};
    use crate::exif::constants::tags;

    pub const ORIENTATION: MetadataKey = MetadataKey::new(MetadataSection::Image, tags::ORIENTATION);
    pub const INTER_COLOR_PROFILE: MetadataKey = MetadataKey::new(MetadataSection::Image, tags::INTER_COLOR_PROFILE);
    pub const COLOR_SPACE: MetadataKey = MetadataKey::new(MetadataSection::Exif, tags::COLOR_SPACE);
}

/// Value of the Exif ColorSpace tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ExifColorSpace {
    Srgb = 1,
    Uncalibrated = 0xFFFF,
}

/// EXIF Orientation values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Orientation {
    TopLeft = 1,
    TopRight = 2,
    BottomRight = 3,
    BottomLeft = 4,
    LeftTop = 5,
    RightTop = 6,
    RightBottom = 7,
    LeftBottom = 8,
}

impl Orientation {
    pub fn from_value(value: u16) -> Option<Self> {
        match value {
            1 => Some(Orientation::TopLeft),
            2 => Some(Orientation::TopRight),
            3 => Some(Orientation::BottomRight),
            4 => Some(Orientation::BottomLeft),
            5 => Some(Orientation::LeftTop),
            6 => Some(Orientation::RightTop),
            7 => Some(Orientation::RightBottom),
            8 => Some(Orientation::LeftBottom),
            _ => None,
        }
    }

    /// Transform a viewer has to apply to display the image upright
    pub fn description(&self) -> &'static str {
        match self {
            Orientation::TopLeft => "Horizontal (normal)",
            Orientation::TopRight => "Mirror horizontal",
            Orientation::BottomRight => "Rotate 180",
            Orientation::BottomLeft => "Mirror vertical",
            Orientation::LeftTop => "Mirror horizontal and rotate 270 CW",
            Orientation::RightTop => "Rotate 90 CW",
            Orientation::RightBottom => "Mirror horizontal and rotate 90 CW",
            Orientation::LeftBottom => "Rotate 270 CW",
        }
    }
}
