//! Helpers for building and displaying EXIF entry payloads
//!
//! Payloads are little-endian, so these helpers never need to know which
//! byte order the source file used.

use byteorder::{ByteOrder, LittleEndian};

use crate::exif::entry::MetadataEntry;
use crate::exif::types::TagDataType;

/// Maximum number of values shown by [`format_value`]
const MAX_DISPLAYED_VALUES: usize = 8;

/// Payload of a single Short value
pub fn encode_short(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Payload of a single Long value
pub fn encode_long(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Reads the first value of a Short entry
///
/// # Returns
/// `None` if the entry is not a Short or holds no value
pub fn try_decode_short(entry: &MetadataEntry) -> Option<u16> {
    if entry.data_type() != TagDataType::Short || entry.len_in_bytes() < 2 {
        return None;
    }
    Some(LittleEndian::read_u16(entry.data()))
}

/// Reads the first value of a Long entry
pub fn try_decode_long(entry: &MetadataEntry) -> Option<u32> {
    if entry.data_type() != TagDataType::Long || entry.len_in_bytes() < 4 {
        return None;
    }
    Some(LittleEndian::read_u32(entry.data()))
}

/// Renders an entry's payload for display
///
/// Text is shown as-is, numbers as a comma separated list (truncated after a
/// few values), opaque data as a byte count.
pub fn format_value(entry: &MetadataEntry) -> String {
    let data = entry.data();
    let data_type = entry.data_type();

    let values: Vec<String> = match data_type {
        TagDataType::Ascii => {
            let text = String::from_utf8_lossy(data);
            return format!("\"{}\"", text.trim_end_matches('\0'));
        }
        TagDataType::Undefined => {
            if data.len() <= 4 {
                return data.iter().map(|b| format!("{:02X}", b)).collect::<Vec<_>>().join(" ");
            }
            return format!("({} bytes)", data.len());
        }
        TagDataType::Byte => data.iter().map(|b| b.to_string()).collect(),
        TagDataType::SByte => data.iter().map(|b| (*b as i8).to_string()).collect(),
        TagDataType::Short => data.chunks_exact(2).map(|c| LittleEndian::read_u16(c).to_string()).collect(),
        TagDataType::SShort => data.chunks_exact(2).map(|c| LittleEndian::read_i16(c).to_string()).collect(),
        TagDataType::Long | TagDataType::Ifd => {
            data.chunks_exact(4).map(|c| LittleEndian::read_u32(c).to_string()).collect()
        }
        TagDataType::SLong => data.chunks_exact(4).map(|c| LittleEndian::read_i32(c).to_string()).collect(),
        TagDataType::Float => data.chunks_exact(4).map(|c| LittleEndian::read_f32(c).to_string()).collect(),
        TagDataType::Double => data.chunks_exact(8).map(|c| LittleEndian::read_f64(c).to_string()).collect(),
        TagDataType::Rational => data
            .chunks_exact(8)
            .map(|c| format!("{}/{}", LittleEndian::read_u32(&c[..4]), LittleEndian::read_u32(&c[4..])))
            .collect(),
        TagDataType::SRational => data
            .chunks_exact(8)
            .map(|c| format!("{}/{}", LittleEndian::read_i32(&c[..4]), LittleEndian::read_i32(&c[4..])))
            .collect(),
    };

    if values.len() > MAX_DISPLAYED_VALUES {
        format!("{}, ... ({} values)", values[..MAX_DISPLAYED_VALUES].join(", "), values.len())
    } else {
        values.join(", ")
    }
}
