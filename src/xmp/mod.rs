//! XMP packet handling
//!
//! This module splits packets that are too large for one APP1 segment into
//! Extended XMP, reassembles the chunks on the way back in, and merges the
//! reassembled packet into the standard one.

pub mod constants;
pub mod chunk;
pub mod split;
pub mod recombine;
pub mod dom;
pub mod merge;
#[cfg(test)]
pub(crate) mod tests;

pub use chunk::ExtendedXmpChunk;
pub use dom::XmlDocument;
pub use merge::{merge, try_get_extended_xmp_guid};
pub use recombine::recombine;
pub use split::{add_signature_to_standard_packet, split, split_into_extended, ExtendedXmpData};

/// Removes the standard XMP signature from a segment body, if present
pub fn strip_standard_signature(segment: &[u8]) -> &[u8] {
    segment.strip_prefix(constants::STANDARD_XMP_SIGNATURE).unwrap_or(segment)
}
