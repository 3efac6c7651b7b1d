//! EXIF metadata model and TIFF IFD codec
//!
//! This module provides the value types for EXIF tags, the parser that
//! flattens an APP1 payload into an [`ExifValueCollection`], and the writer
//! that turns a set of entries back into a TIFF structure.

pub mod constants;
pub mod types;
pub mod entry;
pub mod collection;
pub mod ifd;
pub mod helpers;
pub mod tag_names;
pub mod parser;
pub mod writer;
#[cfg(test)]
pub(crate) mod tests;

pub use collection::ExifValueCollection;
pub use entry::MetadataEntry;
pub use ifd::{IFDEntry, IFD};
pub use parser::ExifParser;
pub use types::{keys, ExifColorSpace, MetadataKey, MetadataSection, Orientation, TagDataType};
pub use writer::ExifWriter;
