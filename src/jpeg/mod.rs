//! JPEG container handling for metadata payloads

pub mod codec;
pub mod segments;

#[cfg(test)]
pub(crate) mod tests;

pub use codec::{ChromaSubsampling, DecodedImage, EncodeOptions, ImageCodec, JpegSegmentCodec, MetadataPayloads};
pub use segments::{embed_metadata, extract_metadata};
