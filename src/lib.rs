pub mod errors;
pub mod io;
pub mod exif;
pub mod xmp;
pub mod jpeg;
pub mod pipeline;
pub mod utils;
pub mod commands;
pub mod api;

pub use crate::api::JpegMeta;
pub use crate::errors::{MetadataError, MetadataResult};

pub use exif::{ExifParser, ExifValueCollection, ExifWriter, MetadataEntry, MetadataKey, MetadataSection};
pub use jpeg::{ImageCodec, JpegSegmentCodec, MetadataPayloads};
pub use pipeline::LoadedImage;
pub use xmp::{ExtendedXmpData, XmlDocument};
