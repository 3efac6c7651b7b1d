//! Custom error types for metadata processing

use std::io;
use thiserror::Error;

/// Errors raised while reading or writing EXIF and XMP metadata
#[derive(Debug, Error)]
pub enum MetadataError {
    /// I/O error from the underlying source or sink
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Fewer bytes were available than the operation required
    #[error("Unexpected end of stream")]
    EndOfStream,
    /// Unrecognized byte order marker or corrupt TIFF magic
    #[error("Malformed TIFF header: {0}")]
    MalformedHeader(String),
    /// Extended XMP chunk that does not belong to the packet being rebuilt
    #[error("Inconsistent Extended XMP chunk: {0}")]
    InconsistentChunk(String),
    /// XMP document that is not well-formed XML or lacks an RDF element
    #[error("Malformed XMP: {0}")]
    MalformedXml(String),
    /// Metadata entry whose payload does not fit its declared type
    #[error("Invalid metadata entry: {0}")]
    InvalidEntry(String),
    /// JPEG marker segment that cannot be read or written
    #[error("Invalid JPEG segment: {0}")]
    InvalidSegment(String),
    /// Invalid tool configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// Generic error with message
    #[error("Metadata error: {0}")]
    Generic(String),
}

impl MetadataError {
    /// Whether the caller may continue with a reduced metadata set
    ///
    /// Chunk and XML problems only cost the Extended XMP portion of a packet;
    /// everything else aborts the surrounding operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MetadataError::InconsistentChunk(_) | MetadataError::MalformedXml(_))
    }
}

impl From<String> for MetadataError {
    fn from(msg: String) -> Self {
        MetadataError::Generic(msg)
    }
}

impl From<quick_xml::Error> for MetadataError {
    fn from(error: quick_xml::Error) -> Self {
        MetadataError::MalformedXml(error.to_string())
    }
}

/// Result type for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;
