//! XMP packet constants

/// Signature of a standard XMP APP1 segment, NUL included
pub const STANDARD_XMP_SIGNATURE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

/// Signature of an Extended XMP APP1 segment, NUL included
pub const EXTENDED_XMP_SIGNATURE: &[u8] = b"http://ns.adobe.com/xmp/extension/\0";

/// Largest packet that still fits one APP1 segment with its signature
pub const MAX_STANDARD_PACKET_LENGTH: usize = 65_504 - 30;

/// Largest payload of one Extended XMP chunk
pub const MAX_EXTENDED_CHUNK_PAYLOAD: usize = 65_400;

/// Size of the standard packet written in front of Extended XMP
pub const STANDARD_STUB_TARGET_LENGTH: usize = 1024;

/// Length of the ASCII hex MD5 digest identifying an extended packet
pub const GUID_LENGTH: usize = 32;

/// GUID, full length and offset in front of each chunk payload
pub const EXTENDED_HEADER_LENGTH: usize = GUID_LENGTH + 4 + 4;

/// XML namespaces
pub mod ns {
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const X: &str = "adobe:ns:meta/";
    pub const XMP_NOTE: &str = "http://ns.adobe.com/xmp/note/";
}

/// Local element and attribute names
pub mod names {
    pub const XMPMETA: &str = "xmpmeta";
    pub const RDF: &str = "RDF";
    pub const DESCRIPTION: &str = "Description";
    pub const ABOUT: &str = "about";
    pub const HAS_EXTENDED_XMP: &str = "HasExtendedXMP";
}
