//!
//! Element ids reserved by the EBML format itself.
//!
//! Ids are stored with their length marker, exactly as they appear in the encoded data.  Document formats built on EBML (such as Matroska) define their own ids on top of these.
//!

/// The EBML header element.  Its encoded id doubles as the magic code at the start of every EBML document.
pub const EBML_HEADER: u64 = 0x1a45dfa3;

/// The EBML version used to create the document.
pub const EBML_VERSION: u64 = 0x4286;

/// The minimum EBML version a reader needs to read the document.
pub const EBML_READ_VERSION: u64 = 0x42f7;

/// The maximum id width (in bytes) used in the document.
pub const EBML_MAX_ID_WIDTH: u64 = 0x42f2;

/// The maximum size width (in bytes) used in the document.
pub const EBML_MAX_SIZE_WIDTH: u64 = 0x42f3;

/// A string naming the document format, e.g. `"matroska"` or `"webm"`.
pub const DOC_TYPE: u64 = 0x4282;

/// The version of the document format.
pub const DOC_TYPE_VERSION: u64 = 0x4287;

/// The minimum document format version a reader needs to read the document.
pub const DOC_TYPE_READ_VERSION: u64 = 0x4285;

/// Placeholder element.  Its payload has no meaning and must never be interpreted.
pub const VOID: u64 = 0xec;

///
/// Returns the 4 byte magic code every EBML document starts with.
///
pub fn magic() -> [u8; 4] {
    (EBML_HEADER as u32).to_be_bytes()
}
