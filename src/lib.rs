//! This crate provides a random access element tree over [EBML][EBML] files.  Its primary goal is to read and edit the metadata of EBML documents in place, without rewriting the whole file.
//!
//! [EBML][EBML] stands for Extensible Binary Meta-Language and is somewhat of a
//! binary version of XML. It's used for container formats like [WebM][webm] or
//! [MKV][mkv].
//!
//! # Overview
//! A [`Document`] takes ownership of a seekable [`Stream`] (a [`std::fs::File`] or a [`std::io::Cursor`] both work) and exposes its content as a tree of elements addressed by [`ElementHandle`]s.  Children are only read when they are first requested.  Elements can be added, rewritten, and removed; removed elements either become Void elements covering the same bytes (adjacent Void elements are merged) or are cut out of the stream entirely.
//!
//! The tree is schema-agnostic: element ids are plain `u64` values (including their length marker, as they appear in the file).  Only the ids the EBML format reserves for itself are defined in [`specs`].
//!
//! # Known Limitations
//! This library was not built to work with an "Unknown Data Size" as defined in [RFC8794][rfc8794].  It also does not try to resynchronize after a corrupt element header: the remaining children of the element holding the corrupt header are not read.
//!
//! [EBML]: http://ebml.sourceforge.net/
//! [webm]: https://www.webmproject.org/
//! [mkv]: http://www.matroska.org/technical/specs/index.html
//! [rfc8794]: https://datatracker.ietf.org/doc/rfc8794/
//!

mod arena;
mod config;
mod document;
mod element;
mod errors;
mod header;
mod stream;
mod void;
pub mod specs;
pub mod tools;

pub use self::config::DocumentConfig;
pub use self::document::Document;
pub use self::element::{Element, ElementHandle};
pub use self::header::EbmlHeader;
pub use self::stream::Stream;

pub mod error {
    pub use super::errors::tool::ToolError;
    pub use super::errors::element::ElementError;
    pub use super::errors::document::DocumentError;
    pub use super::errors::header::HeaderError;
}
