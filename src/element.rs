use std::io::{Read, Seek};

use super::config::DocumentConfig;
use super::errors::element::ElementError;
use super::errors::tool::ToolError;
use super::specs;
use super::tools;

///
/// Identifies an element within a [`Document`](crate::Document).
///
/// Handles are cheap to copy and never keep an element alive.  Once the element a handle refers to is released (for example when a Void element is absorbed into a neighbouring Void), the handle becomes stale and every lookup with it fails.
///
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    index: usize,
    generation: u32,
}

impl ElementHandle {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        ElementHandle {
            index,
            generation,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Children {
    Unpopulated,
    Populating,
    Populated(Vec<ElementHandle>),
}

///
/// A single node of the element tree.
///
/// An element describes a byte range of the document's stream: the header starts at [`position`](Element::position), the payload occupies [`size`](Element::size) bytes starting at [`data_offset`](Element::data_offset).  The root element has no header and covers the whole stream.
///
#[derive(Clone, Debug)]
pub struct Element {
    pub(crate) id: u64,
    pub(crate) position: u64,
    pub(crate) data: u64,
    pub(crate) size: u64,
    pub(crate) valid: bool,
    pub(crate) parent: Option<ElementHandle>,
    pub(crate) children: Children,
}

impl Element {
    pub(crate) fn root(size: u64, valid: bool) -> Self {
        Element {
            id: 0,
            position: 0,
            data: 0,
            size,
            valid,
            parent: None,
            children: Children::Unpopulated,
        }
    }

    ///
    /// Parses the header found at `position`.  The element must end at or before `limit`, the end of its parent's payload.
    ///
    pub(crate) fn read<R: Read + Seek>(source: &mut R, parent: ElementHandle, position: u64, limit: u64, config: &DocumentConfig) -> Result<Self, ElementError> {
        let (id, size_position) = tools::read_vint_from(source, position, false)
            .map_err(|source| ElementError::Vint { position, source })?;
        let id_width = (size_position - position) as usize;
        if id_width > config.max_id_width() {
            return Err(ElementError::IdTooWide { position, width: id_width, max: config.max_id_width() });
        }

        let (size, data) = tools::read_vint_from(source, size_position, true)
            .map_err(|source| ElementError::Vint { position, source })?;
        let size_width = (data - size_position) as usize;
        if size_width > config.max_size_width() {
            return Err(ElementError::SizeTooWide { position, width: size_width, max: config.max_size_width() });
        }

        let end = data.saturating_add(size);
        if end > limit {
            return Err(ElementError::RangeOverflow { position, end, limit });
        }

        let children = if id == specs::VOID {
            Children::Populated(Vec::new())
        } else {
            Children::Unpopulated
        };

        Ok(Element {
            id,
            position,
            data,
            size,
            valid: true,
            parent: Some(parent),
            children,
        })
    }

    ///
    /// Creates the in-memory node for an element whose header was just written.
    ///
    pub(crate) fn written(parent: ElementHandle, id: u64, position: u64, header_len: u64, size: u64) -> Self {
        let children = if size == 0 || id == specs::VOID {
            Children::Populated(Vec::new())
        } else {
            Children::Unpopulated
        };

        Element {
            id,
            position,
            data: position + header_len,
            size,
            valid: true,
            parent: Some(parent),
            children,
        }
    }

    /// The element id, including its length marker.  The root reports `0`.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Absolute offset of the element header.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Absolute offset of the element payload.
    pub fn data_offset(&self) -> u64 {
        self.data
    }

    /// Payload length in bytes, not including the header.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Absolute offset of the first byte after the element.
    pub fn end(&self) -> u64 {
        self.data + self.size
    }

    /// Header and payload length together.
    pub fn footprint(&self) -> u64 {
        self.end() - self.position
    }

    pub fn parent(&self) -> Option<ElementHandle> {
        self.parent
    }

    pub fn is_void(&self) -> bool {
        self.parent.is_some() && self.id == specs::VOID
    }

    pub fn is_populated(&self) -> bool {
        matches!(self.children, Children::Populated(_))
    }

    pub(crate) fn child_handles(&self) -> &[ElementHandle] {
        match &self.children {
            Children::Populated(children) => children,
            _ => &[],
        }
    }

    pub(crate) fn child_handles_mut(&mut self) -> Option<&mut Vec<ElementHandle>> {
        match &mut self.children {
            Children::Populated(children) => Some(children),
            _ => None,
        }
    }

    pub(crate) fn size_position(&self) -> Result<u64, ToolError> {
        Ok(self.position + tools::id_width(self.id)? as u64)
    }
}
