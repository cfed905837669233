use tracing::{debug, trace, warn};

use super::arena::Arena;
use super::config::DocumentConfig;
use super::element::{Children, Element, ElementHandle};
use super::errors::document::DocumentError;
use super::specs;
use super::stream::{self, Stream};
use super::tools::{self, Vint};

///
/// An EBML document backed by a seekable stream.
///
/// The document owns the stream for its whole lifetime and exposes the stream content as a tree of elements.  The tree is read lazily: the children of an element are only parsed the first time they are requested.  Elements are addressed through [`ElementHandle`]s, starting from [`Self::get_document_root()`].  The root element has no header of its own and spans the whole stream.
///
/// Mutations ([`Self::add_element()`], the `set_as_*` methods and the `remove_*` methods) are written to the stream immediately.  They are not transactional: if the stream fails part way through, the on-disk tree can be left inconsistent.
///
/// ## Example
///
/// ```
/// use std::io::Cursor;
/// use ebml_tree::Document;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut document = Document::open(Cursor::new(Vec::new()));
/// assert!(!document.is_valid());
///
/// let root = document.get_document_root();
/// let tags = document.add_element(root, 0x1254c367)?;
/// let title = document.add_string(tags, 0x7ba9, "A title")?;
///
/// assert_eq!(Some(title), document.get_child(tags, 0x7ba9)?);
/// assert_eq!("A title", document.get_as_string(title)?);
/// # Ok(())
/// # }
/// ```
///
pub struct Document<S: Stream> {
    pub(crate) stream: S,
    pub(crate) arena: Arena,
    pub(crate) root: ElementHandle,
    pub(crate) config: DocumentConfig,
    pub(crate) header_valid: bool,
}

impl<S: Stream> Document<S> {

    ///
    /// Opens a document over `stream` using the default [`DocumentConfig`].
    ///
    /// Opening never fails.  Whether the stream holds a usable EBML document is reported by [`Self::is_valid()`], and [`Self::validate()`] tells why it does not.
    ///
    pub fn open(stream: S) -> Self {
        Document::with_config(stream, DocumentConfig::default())
    }

    ///
    /// Opens a document over `stream` using the given configuration.
    ///
    pub fn with_config(mut stream: S, config: DocumentConfig) -> Self {
        let root = match stream::stream_length(&mut stream) {
            Ok(len) => Element::root(len, true),
            Err(err) => {
                warn!(error = %err, "Could not determine stream length");
                Element::root(0, false)
            }
        };

        let mut arena = Arena::new();
        let root = arena.insert(root);
        let mut document = Document {
            stream,
            arena,
            root,
            config,
            header_valid: false,
        };
        document.file_valid();
        document
    }

    ///
    /// Consumes the document and hands back the stream.
    ///
    pub fn into_inner(self) -> S {
        self.stream
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    ///
    /// Returns the header-less element that spans the whole stream.
    ///
    pub fn get_document_root(&self) -> ElementHandle {
        self.root
    }

    ///
    /// Returns the verdict of the last EBML header validation.  Callers should check this before trusting anything read from the tree.
    ///
    pub fn is_valid(&self) -> bool {
        self.header_valid
    }

    ///
    /// Returns a read-only view of an element, or `None` if the handle is stale.
    ///
    pub fn element(&self, handle: ElementHandle) -> Option<&Element> {
        self.arena.get(handle)
    }

    ///
    /// Returns how many elements are currently held in memory.  Only elements that were read or written so far count.
    ///
    pub fn element_count(&self) -> usize {
        self.arena.len()
    }

    ///
    /// Returns true if the element's header was read or written without error and fits its parent.  For the root this only reflects whether the stream could be read.  Stale handles are never valid.
    ///
    pub fn valid(&self, handle: ElementHandle) -> bool {
        self.arena.get(handle).map_or(false, |element| element.valid)
    }

    pub fn get_parent(&self, handle: ElementHandle) -> Option<ElementHandle> {
        self.arena.get(handle).and_then(|element| element.parent)
    }

    ///
    /// Returns the first child with the given id.
    ///
    pub fn get_child(&mut self, handle: ElementHandle, id: u64) -> Result<Option<ElementHandle>, DocumentError> {
        self.populate(handle)?;
        let arena = &self.arena;
        Ok(self.node(handle)?.child_handles().iter()
            .copied()
            .find(|child| arena.get(*child).map_or(false, |element| element.id == id)))
    }

    ///
    /// Returns all children with the given id, in stream order.
    ///
    pub fn get_children_by_id(&mut self, handle: ElementHandle, id: u64) -> Result<Vec<ElementHandle>, DocumentError> {
        self.populate(handle)?;
        let arena = &self.arena;
        Ok(self.node(handle)?.child_handles().iter()
            .copied()
            .filter(|child| arena.get(*child).map_or(false, |element| element.id == id))
            .collect())
    }

    ///
    /// Returns all children, in stream order.  Void elements are included.
    ///
    pub fn get_children(&mut self, handle: ElementHandle) -> Result<Vec<ElementHandle>, DocumentError> {
        self.populate(handle)?;
        Ok(self.node(handle)?.child_handles().to_vec())
    }

    ///
    /// Returns the raw payload.  If the stream ends early, only the available bytes are returned.
    ///
    pub fn get_as_binary(&mut self, handle: ElementHandle) -> Result<Vec<u8>, DocumentError> {
        let element = self.node(handle)?;
        let (data, size) = (element.data, element.size);
        self.read(data, size)
    }

    ///
    /// Returns the payload interpreted as UTF-8.  Trailing zero padding is dropped.
    ///
    pub fn get_as_string(&mut self, handle: ElementHandle) -> Result<String, DocumentError> {
        let mut binary = self.get_as_binary(handle)?;
        while binary.last() == Some(&0) {
            binary.pop();
        }
        String::from_utf8(binary).map_err(|source| DocumentError::Utf8ParseError { source })
    }

    ///
    /// Returns the payload interpreted as a big-endian signed integer.  Only the first 8 bytes are considered, and an empty payload reads as `0`.
    ///
    pub fn get_as_int(&mut self, handle: ElementHandle) -> Result<i64, DocumentError> {
        let binary = self.get_as_binary(handle)?;
        Ok(tools::arr_to_i64(&binary[..binary.len().min(8)])?)
    }

    ///
    /// Returns the payload interpreted as a big-endian unsigned integer.  Only the first 8 bytes are considered, and an empty payload reads as `0`.
    ///
    pub fn get_as_unsigned(&mut self, handle: ElementHandle) -> Result<u64, DocumentError> {
        let binary = self.get_as_binary(handle)?;
        Ok(tools::arr_to_u64(&binary[..binary.len().min(8)])?)
    }

    ///
    /// Returns the payload interpreted as a float.  Payloads of 4, 8 and 10 bytes are read as single, double and extended precision values; any other length reads as `0.0`.
    ///
    pub fn get_as_float(&mut self, handle: ElementHandle) -> Result<f64, DocumentError> {
        let binary = self.get_as_binary(handle)?;
        match tools::arr_to_f64(&binary) {
            Ok(value) => Ok(value),
            Err(err) => {
                debug!(error = %err, "Float payload has an unsupported width, reading as 0.0");
                Ok(0.0)
            }
        }
    }

    ///
    /// Appends an empty element with the given id to the children of `handle` and returns the new child.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Vint`] if `id` does not carry a length marker that matches its width, and [`DocumentError::VoidElement`] if `handle` is a Void element.
    ///
    pub fn add_element(&mut self, handle: ElementHandle, id: u64) -> Result<ElementHandle, DocumentError> {
        self.insert_child(handle, id, &[])
    }

    ///
    /// Appends an element holding `binary` to the children of `handle` and returns the new child.
    ///
    pub fn add_binary(&mut self, handle: ElementHandle, id: u64, binary: &[u8]) -> Result<ElementHandle, DocumentError> {
        self.insert_child(handle, id, binary)
    }

    pub fn add_string(&mut self, handle: ElementHandle, id: u64, string: &str) -> Result<ElementHandle, DocumentError> {
        self.insert_child(handle, id, string.as_bytes())
    }

    /// The value is written as a full 8 byte big-endian integer.
    pub fn add_int(&mut self, handle: ElementHandle, id: u64, number: i64) -> Result<ElementHandle, DocumentError> {
        self.insert_child(handle, id, &number.to_be_bytes())
    }

    /// The value is written as a full 8 byte big-endian integer.
    pub fn add_unsigned(&mut self, handle: ElementHandle, id: u64, number: u64) -> Result<ElementHandle, DocumentError> {
        self.insert_child(handle, id, &number.to_be_bytes())
    }

    /// The value is written as an 8 byte double.
    pub fn add_float(&mut self, handle: ElementHandle, id: u64, number: f64) -> Result<ElementHandle, DocumentError> {
        self.insert_child(handle, id, &number.to_be_bytes())
    }

    ///
    /// Replaces the payload of an element.
    ///
    /// A payload of the same length is overwritten in place.  A longer payload makes room by moving the rest of the stream and growing the element and all of its ancestors.  A shorter payload leaves a Void element behind in the freed space so nothing else moves; a Void element keeps its footprint instead.  Any children previously read from the old payload are released.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::RootElement`] when called on the root.
    ///
    pub fn set_as_binary(&mut self, handle: ElementHandle, binary: &[u8]) -> Result<(), DocumentError> {
        let element = self.node(handle)?;
        let parent = element.parent.ok_or(DocumentError::RootElement)?;
        let (old_size, end, is_void) = (element.size, element.end(), element.is_void());
        let new_size = binary.len() as u64;

        let state = if new_size == 0 || is_void {
            Children::Populated(Vec::new())
        } else {
            Children::Unpopulated
        };
        self.release_children(handle, state)?;

        if new_size > old_size {
            let delta = new_size - old_size;
            self.open_gap(end, delta)?;
            self.grow(handle, delta)?;
        } else if new_size < old_size && !is_void {
            self.shrink_in_place(parent, handle, new_size)?;
        }

        let data = self.node(handle)?.data;
        self.write(data, binary)
    }

    pub fn set_as_string(&mut self, handle: ElementHandle, string: &str) -> Result<(), DocumentError> {
        self.set_as_binary(handle, string.as_bytes())
    }

    pub fn set_as_int(&mut self, handle: ElementHandle, number: i64) -> Result<(), DocumentError> {
        self.set_as_binary(handle, &number.to_be_bytes())
    }

    pub fn set_as_unsigned(&mut self, handle: ElementHandle, number: u64) -> Result<(), DocumentError> {
        self.set_as_binary(handle, &number.to_be_bytes())
    }

    pub fn set_as_float(&mut self, handle: ElementHandle, number: f64) -> Result<(), DocumentError> {
        self.set_as_binary(handle, &number.to_be_bytes())
    }

    fn insert_child(&mut self, parent: ElementHandle, id: u64, payload: &[u8]) -> Result<ElementHandle, DocumentError> {
        if self.node(parent)?.is_void() {
            return Err(DocumentError::VoidElement);
        }
        let header = tools::encode_header(id, payload.len() as u64)?;
        self.populate(parent)?;

        let position = self.node(parent)?.end();
        let footprint = (header.len() + payload.len()) as u64;
        self.open_gap(position, footprint)?;

        let mut bytes = header.clone();
        bytes.extend_from_slice(payload);
        self.write(position, &bytes)?;

        let child = self.arena.insert(Element::written(parent, id, position, header.len() as u64, payload.len() as u64));
        if let Some(children) = self.node_mut(parent)?.child_handles_mut() {
            children.push(child);
        }
        self.grow(parent, footprint)?;

        debug!(id, position, size = payload.len(), "Added element");
        Ok(child)
    }

    // Shortens the payload without moving anything after the element.
    fn shrink_in_place(&mut self, parent: ElementHandle, handle: ElementHandle, new_size: u64) -> Result<(), DocumentError> {
        let element = self.node(handle)?;
        let size_position = element.size_position()?;
        let (data, old_size) = (element.data, element.size);
        let width = (data - size_position) as usize;
        let freed = old_size - new_size;

        if freed == 1 {
            // Too small for a Void element.  Widen the size field to absorb the byte.
            if width < 8 {
                let encoded = new_size.as_vint_with_length(width + 1)?;
                self.write(size_position, &encoded)?;
                let element = self.node_mut(handle)?;
                element.data += 1;
                element.size = new_size;
            } else {
                let cut = data + new_size;
                stream::remove_range(&mut self.stream, cut, 1, self.config.buffer_len())
                    .map_err(|source| DocumentError::WriteError { source })?;
                self.shift_after_remove(cut, 1);
                self.shrink(handle, 1)?;
            }
            return Ok(());
        }

        let encoded = new_size.as_vint_with_length(width)?;
        self.write(size_position, &encoded)?;
        self.node_mut(handle)?.size = new_size;

        let filler_position = data + new_size;
        let header = tools::make_header(specs::VOID, freed)?;
        self.write(filler_position, &header)?;
        let header_len = header.len() as u64;
        let filler = self.arena.insert(Element::written(parent, specs::VOID, filler_position, header_len, freed - header_len));
        if let Some(children) = self.node_mut(parent)?.child_handles_mut() {
            let index = children.iter().position(|child| *child == handle).map_or(children.len(), |index| index + 1);
            children.insert(index, filler);
        }

        self.merge_voids(parent, filler)
    }

    pub(crate) fn node(&self, handle: ElementHandle) -> Result<&Element, DocumentError> {
        self.arena.get(handle).ok_or(DocumentError::StaleHandle)
    }

    pub(crate) fn node_mut(&mut self, handle: ElementHandle) -> Result<&mut Element, DocumentError> {
        self.arena.get_mut(handle).ok_or(DocumentError::StaleHandle)
    }

    pub(crate) fn read(&mut self, position: u64, len: u64) -> Result<Vec<u8>, DocumentError> {
        stream::read_block(&mut self.stream, position, len).map_err(|source| DocumentError::ReadError { source })
    }

    pub(crate) fn write(&mut self, position: u64, bytes: &[u8]) -> Result<(), DocumentError> {
        stream::write_block(&mut self.stream, position, bytes).map_err(|source| DocumentError::WriteError { source })
    }

    ///
    /// Reads the children of an element, once.  A header that cannot be parsed, or that does not fit the element, ends the scan: everything after it is left unread.
    ///
    pub(crate) fn populate(&mut self, handle: ElementHandle) -> Result<(), DocumentError> {
        let element = self.node_mut(handle)?;
        match element.children {
            Children::Populated(_) => return Ok(()),
            Children::Populating => return Err(DocumentError::PopulationInProgress),
            Children::Unpopulated => {}
        }
        element.children = Children::Populating;

        let (mut offset, end) = (element.data, element.end());
        let mut children = Vec::new();
        while offset < end {
            match Element::read(&mut self.stream, handle, offset, end, &self.config) {
                Ok(child) => {
                    offset = child.end();
                    children.push(self.arena.insert(child));
                },
                Err(err) => {
                    debug!(position = offset, error = %err, "Stopped reading children at malformed element header");
                    break;
                }
            }
        }

        let element = self.node_mut(handle)?;
        trace!(position = element.position, children = children.len(), "Populated element");
        element.children = Children::Populated(children);
        Ok(())
    }

    ///
    /// Drops an element and everything below it from memory.  The stream is left untouched.
    ///
    pub(crate) fn release(&mut self, handle: ElementHandle) {
        let mut pending = vec![handle];
        while let Some(handle) = pending.pop() {
            if let Some(element) = self.arena.remove(handle) {
                if let Children::Populated(children) = element.children {
                    pending.extend(children);
                }
            }
        }
    }

    pub(crate) fn release_children(&mut self, handle: ElementHandle, state: Children) -> Result<(), DocumentError> {
        let previous = std::mem::replace(&mut self.node_mut(handle)?.children, state);
        if let Children::Populated(children) = previous {
            for child in children {
                self.release(child);
            }
        }
        Ok(())
    }

    ///
    /// Opens `len` bytes of room at `at`, moving everything behind it, and updates the offsets of every element in memory.  The sizes of enclosing elements are not touched.
    ///
    pub(crate) fn open_gap(&mut self, at: u64, len: u64) -> Result<(), DocumentError> {
        stream::insert_gap(&mut self.stream, at, len, self.config.buffer_len())
            .map_err(|source| DocumentError::WriteError { source })?;
        self.shift_after_insert(at, len);
        Ok(())
    }

    fn shift_after_insert(&mut self, at: u64, len: u64) {
        let root = self.root;
        for (handle, element) in self.arena.iter_mut() {
            if handle == root {
                continue;
            }
            if element.position >= at {
                element.position += len;
                element.data += len;
            } else if element.data > at {
                // The gap was opened inside this element's header.
                element.data += len;
            }
        }
    }

    pub(crate) fn shift_after_remove(&mut self, at: u64, len: u64) {
        let root = self.root;
        for (handle, element) in self.arena.iter_mut() {
            if handle != root && element.position >= at + len {
                element.position -= len;
                element.data -= len;
            }
        }
    }

    ///
    /// Adds `delta` to the size of an element and of every ancestor.  A size field that becomes too narrow is widened, which moves the stream again and is added to the growth of the ancestors.
    ///
    pub(crate) fn grow(&mut self, handle: ElementHandle, delta: u64) -> Result<(), DocumentError> {
        let mut delta = delta;
        let mut current = Some(handle);
        while let Some(handle) = current {
            let element = self.node(handle)?;
            let parent = element.parent;
            if parent.is_none() {
                self.node_mut(handle)?.size += delta;
                break;
            }

            let size_position = element.size_position()?;
            let width = (element.data - size_position) as usize;
            let new_size = element.size + delta;
            let encoded = match new_size.as_vint_with_length(width) {
                Ok(encoded) => encoded,
                Err(_) => {
                    let encoded = new_size.as_vint()?;
                    let extra = (encoded.len() - width) as u64;
                    self.open_gap(size_position, extra)?;
                    trace!(position = size_position, width = encoded.len(), "Widened element size field");
                    delta += extra;
                    encoded
                }
            };
            self.write(size_position, &encoded)?;
            self.node_mut(handle)?.size = new_size;
            current = parent;
        }
        Ok(())
    }

    ///
    /// Subtracts `delta` from the size of an element and of every ancestor.  Size fields keep their width.
    ///
    pub(crate) fn shrink(&mut self, handle: ElementHandle, delta: u64) -> Result<(), DocumentError> {
        let mut current = Some(handle);
        while let Some(handle) = current {
            let element = self.node(handle)?;
            let parent = element.parent;
            let new_size = element.size.checked_sub(delta).ok_or(DocumentError::SizeUnderflow {
                position: element.position,
                size: element.size,
                delta,
            })?;
            if parent.is_some() {
                let size_position = element.size_position()?;
                let width = (element.data - size_position) as usize;
                let encoded = new_size.as_vint_with_length(width)?;
                self.write(size_position, &encoded)?;
            }
            self.node_mut(handle)?.size = new_size;
            current = parent;
        }
        Ok(())
    }
}
