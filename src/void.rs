use tracing::{debug, trace};

use super::document::Document;
use super::element::{Children, Element, ElementHandle};
use super::errors::document::DocumentError;
use super::specs;
use super::stream::{self, Stream};
use super::tools;

impl<S: Stream> Document<S> {

    ///
    /// Removes one child of `handle`.  Returns `Ok(false)` if `child` is not a child of `handle`.
    ///
    /// With `use_void` the child is turned into a Void element covering the same bytes and merged with neighbouring Void elements; the handle then refers to that Void element.  Without it the child's bytes are cut out of the stream and the sizes of all ancestors shrink accordingly; the handle becomes stale.
    ///
    pub fn remove_child(&mut self, handle: ElementHandle, child: ElementHandle, use_void: bool) -> Result<bool, DocumentError> {
        self.populate(handle)?;
        if !self.node(handle)?.child_handles().contains(&child) {
            return Ok(false);
        }

        if use_void {
            self.make_void(handle, child)?;
        } else {
            self.cut_out(handle, child)?;
        }
        Ok(true)
    }

    ///
    /// Removes every child of `handle` with the given id.  Returns `Ok(false)` if there was none.
    ///
    pub fn remove_children_by_id(&mut self, handle: ElementHandle, id: u64, use_void: bool) -> Result<bool, DocumentError> {
        let targets = self.get_children_by_id(handle, id)?;
        for target in targets.iter().copied() {
            // Earlier removals may already have merged this one away.
            if self.arena.get(target).map_or(false, |element| element.id == id) {
                self.remove_child(handle, target, use_void)?;
            }
        }
        Ok(!targets.is_empty())
    }

    ///
    /// Removes every child of `handle`.  Returns `Ok(false)` if there was none.
    ///
    pub fn remove_children(&mut self, handle: ElementHandle, use_void: bool) -> Result<bool, DocumentError> {
        let targets = self.get_children(handle)?;
        for target in targets.iter().copied() {
            self.remove_child(handle, target, use_void)?;
        }
        Ok(!targets.is_empty())
    }

    fn make_void(&mut self, parent: ElementHandle, handle: ElementHandle) -> Result<(), DocumentError> {
        let element = self.node(handle)?;
        let (position, footprint) = (element.position, element.footprint());

        let header = tools::make_header(specs::VOID, footprint)?;
        self.write(position, &header)?;
        self.release_children(handle, Children::Populated(Vec::new()))?;

        let element = self.node_mut(handle)?;
        element.id = specs::VOID;
        element.data = position + header.len() as u64;
        element.size = footprint - header.len() as u64;
        element.valid = true;
        debug!(position, footprint, "Converted element to Void");

        self.merge_voids(parent, handle)
    }

    ///
    /// Merges `void` with adjacent Void siblings until none is left.  A preceding Void is absorbed before a following one.
    ///
    pub(crate) fn merge_voids(&mut self, parent: ElementHandle, void: ElementHandle) -> Result<(), DocumentError> {
        loop {
            let element = self.node(void)?;
            let (start, end) = (element.position, element.end());
            let siblings = self.node(parent)?.child_handles().to_vec();

            let (absorbed, union_start, union_end) = if let Some(preceding) = self.adjacent_void(&siblings, void, |sibling| sibling.end() == start) {
                (preceding, self.node(preceding)?.position, end)
            } else if let Some(following) = self.adjacent_void(&siblings, void, |sibling| sibling.position == end) {
                (following, start, self.node(following)?.end())
            } else {
                return Ok(());
            };

            let header = tools::make_header(specs::VOID, union_end - union_start)?;
            self.write(union_start, &header)?;
            self.release(absorbed);
            if let Some(children) = self.node_mut(parent)?.child_handles_mut() {
                children.retain(|child| *child != absorbed);
            }

            let element = self.node_mut(void)?;
            element.position = union_start;
            element.data = union_start + header.len() as u64;
            element.size = union_end - element.data;
            trace!(position = union_start, footprint = union_end - union_start, "Merged adjacent Void elements");
        }
    }

    fn adjacent_void(&self, siblings: &[ElementHandle], void: ElementHandle, is_adjacent: impl Fn(&Element) -> bool) -> Option<ElementHandle> {
        siblings.iter().copied().find(|sibling| {
            *sibling != void && self.arena.get(*sibling).map_or(false, |element| element.is_void() && is_adjacent(element))
        })
    }

    fn cut_out(&mut self, parent: ElementHandle, handle: ElementHandle) -> Result<(), DocumentError> {
        let element = self.node(handle)?;
        let (position, footprint) = (element.position, element.footprint());

        self.release(handle);
        if let Some(children) = self.node_mut(parent)?.child_handles_mut() {
            children.retain(|child| *child != handle);
        }

        stream::remove_range(&mut self.stream, position, footprint, self.config.buffer_len())
            .map_err(|source| DocumentError::WriteError { source })?;
        self.shift_after_remove(position, footprint);
        self.shrink(parent, footprint)?;

        debug!(position, footprint, "Cut element out of the stream");
        Ok(())
    }
}
