use super::element::{Element, ElementHandle};

struct Slot {
    generation: u32,
    element: Option<Element>,
}

///
/// Generational storage for the elements of one document.
///
/// Released slots are reused, but every release bumps the slot's generation so that handles to the old element stop resolving.
///
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, element: Element) -> ElementHandle {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.element = Some(element);
                ElementHandle::new(index, slot.generation)
            },
            None => {
                self.slots.push(Slot { generation: 0, element: Some(element) });
                ElementHandle::new(self.slots.len() - 1, 0)
            }
        }
    }

    pub(crate) fn get(&self, handle: ElementHandle) -> Option<&Element> {
        self.slots.get(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.element.as_ref())
    }

    pub(crate) fn get_mut(&mut self, handle: ElementHandle) -> Option<&mut Element> {
        self.slots.get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.element.as_mut())
    }

    pub(crate) fn remove(&mut self, handle: ElementHandle) -> Option<Element> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        let element = slot.element.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        Some(element)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (ElementHandle, &mut Element)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.element.as_mut().map(|element| (ElementHandle::new(index, generation), element))
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}
