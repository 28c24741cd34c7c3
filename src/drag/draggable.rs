use egui::Pos2;

use super::callbacks::{GhostFactory, GhostSpec};
use super::ghost::Ghost;
use super::types::GhostIndex;
use crate::document::{ClassTokenSet, Document, DocumentError, NodeId};

/// Where an element sat before the gesture started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub parent: Option<NodeId>,
    pub index: usize,
}

impl Placement {
    pub(super) fn of(doc: &Document, element: NodeId) -> Self {
        Self {
            parent: doc.parent(element),
            index: doc.index_in_parent(element).unwrap_or(0),
        }
    }

    /// Puts `element` back into this slot (no-op if it is already there).
    pub(super) fn restore(&self, doc: &Document, element: NodeId) -> Result<(), DocumentError> {
        if Self::of(doc, element) == *self {
            return Ok(());
        }
        match self.parent {
            Some(parent) => doc.insert_child(parent, element, self.index),
            None => {
                doc.detach(element);
                Ok(())
            }
        }
    }
}

/// The element being dragged, as seen by every callback.
#[derive(Debug)]
pub struct Draggable {
    document: Document,
    identifier: Option<String>,
    element: NodeId,
    triggering_element: NodeId,
    origin: Pos2,
    home: Placement,
    class_list: ClassTokenSet,
    ghost: Option<Ghost>,
}

impl Draggable {
    pub(super) fn new(
        document: &Document,
        identifier: Option<String>,
        element: NodeId,
        triggering_element: NodeId,
        origin: Pos2,
    ) -> Self {
        Self {
            document: document.clone(),
            identifier,
            element,
            triggering_element,
            origin,
            home: Placement::of(document, element),
            class_list: ClassTokenSet::new(document, element),
            ghost: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The opaque token configured on the engine, if any.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    /// The exact element the press landed on (may be a descendant of [`Self::element`]).
    pub fn triggering_element(&self) -> NodeId {
        self.triggering_element
    }

    /// Pointer position at press time.
    pub fn origin(&self) -> Pos2 {
        self.origin
    }

    /// The source's original parent.
    pub fn parent(&self) -> Option<NodeId> {
        self.home.parent
    }

    /// The source's original sibling index.
    pub fn index(&self) -> usize {
        self.home.index
    }

    pub fn class_list(&self) -> &ClassTokenSet {
        &self.class_list
    }

    /// The ghost, once dragging has started.
    pub fn ghost(&self) -> Option<&Ghost> {
        self.ghost.as_ref()
    }

    /// Builds the ghost on first call; later calls return the same ghost.
    ///
    /// Without a factory the ghost is a deep clone of the source with every `id` stripped.
    pub(super) fn ensure_ghost(
        &mut self,
        factory: Option<&GhostFactory>,
        ghost_class: Option<&str>,
        dragged_class: Option<&str>,
    ) -> Result<&Ghost, DocumentError> {
        let Self {
            document,
            element,
            home,
            class_list,
            ghost,
            ..
        } = self;

        if ghost.is_none() {
            let spec = match factory {
                Some(factory) => factory(document, *element, home.index),
                None => {
                    let clone = document.deep_clone(*element)?;
                    let mut pending = vec![clone];
                    while let Some(node) = pending.pop() {
                        document.remove_attribute(node, "id");
                        pending.extend(document.children(node));
                    }
                    if let Some(dragged_class) = dragged_class {
                        document.remove_class(clone, dragged_class);
                    }
                    GhostSpec {
                        element: clone,
                        index: GhostIndex::End,
                    }
                }
            };

            let is_source = spec.element == *element;
            if is_source {
                // One element cannot be both "dragged in place" and the floating ghost.
                if let Some(dragged_class) = dragged_class {
                    class_list.remove(dragged_class);
                }
            }

            let new_ghost = Ghost::new(
                document,
                spec.element,
                spec.index,
                is_source.then_some(*home),
            );
            if let Some(ghost_class) = ghost_class {
                new_ghost.class_list().add(ghost_class);
            }
            *ghost = Some(new_ghost);
        }

        ghost.as_ref().ok_or(DocumentError::StaleNode(*element))
    }

    pub(super) fn reset_ghost(&self) {
        if let Some(ghost) = &self.ghost {
            ghost.reset();
        }
    }

    /// Moves the source element back to where it was pressed.
    pub(super) fn restore_position(&self) {
        if let Err(err) = self.home.restore(&self.document, self.element) {
            log::warn!("could not restore dragged element {:?}: {err}", self.element);
        }
    }
}
