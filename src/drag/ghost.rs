use std::cell::Cell;

use super::draggable::Placement;
use super::types::GhostIndex;
use crate::document::{ClassTokenSet, Document, DocumentError, NodeId};

/// The visual proxy of the dragged element.
///
/// Either a consumer-built element, a clone of the source, or the source element itself.
#[derive(Debug)]
pub struct Ghost {
    document: Document,
    element: NodeId,
    class_list: ClassTokenSet,
    index: Cell<GhostIndex>,

    /// Set when the ghost *is* the source element: where to put it back on reset.
    source_home: Option<Placement>,
}

impl Ghost {
    pub(super) fn new(
        document: &Document,
        element: NodeId,
        index: GhostIndex,
        source_home: Option<Placement>,
    ) -> Self {
        Self {
            document: document.clone(),
            element,
            class_list: ClassTokenSet::new(document, element),
            index: Cell::new(index),
            source_home,
        }
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    /// Classes the engine (or a consumer) applied to the ghost element.
    pub fn class_list(&self) -> &ClassTokenSet {
        &self.class_list
    }

    /// Desired insertion position inside whatever list holds the ghost.
    pub fn index(&self) -> GhostIndex {
        self.index.get()
    }

    pub fn set_index(&self, index: GhostIndex) {
        self.index.set(index);
    }

    /// Is the ghost the dragged source element itself?
    pub fn is_source(&self) -> bool {
        self.source_home.is_some()
    }

    /// Inserts the ghost into `parent` at its desired index.
    pub fn place_in(&self, parent: NodeId) -> Result<(), DocumentError> {
        self.document
            .insert_child(parent, self.element, self.index.get().as_insert_index())
    }

    /// Takes the ghost out of the tree.
    ///
    /// A source-element ghost goes back to its original slot and loses its ghost classes; any
    /// other ghost is discarded. Calling this again yields the same state.
    pub fn reset(&self) {
        match &self.source_home {
            Some(home) => {
                if let Err(err) = home.restore(&self.document, self.element) {
                    log::warn!("could not restore ghost source {:?}: {err}", self.element);
                }
                self.class_list.purge();
            }
            None => {
                self.class_list.purge();
                self.document.remove(self.element);
            }
        }
    }
}
