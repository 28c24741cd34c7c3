//! A small retained view tree that the drag engine operates on.
//!
//! [`Document`] is a cheap, clonable handle to an arena of nodes. Every operation borrows the
//! arena only for its own duration, so handles can be freely shared with consumer callbacks.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use egui::{Pos2, Rect};
use itertools::Itertools as _;

mod class_list;
mod selector;

pub use class_list::ClassTokenSet;
pub use selector::{Selector, SelectorError};

/// Handle to a node inside a [`Document`].
///
/// Slots of removed nodes are reused; the generation keeps an old handle from resolving to the
/// node that took its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// Kind of document-level listener registered while a gesture is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerMove,
    PointerUp,
    PointerDown,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("node {0:?} does not exist (or was removed)")]
    StaleNode(NodeId),

    #[error("cannot insert {child:?} into {parent:?}: it would become its own ancestor")]
    Cycle { parent: NodeId, child: NodeId },
}

#[derive(Clone, Debug)]
struct Node {
    tag: String,
    attributes: AHashMap<String, String>,
    classes: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Option<Rect>,
    hit_testable: bool,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: AHashMap::default(),
            classes: Vec::new(),
            parent: None,
            children: Vec::new(),
            rect: None,
            hit_testable: true,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug)]
struct Tree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
    outer_listeners: AHashMap<egui::Id, Vec<ListenerKind>>,
}

impl Tree {
    fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn node(&self, id: NodeId) -> Result<&Node, DocumentError> {
        self.get(id).ok_or(DocumentError::StaleNode(id))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Empties the slot of `id` and returns its node, if `id` is still live.
    fn free(&mut self, id: NodeId) -> Option<Node> {
        let slot = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(node)
    }

    fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.get_mut(id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent) = self.get_mut(parent) {
            parent.children.retain(|&c| c != id);
        }
    }

    fn hit_test(&self, id: NodeId, pos: Pos2) -> Option<NodeId> {
        let node = self.get(id)?;
        if !node.hit_testable {
            return None;
        }
        // Later siblings paint on top of earlier ones.
        for &child in node.children.iter().rev() {
            if let Some(hit) = self.hit_test(child, pos) {
                return Some(hit);
            }
        }
        node.rect.is_some_and(|r| r.contains(pos)).then_some(id)
    }
}

/// Shared handle to a retained tree of elements.
///
/// Cloning the handle is cheap; all clones see the same tree.
#[derive(Clone, Debug)]
pub struct Document {
    tree: Rc<RefCell<Tree>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document with a single `body` root node.
    pub fn new() -> Self {
        let mut tree = Tree {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            outer_listeners: AHashMap::default(),
        };
        tree.root = tree.alloc(Node::new("body"));
        Self {
            tree: Rc::new(RefCell::new(tree)),
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.borrow().root
    }

    /// Creates a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.tree.borrow_mut().alloc(Node::new(tag))
    }

    pub fn exists(&self, id: NodeId) -> bool {
        self.tree.borrow().get(id).is_some()
    }

    /// Number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.tree.borrow().live_count()
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.insert_child(parent, child, usize::MAX)
    }

    /// Inserts `child` into `parent` at `index`, detaching it from its previous parent first.
    ///
    /// An index past the end appends.
    pub fn insert_child(
        &self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), DocumentError> {
        let mut tree = self.tree.borrow_mut();
        tree.node(parent)?;
        tree.node(child)?;
        if tree.contains(child, parent) {
            return Err(DocumentError::Cycle { parent, child });
        }

        tree.detach(child);
        if let Some(node) = tree.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = tree.get_mut(parent) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
        Ok(())
    }

    /// Removes `id` from its parent, keeping the node (and its subtree) alive.
    pub fn detach(&self, id: NodeId) {
        self.tree.borrow_mut().detach(id);
    }

    /// Detaches `id` and frees its whole subtree. No-op on stale nodes.
    pub fn remove(&self, id: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if tree.get(id).is_none() || id == tree.root {
            return;
        }
        tree.detach(id);

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = tree.free(next) {
                stack.extend(node.children);
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.borrow().get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.tree.borrow().get(id).map_or(0, |n| n.children.len())
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let tree = self.tree.borrow();
        let parent = tree.get(id)?.parent?;
        tree.get(parent)?.children.iter().position(|&c| c == id)
    }

    /// Is `node` equal to, or a descendant of, `ancestor`?
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.borrow().contains(ancestor, node)
    }

    /// Is the node reachable from the document root?
    pub fn is_connected(&self, id: NodeId) -> bool {
        let tree = self.tree.borrow();
        tree.contains(tree.root, id)
    }

    pub fn tag(&self, id: NodeId) -> Option<String> {
        Some(self.tree.borrow().get(id)?.tag.clone())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        self.tree.borrow().get(id)?.attributes.get(name).cloned()
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(node) = self.tree.borrow_mut().get_mut(id) {
            node.attributes.insert(name.to_owned(), value.into());
        }
    }

    pub fn remove_attribute(&self, id: NodeId, name: &str) {
        if let Some(node) = self.tree.borrow_mut().get_mut(id) {
            node.attributes.remove(name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.tree
            .borrow()
            .get(id)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Adds `class` to the element. Returns `true` if it was not present before.
    pub fn add_class(&self, id: NodeId, class: &str) -> bool {
        let mut tree = self.tree.borrow_mut();
        let Some(node) = tree.get_mut(id) else {
            return false;
        };
        if node.classes.iter().any(|c| c == class) {
            return false;
        }
        node.classes.push(class.to_owned());
        true
    }

    /// Removes `class` from the element. Returns `true` if it was present.
    pub fn remove_class(&self, id: NodeId, class: &str) -> bool {
        let mut tree = self.tree.borrow_mut();
        let Some(node) = tree.get_mut(id) else {
            return false;
        };
        let before = node.classes.len();
        node.classes.retain(|c| c != class);
        node.classes.len() != before
    }

    pub fn classes(&self, id: NodeId) -> Vec<String> {
        self.tree
            .borrow()
            .get(id)
            .map(|n| n.classes.clone())
            .unwrap_or_default()
    }

    /// The `class` attribute as it would be serialized.
    pub fn class_attribute(&self, id: NodeId) -> String {
        self.tree
            .borrow()
            .get(id)
            .map(|n| n.classes.iter().join(" "))
            .unwrap_or_default()
    }

    /// Copies the subtree rooted at `id`. The copy is detached.
    pub fn deep_clone(&self, id: NodeId) -> Result<NodeId, DocumentError> {
        let mut tree = self.tree.borrow_mut();
        tree.node(id)?;

        fn clone_rec(tree: &mut Tree, id: NodeId, parent: Option<NodeId>) -> Option<NodeId> {
            let mut copy = tree.get(id)?.clone();
            let children = std::mem::take(&mut copy.children);
            copy.parent = parent;
            let new_id = tree.alloc(copy);
            for child in children {
                if let Some(child_copy) = clone_rec(tree, child, Some(new_id)) {
                    if let Some(node) = tree.get_mut(new_id) {
                        node.children.push(child_copy);
                    }
                }
            }
            Some(new_id)
        }

        clone_rec(&mut tree, id, None).ok_or(DocumentError::StaleNode(id))
    }

    pub fn set_rect(&self, id: NodeId, rect: Rect) {
        if let Some(node) = self.tree.borrow_mut().get_mut(id) {
            node.rect = Some(rect);
        }
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.tree.borrow().get(id)?.rect
    }

    /// Non hit-testable nodes (and their subtrees) are invisible to [`Self::element_from_point`].
    pub fn set_hit_testable(&self, id: NodeId, hit_testable: bool) {
        if let Some(node) = self.tree.borrow_mut().get_mut(id) {
            node.hit_testable = hit_testable;
        }
    }

    /// The deepest, top-most connected element whose rect contains `pos`.
    pub fn element_from_point(&self, pos: Pos2) -> Option<NodeId> {
        let tree = self.tree.borrow();
        tree.hit_test(tree.root, pos)
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        selector.matches(self, id)
    }

    pub fn add_outer_listener(&self, owner: egui::Id, kind: ListenerKind) {
        let mut tree = self.tree.borrow_mut();
        let kinds = tree.outer_listeners.entry(owner).or_default();
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    pub fn remove_outer_listeners(&self, owner: egui::Id) {
        self.tree.borrow_mut().outer_listeners.remove(&owner);
    }

    pub fn outer_listeners(&self, owner: egui::Id) -> Vec<ListenerKind> {
        self.tree
            .borrow()
            .outer_listeners
            .get(&owner)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_outer_listeners(&self) -> bool {
        !self.tree.borrow().outer_listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use egui::{Vec2, pos2};

    use super::*;

    fn list(doc: &Document, n: usize) -> (NodeId, Vec<NodeId>) {
        let ul = doc.create_element("ul");
        doc.append_child(doc.root(), ul).unwrap();
        let items = (0..n)
            .map(|_| {
                let li = doc.create_element("li");
                doc.append_child(ul, li).unwrap();
                li
            })
            .collect();
        (ul, items)
    }

    #[test]
    fn insert_child_moves_and_clamps() {
        let doc = Document::new();
        let (ul, items) = list(&doc, 3);

        doc.insert_child(ul, items[0], 99).unwrap();
        assert_eq!(doc.children(ul), vec![items[1], items[2], items[0]]);
        assert_eq!(doc.index_in_parent(items[0]), Some(2));

        doc.insert_child(ul, items[0], 0).unwrap();
        assert_eq!(doc.children(ul), items);
    }

    #[test]
    fn refuses_cycles() {
        let doc = Document::new();
        let (ul, items) = list(&doc, 1);
        assert_eq!(
            doc.append_child(items[0], ul),
            Err(DocumentError::Cycle {
                parent: items[0],
                child: ul
            })
        );
    }

    #[test]
    fn remove_frees_subtree() {
        let doc = Document::new();
        let (ul, items) = list(&doc, 2);
        doc.remove(ul);
        assert!(!doc.exists(ul));
        assert!(!doc.exists(items[1]));
        assert_eq!(doc.child_count(doc.root()), 0);

        // Removing twice is harmless.
        doc.remove(ul);
        assert_eq!(
            doc.append_child(doc.root(), ul),
            Err(DocumentError::StaleNode(ul))
        );
    }

    #[test]
    fn removed_slots_are_reused_without_aliasing() {
        let doc = Document::new();
        let (ul, _items) = list(&doc, 3);
        let slots = doc.tree.borrow().slots.len();
        assert_eq!(doc.node_count(), 5);

        for _ in 0..10 {
            let ghost = doc.deep_clone(ul).unwrap();
            doc.remove(ghost);
        }
        assert_eq!(doc.tree.borrow().slots.len(), slots + 4);
        assert_eq!(doc.node_count(), 5);

        let old = doc.create_element("div");
        doc.remove(old);
        let new = doc.create_element("span");
        assert_ne!(old, new);
        assert!(!doc.exists(old));
        assert_eq!(doc.tag(old), None);

        // A stale handle never reaches the node that took its slot.
        doc.add_class(old, "x");
        doc.remove(old);
        assert!(doc.exists(new));
        assert!(!doc.has_class(new, "x"));
    }

    #[test]
    fn deep_clone_is_detached_copy() {
        let doc = Document::new();
        let (ul, items) = list(&doc, 2);
        doc.add_class(items[0], "a");

        let copy = doc.deep_clone(ul).unwrap();
        assert_eq!(doc.parent(copy), None);
        assert!(!doc.is_connected(copy));
        let copied = doc.children(copy);
        assert_eq!(copied.len(), 2);
        assert_ne!(copied[0], items[0]);
        assert!(doc.has_class(copied[0], "a"));
    }

    #[test]
    fn classes_are_a_set() {
        let doc = Document::new();
        let el = doc.create_element("div");
        assert!(doc.add_class(el, "x"));
        assert!(!doc.add_class(el, "x"));
        doc.add_class(el, "y");
        assert_eq!(doc.class_attribute(el), "x y");
        assert!(doc.remove_class(el, "x"));
        assert!(!doc.remove_class(el, "x"));
        assert_eq!(doc.class_attribute(el), "y");
    }

    #[test]
    fn element_from_point_prefers_deepest_topmost() {
        let doc = Document::new();
        let (ul, items) = list(&doc, 2);
        let full = Rect::from_min_size(Pos2::ZERO, Vec2::splat(100.0));
        doc.set_rect(doc.root(), full);
        doc.set_rect(ul, full);
        doc.set_rect(items[0], Rect::from_min_size(Pos2::ZERO, Vec2::new(100.0, 50.0)));
        doc.set_rect(items[1], Rect::from_min_size(pos2(0.0, 40.0), Vec2::new(100.0, 50.0)));

        assert_eq!(doc.element_from_point(pos2(5.0, 10.0)), Some(items[0]));
        // Overlap: the later sibling is on top.
        assert_eq!(doc.element_from_point(pos2(5.0, 45.0)), Some(items[1]));
        assert_eq!(doc.element_from_point(pos2(5.0, 95.0)), Some(ul));

        doc.set_hit_testable(items[1], false);
        assert_eq!(doc.element_from_point(pos2(5.0, 45.0)), Some(items[0]));
        assert_eq!(doc.element_from_point(pos2(500.0, 500.0)), None);
    }

    #[test]
    fn outer_listeners_are_per_owner() {
        let doc = Document::new();
        let a = egui::Id::new("a");
        let b = egui::Id::new("b");
        doc.add_outer_listener(a, ListenerKind::PointerMove);
        doc.add_outer_listener(a, ListenerKind::PointerMove);
        doc.add_outer_listener(b, ListenerKind::PointerUp);
        assert_eq!(doc.outer_listeners(a), vec![ListenerKind::PointerMove]);

        doc.remove_outer_listeners(a);
        assert!(doc.outer_listeners(a).is_empty());
        assert!(doc.has_outer_listeners());
        doc.remove_outer_listeners(b);
        assert!(!doc.has_outer_listeners());
    }
}
