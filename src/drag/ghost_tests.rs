use std::cell::Cell;
use std::rc::Rc;

use egui::pos2;

use super::callbacks::{GhostFactory, GhostSpec};
use super::draggable::Draggable;
use super::types::GhostIndex;
use crate::document::{Document, NodeId};

struct List {
    doc: Document,
    ul: NodeId,
    items: Vec<NodeId>,
}

fn list_of(n: usize) -> List {
    let doc = Document::new();
    let ul = doc.create_element("ul");
    doc.append_child(doc.root(), ul).unwrap();
    let items = (0..n)
        .map(|i| {
            let li = doc.create_element("li");
            doc.set_attribute(li, "id", format!("item-{i}"));
            doc.append_child(ul, li).unwrap();
            li
        })
        .collect();
    List { doc, ul, items }
}

fn draggable(list: &List, index: usize) -> Draggable {
    let source = list.items[index];
    Draggable::new(&list.doc, None, source, source, pos2(0.0, 0.0))
}

#[test]
fn default_ghost_is_a_detached_clone_appended_at_end() {
    let list = list_of(5);
    let handle = list.doc.create_element("span");
    list.doc.set_attribute(handle, "id", "handle-2");
    list.doc.append_child(list.items[2], handle).unwrap();
    let mut drag = draggable(&list, 2);
    drag.class_list().add("dragging");

    let ghost = drag
        .ensure_ghost(None, Some("ghost"), Some("dragging"))
        .unwrap();
    let ghost_el = ghost.element();

    assert_ne!(ghost_el, list.items[2]);
    assert!(!ghost.is_source());
    assert_eq!(ghost.index(), GhostIndex::End);
    assert_eq!(list.doc.parent(ghost_el), None);
    assert_eq!(list.doc.attribute(ghost_el, "id"), None);
    let ghost_handle = list.doc.children(ghost_el)[0];
    assert_eq!(list.doc.tag(ghost_handle).as_deref(), Some("span"));
    assert_eq!(list.doc.attribute(ghost_handle, "id"), None);
    assert_eq!(list.doc.attribute(list.items[2], "id").as_deref(), Some("item-2"));
    assert_eq!(list.doc.attribute(handle, "id").as_deref(), Some("handle-2"));
    assert!(list.doc.has_class(ghost_el, "ghost"));
    assert!(
        !list.doc.has_class(ghost_el, "dragging"),
        "the clone must not render as dragged-in-place"
    );
    assert!(list.doc.has_class(list.items[2], "dragging"));
}

#[test]
fn clone_ghost_reset_discards_it_and_is_idempotent() {
    let list = list_of(5);
    let mut drag = draggable(&list, 2);
    let ghost = drag.ensure_ghost(None, Some("ghost"), None).unwrap();
    ghost.set_index(GhostIndex::At(0));
    ghost.place_in(list.ul).unwrap();
    assert_eq!(list.doc.children(list.ul)[0], ghost.element());

    ghost.reset();
    assert!(!list.doc.exists(ghost.element()));
    assert_eq!(list.doc.children(list.ul), list.items);
    assert!(ghost.class_list().is_empty());

    ghost.reset();
    assert_eq!(list.doc.children(list.ul), list.items);
}

#[test]
fn source_ghost_swaps_dragged_class_for_ghost_class() {
    let list = list_of(5);
    let mut drag = draggable(&list, 2);
    drag.class_list().add("dragging");

    let factory: GhostFactory = Rc::new(|_doc: &Document, source: NodeId, index: usize| GhostSpec {
        element: source,
        index: GhostIndex::At(index),
    });
    let ghost = drag
        .ensure_ghost(Some(&factory), Some("ghost"), Some("dragging"))
        .unwrap();
    assert!(ghost.is_source());
    assert_eq!(ghost.index(), GhostIndex::At(2));

    let source = list.items[2];
    assert!(list.doc.has_class(source, "ghost"));
    assert!(!list.doc.has_class(source, "dragging"));
    assert!(!drag.class_list().contains("dragging"));
    assert!(drag.ghost().unwrap().class_list().contains("ghost"));
}

#[test]
fn source_ghost_reset_restores_original_slot() {
    let list = list_of(5);
    let other = list.doc.create_element("ol");
    list.doc.append_child(list.doc.root(), other).unwrap();

    let mut drag = draggable(&list, 2);
    let factory: GhostFactory = Rc::new(|_doc: &Document, source: NodeId, _index: usize| {
        GhostSpec {
            element: source,
            index: GhostIndex::End,
        }
    });
    let ghost = drag
        .ensure_ghost(Some(&factory), Some("ghost"), None)
        .unwrap();

    // The consumer moves the ghost around while hovering another list.
    ghost.place_in(other).unwrap();
    assert_eq!(list.doc.parent(list.items[2]), Some(other));

    ghost.reset();
    assert_eq!(list.doc.children(list.ul), list.items);
    assert_eq!(list.doc.index_in_parent(list.items[2]), Some(2));
    assert!(!list.doc.has_class(list.items[2], "ghost"));
    assert!(list.doc.exists(list.items[2]), "the source is never discarded");

    ghost.reset();
    assert_eq!(list.doc.children(list.ul), list.items);
    assert_eq!(list.doc.class_attribute(list.items[2]), "");
}

#[test]
fn factory_runs_once() {
    let list = list_of(3);
    let calls = Rc::new(Cell::new(0));
    let factory: GhostFactory = {
        let calls = Rc::clone(&calls);
        Rc::new(move |doc: &Document, _source: NodeId, _index: usize| {
            calls.set(calls.get() + 1);
            GhostSpec {
                element: doc.create_element("div"),
                index: GhostIndex::At(1),
            }
        })
    };

    let mut drag = draggable(&list, 0);
    let first = drag.ensure_ghost(Some(&factory), None, None).unwrap().element();
    let second = drag.ensure_ghost(Some(&factory), None, None).unwrap().element();
    assert_eq!(first, second);
    assert_eq!(calls.get(), 1);

    let ghost = drag.ghost().unwrap();
    ghost.place_in(list.ul).unwrap();
    assert_eq!(list.doc.index_in_parent(first), Some(1));
}

#[test]
fn ghost_and_draggable_class_sets_are_disjoint() {
    let list = list_of(3);
    let mut drag = draggable(&list, 1);
    drag.class_list().add("dragging");
    let ghost = drag
        .ensure_ghost(None, Some("ghost"), Some("dragging"))
        .unwrap();

    let ghost_tokens = ghost.class_list().tokens();
    let drag_tokens = drag.class_list().tokens();
    assert!(ghost_tokens.iter().all(|t| !drag_tokens.contains(t)));
}
