//! Pointer-driven drag-and-drop coordination.
//!
//! A [`DragDropEngine`] watches one root element of a [`Document`]. It turns a raw pointer event
//! stream into a drag gesture: arming on press, starting past a trigger distance, tracking hover
//! over any number of [`DropZone`]s, and finishing on release or cancel. Consumers only see
//! lifecycle callbacks; what a drag *means* is up to them.
//!
//! ```
//! use dnd_engine::{Document, DragDropEngine, DragHooks, DragOptions, DropZone, PointerEvent, ready};
//! use egui::{PointerButton, pos2};
//!
//! let doc = Document::new();
//! let list = doc.create_element("ul");
//! let item = doc.create_element("li");
//! let bin = doc.create_element("div");
//! doc.append_child(doc.root(), list).unwrap();
//! doc.append_child(list, item).unwrap();
//! doc.append_child(doc.root(), bin).unwrap();
//!
//! let mut engine = DragDropEngine::new(
//!     &doc,
//!     list,
//!     DragOptions {
//!         selector: Some("li".to_owned()),
//!         dragged_class: Some("dragging".to_owned()),
//!         ..Default::default()
//!     },
//! )
//! .with_hooks(DragHooks::default().on_drag_end(|_, _, outcome| {
//!     assert!(outcome.dropped);
//!     ready(())
//! }))
//! .with_drop_zone(DropZone::new(bin).on_drop(|_, _, _| ready(true)));
//!
//! futures::executor::block_on(async {
//!     engine.handle_event(PointerEvent::down(PointerButton::Primary, pos2(0.0, 0.0), Some(item))).await?;
//!     engine.handle_event(PointerEvent::moved(pos2(20.0, 0.0), Some(bin))).await?;
//!     engine.handle_event(PointerEvent::up(PointerButton::Primary, pos2(20.0, 0.0), Some(bin))).await
//! })
//! .unwrap();
//! assert!(!doc.has_class(item, "dragging"));
//! ```

#![forbid(unsafe_code)]

pub mod document;
pub mod drag;

pub use document::{
    ClassTokenSet, Document, DocumentError, ListenerKind, NodeId, Selector, SelectorError,
};
pub use drag::{
    DragDropEngine, DragError, DragHooks, DragOptions, DragOutcome, DragPhase, DragSession,
    Draggable, DropZone, Ghost, GhostIndex, HoverRecord, PointerEvent, PointerEventKind,
    Transition, ZoneId, ready,
};
