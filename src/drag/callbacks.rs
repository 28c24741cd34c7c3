use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use super::draggable::Draggable;
use super::drop_zone::HoverRecord;
use super::error::DragError;
use super::types::{DragOutcome, GhostIndex, PointerEvent};
use crate::document::{Document, NodeId};

/// What every consumer hook returns: a (possibly already completed) future.
pub type HookFuture<'a, T> = LocalBoxFuture<'a, anyhow::Result<T>>;

/// An already-resolved hook result, for hooks that do not need to wait on anything.
pub fn ready<'a, T: 'a>(value: T) -> HookFuture<'a, T> {
    Box::pin(futures::future::ready(Ok(value)))
}

pub(super) type LifecycleHook =
    Rc<dyn for<'a> Fn(&'a PointerEvent, &'a Draggable) -> HookFuture<'a, ()>>;

pub(super) type EndHook =
    Rc<dyn for<'a> Fn(&'a PointerEvent, &'a Draggable, DragOutcome) -> HookFuture<'a, ()>>;

pub(super) type ZoneHook<T> =
    Rc<dyn for<'a> Fn(&'a PointerEvent, &'a Draggable, &'a HoverRecord) -> HookFuture<'a, T>>;

/// Produced by a ghost factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostSpec {
    pub element: NodeId,
    pub index: GhostIndex,
}

/// `(document, source element, source index) -> ghost`.
pub type GhostFactory = Rc<dyn Fn(&Document, NodeId, usize) -> GhostSpec>;

/// What follows the pointer while dragging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CursorVisual {
    /// An image reference; wrapped in an `img` element with this `src`.
    Image(String),

    /// A custom element supplied by the consumer.
    Element(NodeId),
}

#[derive(Clone)]
pub struct CursorImage {
    /// Assigned as the `id` attribute of the floating cursor element.
    pub id: String,
    pub img: Rc<dyn Fn(&Document, NodeId) -> CursorVisual>,
}

impl CursorImage {
    pub fn new(
        id: impl Into<String>,
        img: impl Fn(&Document, NodeId) -> CursorVisual + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            img: Rc::new(img),
        }
    }
}

impl fmt::Debug for CursorImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorImage")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Lifecycle hooks and presentation factories of a draggable source.
#[derive(Clone, Default)]
pub struct DragHooks {
    pub(super) on_drag_start: Option<LifecycleHook>,
    pub(super) on_drag_end: Option<EndHook>,
    pub(super) on_cancel: Option<LifecycleHook>,
    pub(super) create_ghost: Option<GhostFactory>,
    pub(super) cursor_image: Option<CursorImage>,
}

impl fmt::Debug for DragHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragHooks")
            .field("on_drag_start", &self.on_drag_start.is_some())
            .field("on_drag_end", &self.on_drag_end.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .field("create_ghost", &self.create_ghost.is_some())
            .field("cursor_image", &self.cursor_image)
            .finish()
    }
}

impl DragHooks {
    pub fn on_drag_start(
        mut self,
        hook: impl for<'a> Fn(&'a PointerEvent, &'a Draggable) -> HookFuture<'a, ()> + 'static,
    ) -> Self {
        self.on_drag_start = Some(Rc::new(hook));
        self
    }

    pub fn on_drag_end(
        mut self,
        hook: impl for<'a> Fn(&'a PointerEvent, &'a Draggable, DragOutcome) -> HookFuture<'a, ()>
        + 'static,
    ) -> Self {
        self.on_drag_end = Some(Rc::new(hook));
        self
    }

    pub fn on_cancel(
        mut self,
        hook: impl for<'a> Fn(&'a PointerEvent, &'a Draggable) -> HookFuture<'a, ()> + 'static,
    ) -> Self {
        self.on_cancel = Some(Rc::new(hook));
        self
    }

    pub fn create_ghost(
        mut self,
        factory: impl Fn(&Document, NodeId, usize) -> GhostSpec + 'static,
    ) -> Self {
        self.create_ghost = Some(Rc::new(factory));
        self
    }

    pub fn cursor_image(mut self, cursor_image: CursorImage) -> Self {
        self.cursor_image = Some(cursor_image);
        self
    }

    pub(super) async fn drag_start(
        &self,
        event: &PointerEvent,
        draggable: &Draggable,
    ) -> Result<(), DragError> {
        match &self.on_drag_start {
            Some(hook) => hook(event, draggable)
                .await
                .map_err(DragError::callback("on_drag_start")),
            None => Ok(()),
        }
    }

    pub(super) async fn cancel(
        &self,
        event: &PointerEvent,
        draggable: &Draggable,
    ) -> Result<(), DragError> {
        match &self.on_cancel {
            Some(hook) => hook(event, draggable)
                .await
                .map_err(DragError::callback("on_cancel")),
            None => Ok(()),
        }
    }

    pub(super) async fn drag_end(
        &self,
        event: &PointerEvent,
        draggable: &Draggable,
        outcome: DragOutcome,
    ) -> Result<(), DragError> {
        match &self.on_drag_end {
            Some(hook) => hook(event, draggable, outcome)
                .await
                .map_err(DragError::callback("on_drag_end")),
            None => Ok(()),
        }
    }
}
