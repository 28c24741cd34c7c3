use std::fmt;
use std::rc::Rc;

use super::callbacks::{HookFuture, ZoneHook};
use super::draggable::Draggable;
use super::error::DragError;
use super::hit_test::{Matcher, closest_match};
use super::types::{PointerEvent, Transition, ZoneId};
use crate::document::{ClassTokenSet, Document, NodeId};

/// A region that reacts to hover transitions and can receive a drop.
#[derive(Clone)]
pub struct DropZone {
    pub element: NodeId,
    pub selector: Option<String>,
    pub filter: Option<String>,

    /// Applied to the hovered element while the pointer is over it.
    pub over_class: Option<String>,

    /// On leave, remove every class tracked for the hovered element rather than just `over_class`.
    pub purge_on_leave: bool,

    on_drag_enter: Option<ZoneHook<Transition>>,
    on_drag_leave: Option<ZoneHook<Transition>>,
    on_drag_over: Option<ZoneHook<()>>,
    on_drop: Option<ZoneHook<bool>>,
}

impl fmt::Debug for DropZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropZone")
            .field("element", &self.element)
            .field("selector", &self.selector)
            .field("filter", &self.filter)
            .field("over_class", &self.over_class)
            .field("purge_on_leave", &self.purge_on_leave)
            .finish_non_exhaustive()
    }
}

impl DropZone {
    pub fn new(element: NodeId) -> Self {
        Self {
            element,
            selector: None,
            filter: None,
            over_class: None,
            purge_on_leave: false,
            on_drag_enter: None,
            on_drag_leave: None,
            on_drag_over: None,
            on_drop: None,
        }
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn over_class(mut self, over_class: impl Into<String>) -> Self {
        self.over_class = Some(over_class.into());
        self
    }

    pub fn purge_on_leave(mut self, purge_on_leave: bool) -> Self {
        self.purge_on_leave = purge_on_leave;
        self
    }

    pub fn on_drag_enter(
        mut self,
        hook: impl for<'a> Fn(&'a PointerEvent, &'a Draggable, &'a HoverRecord) -> HookFuture<'a, Transition>
        + 'static,
    ) -> Self {
        self.on_drag_enter = Some(Rc::new(hook));
        self
    }

    pub fn on_drag_leave(
        mut self,
        hook: impl for<'a> Fn(&'a PointerEvent, &'a Draggable, &'a HoverRecord) -> HookFuture<'a, Transition>
        + 'static,
    ) -> Self {
        self.on_drag_leave = Some(Rc::new(hook));
        self
    }

    pub fn on_drag_over(
        mut self,
        hook: impl for<'a> Fn(&'a PointerEvent, &'a Draggable, &'a HoverRecord) -> HookFuture<'a, ()>
        + 'static,
    ) -> Self {
        self.on_drag_over = Some(Rc::new(hook));
        self
    }

    pub fn on_drop(
        mut self,
        hook: impl for<'a> Fn(&'a PointerEvent, &'a Draggable, &'a HoverRecord) -> HookFuture<'a, bool>
        + 'static,
    ) -> Self {
        self.on_drop = Some(Rc::new(hook));
        self
    }
}

async fn call_zone_hook<T: Default>(
    hook: Option<&ZoneHook<T>>,
    name: &'static str,
    event: &PointerEvent,
    draggable: &Draggable,
    hover: &HoverRecord,
) -> Result<T, DragError> {
    match hook {
        Some(hook) => hook(event, draggable, hover)
            .await
            .map_err(DragError::callback(name)),
        None => Ok(T::default()),
    }
}

/// The element of a zone currently under the pointer.
#[derive(Debug)]
pub struct HoverRecord {
    element: NodeId,
    target: NodeId,
    class_list: ClassTokenSet,
}

impl HoverRecord {
    fn new(doc: &Document, element: NodeId, target: NodeId) -> Self {
        Self {
            element,
            target,
            class_list: ClassTokenSet::new(doc, element),
        }
    }

    /// The matched element inside the zone.
    pub fn element(&self) -> NodeId {
        self.element
    }

    /// The raw event target that produced the match.
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn class_list(&self) -> &ClassTokenSet {
        &self.class_list
    }
}

/// A drop zone inside one session, with its hover state.
#[derive(Debug)]
pub(super) struct ZoneState {
    pub(super) id: ZoneId,
    zone: Rc<DropZone>,
    matcher: Matcher,
    pub(super) hover: Option<HoverRecord>,
}

impl ZoneState {
    pub(super) fn new(id: ZoneId, zone: Rc<DropZone>) -> Self {
        let matcher = Matcher::parse_lenient(
            zone.selector.as_deref(),
            zone.filter.as_deref(),
            "drop zone",
        );
        Self {
            id,
            zone,
            matcher,
            hover: None,
        }
    }

    pub(super) fn element(&self) -> NodeId {
        self.zone.element
    }

    /// One movement tick for this zone: leave, then enter or over.
    pub(super) async fn track(
        &mut self,
        doc: &Document,
        event: &PointerEvent,
        target: Option<NodeId>,
        draggable: &Draggable,
    ) -> Result<(), DragError> {
        let matched = target.and_then(|t| closest_match(doc, t, self.zone.element, &self.matcher));

        if let Some(hover) = &self.hover {
            if matched != Some(hover.element) {
                let transition = call_zone_hook(
                    self.zone.on_drag_leave.as_ref(),
                    "on_drag_leave",
                    event,
                    draggable,
                    hover,
                )
                .await?;
                if transition.is_vetoed() {
                    log::trace!("zone {:?}: leave vetoed", self.id);
                } else if let Some(hover) = self.hover.take() {
                    log::trace!("zone {:?}: left {:?}", self.id, hover.element);
                    self.clear_hover(&hover);
                }
            }
        }

        let (Some(element), Some(target)) = (matched, target) else {
            return Ok(());
        };

        if self.hover.is_none() {
            let hover = HoverRecord::new(doc, element, target);
            let transition = call_zone_hook(
                self.zone.on_drag_enter.as_ref(),
                "on_drag_enter",
                event,
                draggable,
                &hover,
            )
            .await;
            match transition {
                Ok(transition) if !transition.is_vetoed() => {
                    log::trace!("zone {:?}: entered {element:?}", self.id);
                    if let Some(over_class) = &self.zone.over_class {
                        hover.class_list.add(over_class);
                    }
                    self.hover = Some(hover);
                }
                Ok(_) => {
                    log::trace!("zone {:?}: enter vetoed", self.id);
                    hover.class_list.purge();
                }
                Err(err) => {
                    hover.class_list.purge();
                    return Err(err);
                }
            }
        } else if let Some(hover) = self.hover.as_ref().filter(|h| h.element == element) {
            call_zone_hook(
                self.zone.on_drag_over.as_ref(),
                "on_drag_over",
                event,
                draggable,
                hover,
            )
            .await?;
        }
        // Otherwise a vetoed leave keeps the previous record for this tick.
        Ok(())
    }

    fn clear_hover(&self, hover: &HoverRecord) {
        if self.zone.purge_on_leave {
            hover.class_list.purge();
        } else if let Some(over_class) = &self.zone.over_class {
            hover.class_list.remove(over_class);
        }
    }

    /// Purges the tracked classes of the current hover (the record itself is kept for `on_drop`).
    pub(super) fn purge_hover_classes(&self) {
        if let Some(hover) = &self.hover {
            hover.class_list.purge();
        }
    }

    /// Invokes `on_drop` if the zone is hovered. Returns whether the zone accepted the drop.
    pub(super) async fn drop(
        &self,
        event: &PointerEvent,
        draggable: &Draggable,
    ) -> Result<bool, DragError> {
        let Some(hover) = &self.hover else {
            return Ok(false);
        };
        call_zone_hook(self.zone.on_drop.as_ref(), "on_drop", event, draggable, hover).await
    }
}
