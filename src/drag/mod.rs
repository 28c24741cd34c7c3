use std::rc::Rc;

use egui::PointerButton;

use crate::document::{Document, ListenerKind, NodeId};

mod callbacks;
mod cursor;
mod debug;
mod draggable;
mod drop_zone;
mod error;
mod geometry;
mod ghost;
mod options;
mod release;
mod session;
mod types;

#[cfg(test)]
mod ghost_tests;

pub use callbacks::{
    CursorImage, CursorVisual, DragHooks, GhostFactory, GhostSpec, HookFuture, ready,
};
pub use draggable::{Draggable, Placement};
pub use drop_zone::{DropZone, HoverRecord};
pub use error::DragError;
pub use geometry::{distance, pos_distance, sibling_index};
pub use ghost::Ghost;
pub use hit_test::{Matcher, closest_match};
pub use options::{DEFAULT_TRIGGER_DISTANCE, DragOptions};
pub use session::DragSession;
pub use types::{
    DragOutcome, DragPhase, GhostIndex, PointerEvent, PointerEventKind, Transition, ZoneId,
};

use debug::DebugLog;
use geometry::exceeds_trigger_distance;
use release::Teardown;

/// Drag-and-drop for the draggable sources inside one root element.
///
/// Feed it the pointer events of the host, in order:
/// - a primary press on a source (see [`DragOptions::selector`]) arms a session and registers
///   document-level listeners (see [`Document::outer_listeners`]),
/// - moving further than [`DragOptions::trigger_distance`] starts the drag: dragged class, ghost,
///   cursor visual, `on_drag_start`,
/// - every further move re-evaluates all drop zones (enter / leave / over),
/// - a primary release drops onto the hovered zones, a secondary press (or [`Self::cancel`])
///   cancels, and either way the session is torn down.
///
/// Every entry point borrows the engine mutably until its future completes, so ticks can never
/// overlap and each zone sees at most one hover transition at a time.
#[derive(Debug)]
pub struct DragDropEngine {
    pub options: DragOptions,

    document: Document,
    root: NodeId,
    hooks: DragHooks,
    zones: Vec<Rc<DropZone>>,
    listener_owner: egui::Id,

    session: Option<DragSession>,
    next_session_id: u64,
    debug: DebugLog,
}

impl DragDropEngine {
    pub fn new(document: &Document, root: NodeId, options: DragOptions) -> Self {
        Self {
            options,
            document: document.clone(),
            root,
            hooks: DragHooks::default(),
            zones: Vec::new(),
            listener_owner: egui::Id::new(("dnd_engine_listeners", root)),
            session: None,
            next_session_id: 1,
            debug: DebugLog::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: DragHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_drop_zone(mut self, zone: DropZone) -> Self {
        self.add_drop_zone(zone);
        self
    }

    /// Zones added while a session is in flight take part from the next session on.
    pub fn add_drop_zone(&mut self, zone: DropZone) {
        self.zones.push(Rc::new(zone));
    }

    pub fn clear_drop_zones(&mut self) {
        self.zones.clear();
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Owner id under which this engine registers its document-level listeners.
    pub fn listener_owner(&self) -> egui::Id {
        self.listener_owner
    }

    pub fn phase(&self) -> DragPhase {
        self.session
            .as_ref()
            .map_or(DragPhase::Idle, DragSession::phase)
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Are document-level listeners currently registered for this engine?
    pub fn is_listening(&self) -> bool {
        !self.document.outer_listeners(self.listener_owner).is_empty()
    }

    pub fn debug_log_text(&self) -> String {
        self.debug.text()
    }

    pub fn debug_log_clear(&mut self) {
        self.debug.clear();
    }

    /// Dispatches on [`PointerEvent::kind`].
    pub async fn handle_event(&mut self, event: PointerEvent) -> Result<(), DragError> {
        match event.kind {
            PointerEventKind::Down => self.handle_pointer_down(event).await,
            PointerEventKind::Move => self.handle_pointer_move(event).await,
            PointerEventKind::Up => self.handle_pointer_up(event).await,
        }
    }

    pub async fn handle_pointer_down(&mut self, event: PointerEvent) -> Result<(), DragError> {
        self.debug.begin_event();

        if let Some(session) = &self.session {
            let cancel_trigger = session.dragging
                && self.options.cancel_on_right_click
                && event.button == Some(PointerButton::Secondary);
            if cancel_trigger {
                return self.cancel(event).await;
            }
            // One gesture at a time.
            return Ok(());
        }

        if !event.is_primary() {
            return Ok(());
        }
        let Some(target) = resolve_target(&self.document, &event) else {
            return Ok(());
        };

        let matcher = Matcher::parse_lenient(
            self.options.selector.as_deref(),
            self.options.filter.as_deref(),
            "draggable",
        );
        let Some(source) = closest_match(&self.document, target, self.root, &matcher) else {
            return Ok(());
        };

        self.arm(event, source, target);
        Ok(())
    }

    pub async fn handle_pointer_move(&mut self, event: PointerEvent) -> Result<(), DragError> {
        self.debug.begin_event();

        let Some(session) = &self.session else {
            return Ok(());
        };

        if !session.dragging {
            let origin = session.draggable.origin();
            let threshold = self.options.effective_trigger_distance();
            if !exceeds_trigger_distance(origin, event.pos, threshold) {
                return Ok(());
            }
            self.start_dragging(&event).await?;
        }

        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if let Some(cursor) = &session.cursor {
            cursor.move_to(event.pos);
        }
        let target = resolve_target(&self.document, &event);
        session.track_zones(&self.document, &event, target).await
    }

    pub async fn handle_pointer_up(&mut self, event: PointerEvent) -> Result<(), DragError> {
        self.debug.begin_event();

        if !event.is_primary() {
            return Ok(());
        }
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        let teardown = Teardown::new(&self.document, self.listener_owner, session);
        if teardown.session.dragging {
            return self.finish_release(teardown, event).await;
        }

        // Released before the trigger distance: a click, not a drag.
        let id = teardown.session.id;
        drop(teardown);
        self.debug
            .event(&self.options, format!("session END id={id} (click)"));
        Ok(())
    }

    /// Cancels a drag in progress. Does nothing unless the session is already dragging.
    pub async fn cancel(&mut self, event: PointerEvent) -> Result<(), DragError> {
        if !self.session.as_ref().is_some_and(|s| s.dragging) {
            return Ok(());
        }
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let teardown = Teardown::new(&self.document, self.listener_owner, session);
        self.finish_cancel(teardown, event).await
    }

    fn arm(&mut self, event: PointerEvent, source: NodeId, target: NodeId) {
        let id = self.next_session_id;
        self.next_session_id = id.wrapping_add(1).max(1);

        let draggable = Draggable::new(
            &self.document,
            self.options.identifier.clone(),
            source,
            target,
            event.pos,
        );
        let session = DragSession::new(
            id,
            &self.document,
            self.options.group.clone(),
            draggable,
            &self.zones,
        );

        for kind in [
            ListenerKind::PointerMove,
            ListenerKind::PointerUp,
            ListenerKind::PointerDown,
        ] {
            self.document.add_outer_listener(self.listener_owner, kind);
        }

        self.debug.event(
            &self.options,
            format!(
                "session START id={id} source={source:?} target={target:?} zones={}",
                session.zones.len()
            ),
        );
        self.session = Some(session);
    }

    async fn start_dragging(&mut self, event: &PointerEvent) -> Result<(), DragError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        session.dragging = true;

        let dragged_class = self.options.dragged_class.as_deref();
        if let Some(dragged_class) = dragged_class {
            session.draggable.class_list().add(dragged_class);
        }
        session.draggable.ensure_ghost(
            self.hooks.create_ghost.as_ref(),
            self.options.ghost_class.as_deref(),
            dragged_class,
        )?;
        if let Some(cursor_image) = &self.hooks.cursor_image {
            session.cursor = Some(cursor::CursorOverlay::spawn(
                &self.document,
                cursor_image,
                session.draggable.element(),
                event.pos,
            )?);
        }

        self.debug.event(
            &self.options,
            format!(
                "session DRAG id={} ghost={:?} cursor={:?}",
                session.id,
                session.draggable.ghost().map(Ghost::element),
                session.cursor_element(),
            ),
        );
        self.hooks.drag_start(event, &session.draggable).await
    }
}

/// The explicit event target, or whatever is under the pointer.
fn resolve_target(doc: &Document, event: &PointerEvent) -> Option<NodeId> {
    event
        .target
        .filter(|&target| doc.exists(target))
        .or_else(|| doc.element_from_point(event.pos))
}
