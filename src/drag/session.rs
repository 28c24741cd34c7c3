use std::rc::Rc;

use futures::future::join_all;

use super::cursor::CursorOverlay;
use super::draggable::Draggable;
use super::drop_zone::{DropZone, HoverRecord, ZoneState};
use super::error::{DragError, first_error};
use super::types::{DragPhase, PointerEvent, ZoneId};
use crate::document::{Document, NodeId};

/// Everything known about the gesture between press and finalize.
#[derive(Debug)]
pub struct DragSession {
    pub(super) id: u64,
    pub(super) canceled: bool,
    pub(super) dragging: bool,
    pub(super) dropped: bool,
    pub(super) group: Option<String>,
    pub(super) draggable: Draggable,
    pub(super) zones: Vec<ZoneState>,
    pub(super) cursor: Option<CursorOverlay>,
}

impl DragSession {
    /// Snapshots the zones, skipping any whose element is not in the document.
    pub(super) fn new(
        id: u64,
        doc: &Document,
        group: Option<String>,
        draggable: Draggable,
        zones: &[Rc<DropZone>],
    ) -> Self {
        let zones = zones
            .iter()
            .filter(|zone| {
                let connected = doc.is_connected(zone.element);
                if !connected {
                    log::warn!(
                        "session {id}: ignoring drop zone {:?}, its element is not in the document",
                        zone.element
                    );
                }
                connected
            })
            .enumerate()
            .map(|(index, zone)| ZoneState::new(ZoneId(index), Rc::clone(zone)))
            .collect();

        Self {
            id,
            canceled: false,
            dragging: false,
            dropped: false,
            group,
            draggable,
            zones,
            cursor: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> DragPhase {
        if self.dragging {
            DragPhase::Dragging
        } else {
            DragPhase::Armed
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn draggable(&self) -> &Draggable {
        &self.draggable
    }

    /// Ids of the zones taking part in this session, in configuration order.
    pub fn zone_ids(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.zones.iter().map(|zone| zone.id)
    }

    /// Element of a zone taking part in this session.
    pub fn zone_element(&self, id: ZoneId) -> Option<NodeId> {
        self.zones.get(id.index()).map(ZoneState::element)
    }

    /// Zones currently under the pointer.
    pub fn hovered(&self) -> impl Iterator<Item = (ZoneId, &HoverRecord)> + '_ {
        self.zones
            .iter()
            .filter_map(|zone| zone.hover.as_ref().map(|hover| (zone.id, hover)))
    }

    pub fn hover(&self, id: ZoneId) -> Option<&HoverRecord> {
        self.zones.get(id.index())?.hover.as_ref()
    }

    pub(super) fn cursor_element(&self) -> Option<NodeId> {
        self.cursor.as_ref().map(CursorOverlay::element)
    }

    /// Evaluates every zone against the current target. Zones run concurrently.
    pub(super) async fn track_zones(
        &mut self,
        doc: &Document,
        event: &PointerEvent,
        target: Option<NodeId>,
    ) -> Result<(), DragError> {
        let Self {
            zones, draggable, ..
        } = self;
        let draggable = &*draggable;
        let results = join_all(
            zones
                .iter_mut()
                .map(|zone| zone.track(doc, event, target, draggable)),
        )
        .await;
        first_error(results)
    }

    /// Calls `on_drop` on every hovered zone, concurrently.
    ///
    /// Returns whether any zone accepted, plus the first callback failure.
    pub(super) async fn drop_on_hovered(
        &self,
        event: &PointerEvent,
    ) -> (bool, Result<(), DragError>) {
        let results = join_all(
            self.zones
                .iter()
                .filter(|zone| zone.hover.is_some())
                .map(|zone| zone.drop(event, &self.draggable)),
        )
        .await;

        let dropped = results.iter().any(|r| matches!(r, Ok(true)));
        let failure = first_error(results.into_iter().map(|r| r.map(|_| ())));
        (dropped, failure)
    }

    /// Undoes every visible side effect: tracked classes, ghost, cursor visual.
    ///
    /// Idempotent; hover records survive so `on_drop` can still see them.
    pub(super) fn cleanup_visuals(&self) {
        self.draggable.class_list().purge();
        self.draggable.reset_ghost();
        for zone in &self.zones {
            zone.purge_hover_classes();
        }
        if let Some(cursor) = &self.cursor {
            cursor.remove();
        }
    }
}
