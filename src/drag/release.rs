use super::DragDropEngine;
use super::error::{DragError, first_error};
use super::session::DragSession;
use super::types::{DragOutcome, PointerEvent};
use crate::document::Document;

/// Owns a finishing session and guarantees its teardown.
///
/// Dropping it (normally, on an early return, on unwind, or because the finalize future was
/// dropped) undoes all visible side effects and unregisters the outer listeners.
pub(super) struct Teardown {
    document: Document,
    owner: egui::Id,
    pub(super) session: DragSession,
}

impl Teardown {
    pub(super) fn new(document: &Document, owner: egui::Id, session: DragSession) -> Self {
        Self {
            document: document.clone(),
            owner,
            session,
        }
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        self.session.cleanup_visuals();
        self.document.remove_outer_listeners(self.owner);
    }
}

impl DragDropEngine {
    /// Release while dragging: clean up first, then let hovered zones accept the drop.
    pub(super) async fn finish_release(
        &mut self,
        mut teardown: Teardown,
        event: PointerEvent,
    ) -> Result<(), DragError> {
        teardown.session.cleanup_visuals();

        let (dropped, drop_result) = teardown.session.drop_on_hovered(&event).await;
        teardown.session.dropped = dropped;

        let outcome = DragOutcome {
            canceled: false,
            dropped,
        };
        let end_result = self
            .hooks
            .drag_end(&event, &teardown.session.draggable, outcome)
            .await;

        let id = teardown.session.id;
        drop(teardown);
        self.debug
            .event(&self.options, format!("session END id={id} dropped={dropped}"));

        first_error([drop_result, end_result])
    }

    /// Cancel while dragging: put everything back, then report a canceled drag.
    pub(super) async fn finish_cancel(
        &mut self,
        mut teardown: Teardown,
        event: PointerEvent,
    ) -> Result<(), DragError> {
        teardown.session.canceled = true;
        teardown.session.draggable.reset_ghost();
        teardown.session.draggable.restore_position();

        let cancel_result = self
            .hooks
            .cancel(&event, &teardown.session.draggable)
            .await;

        teardown.session.cleanup_visuals();

        let outcome = DragOutcome {
            canceled: true,
            dropped: false,
        };
        let end_result = self
            .hooks
            .drag_end(&event, &teardown.session.draggable, outcome)
            .await;

        let id = teardown.session.id;
        drop(teardown);
        self.debug
            .event(&self.options, format!("session END id={id} canceled"));

        first_error([cancel_result, end_result])
    }
}
