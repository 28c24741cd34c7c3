use egui::{Pos2, Rect, Vec2};

use super::callbacks::{CursorImage, CursorVisual};
use crate::document::{Document, DocumentError, NodeId};

/// Offset of the floating cursor visual from the pointer, so it never sits under the hotspot.
const CURSOR_OFFSET: Vec2 = Vec2::new(12.0, 12.0);

/// Fallback size when the visual has no layout of its own.
const CURSOR_SIZE: Vec2 = Vec2::new(32.0, 32.0);

/// The floating visual that follows the pointer while dragging.
///
/// It lives directly under the document root and is never hit-testable, so it does not
/// shadow drop zones in [`Document::element_from_point`].
#[derive(Debug)]
pub(super) struct CursorOverlay {
    document: Document,
    element: NodeId,
    size: Vec2,
}

impl CursorOverlay {
    pub(super) fn spawn(
        document: &Document,
        cursor_image: &CursorImage,
        source: NodeId,
        pos: Pos2,
    ) -> Result<Self, DocumentError> {
        let (visual, owned) = match (cursor_image.img)(document, source) {
            CursorVisual::Image(src) => {
                let img = document.create_element("img");
                document.set_attribute(img, "src", src);
                (img, true)
            }
            CursorVisual::Element(custom) => (custom, false),
        };
        let size = document.rect(visual).map_or(CURSOR_SIZE, |r| r.size());

        let element = document.create_element("div");
        document.set_attribute(element, "id", cursor_image.id.as_str());
        document.set_hit_testable(element, false);

        let attached = document
            .append_child(element, visual)
            .and_then(|()| document.append_child(document.root(), element));
        if let Err(err) = attached {
            // Consumer-supplied visuals are detached, never removed.
            if !owned && document.parent(visual) == Some(element) {
                document.detach(visual);
            }
            document.remove(element);
            if owned {
                document.remove(visual);
            }
            return Err(err);
        }

        let overlay = Self {
            document: document.clone(),
            element,
            size,
        };
        overlay.move_to(pos);
        Ok(overlay)
    }

    pub(super) fn element(&self) -> NodeId {
        self.element
    }

    pub(super) fn move_to(&self, pos: Pos2) {
        let min = pos + CURSOR_OFFSET;
        self.document
            .set_rect(self.element, Rect::from_min_size(min, self.size));
        self.document.set_attribute(
            self.element,
            "style",
            format!("left: {:.0}px; top: {:.0}px", min.x, min.y),
        );
    }

    /// Removes the visual from the tree. Safe to call repeatedly.
    pub(super) fn remove(&self) {
        self.document.remove(self.element);
    }
}
