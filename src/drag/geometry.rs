use egui::{Pos2, pos2};

use crate::document::{Document, NodeId};

/// Euclidean distance between `(x1, y1)` and `(x2, y2)`.
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    pos_distance(pos2(x1, y1), pos2(x2, y2))
}

pub fn pos_distance(a: Pos2, b: Pos2) -> f32 {
    a.distance(b)
}

/// Position of `element` among its parent's children, or `None` when it has no parent.
pub fn sibling_index(doc: &Document, element: NodeId) -> Option<usize> {
    doc.index_in_parent(element)
}

/// Has the pointer travelled strictly further than `threshold` from `origin`?
pub(super) fn exceeds_trigger_distance(origin: Pos2, pos: Pos2, threshold: f32) -> bool {
    pos_distance(origin, pos) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);
        assert_eq!(distance(1.0, 1.0, 1.0, 1.0), 0.0);
        assert_eq!(distance(-3.0, 0.0, 3.0, 0.0), 6.0);
    }

    #[test]
    fn trigger_distance_is_strict() {
        let origin = pos2(10.0, 10.0);
        assert!(!exceeds_trigger_distance(origin, pos2(16.0, 10.0), 6.0));
        assert!(exceeds_trigger_distance(origin, pos2(16.5, 10.0), 6.0));
        assert!(!exceeds_trigger_distance(origin, pos2(12.0, 12.0), 6.0));
    }

    #[test]
    fn sibling_index_tracks_position() {
        let doc = Document::new();
        let ul = doc.create_element("ul");
        doc.append_child(doc.root(), ul).unwrap();
        let items: Vec<_> = (0..5)
            .map(|_| {
                let li = doc.create_element("li");
                doc.append_child(ul, li).unwrap();
                li
            })
            .collect();

        assert_eq!(sibling_index(&doc, items[2]), Some(2));
        doc.detach(items[0]);
        assert_eq!(sibling_index(&doc, items[2]), Some(1));
        assert_eq!(sibling_index(&doc, items[0]), None);
    }
}
