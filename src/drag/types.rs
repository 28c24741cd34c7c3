use egui::{PointerButton, Pos2};

use crate::document::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
}

/// One pointer input as delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,

    /// The button that changed state. `None` for moves.
    pub button: Option<PointerButton>,

    pub pos: Pos2,

    /// The element under the pointer. When `None` the engine resolves it with
    /// [`crate::Document::element_from_point`].
    pub target: Option<NodeId>,
}

impl PointerEvent {
    pub fn down(button: PointerButton, pos: Pos2, target: Option<NodeId>) -> Self {
        Self {
            kind: PointerEventKind::Down,
            button: Some(button),
            pos,
            target,
        }
    }

    pub fn moved(pos: Pos2, target: Option<NodeId>) -> Self {
        Self {
            kind: PointerEventKind::Move,
            button: None,
            pos,
            target,
        }
    }

    pub fn up(button: PointerButton, pos: Pos2, target: Option<NodeId>) -> Self {
        Self {
            kind: PointerEventKind::Up,
            button: Some(button),
            pos,
            target,
        }
    }

    pub(super) fn is_primary(&self) -> bool {
        matches!(self.button, None | Some(PointerButton::Primary))
    }
}

/// Result of an enter/leave hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Transition {
    /// Explicitly allow the hover state change.
    Accept,

    /// Keep the previous hover state.
    Veto,

    /// No opinion; treated like [`Self::Accept`].
    #[default]
    Continue,
}

impl Transition {
    pub fn is_vetoed(self) -> bool {
        self == Self::Veto
    }
}

/// Passed to `on_drag_end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DragOutcome {
    pub canceled: bool,
    pub dropped: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Idle,

    /// Pressed, still below the trigger distance.
    Armed,

    Dragging,
}

/// Session-local id of a drop zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub(super) usize);

impl ZoneId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where the ghost wants to sit inside the list that currently holds it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GhostIndex {
    At(usize),

    #[default]
    End,
}

impl GhostIndex {
    pub(super) fn as_insert_index(self) -> usize {
        match self {
            Self::At(index) => index,
            Self::End => usize::MAX,
        }
    }
}
