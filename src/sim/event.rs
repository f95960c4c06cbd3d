/// Events crossing the engine boundary.
///
/// `PointerEvent` is the only input the engine sees: mouse, touch or
/// anything else is converted to board-space coordinates before it gets
/// here. `GameEvent`s are emitted by session operations; the presentation
/// layer consumes them for redraw, sound and solve records.

use crate::domain::moves::Move;

/// A pointer position in board space (`cell_size` units per cell, origin
/// at the top-left corner of cell (0, 0)).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        PointerEvent { x, y }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Board state changed; the renderer should redraw.
    Redraw,
    Loaded,
    Selected { vehicle: usize },
    Released { vehicle: usize, position: i32 },
    MoveRecorded(Move),
    Undone(Move),
    Reset,
    /// VIP escaped. Carries the full audit text for submission.
    Solved { audit: String },
    /// Player gave up. Carries the partial audit text.
    GaveUp { audit: String },
}
