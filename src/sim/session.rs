/// GameSession: the complete state of one puzzle being played.
///
/// Owns the board, the original puzzle text (for reset), the drag session
/// and the move log. Every operation is synchronous and returns the
/// `GameEvent`s it produced; an empty vector means "nothing happened".
///
/// ## Phases
///
///   Empty ──load──▶ InProgress ──release (VIP escaped)──▶ Won
///                        │
///                        └──give_up──▶ GaveUp
///
/// `Won` and `GaveUp` are terminal: select, drag, undo and reset are all
/// refused. Loading another puzzle starts a fresh session state.
///
/// ## Drag lifecycle
///
///   select : hit-test the pointer, lift the vehicle, remember `start`
///   drag   : resolve the requested position (domain::rules), commit it
///   release: snap, place, record the move if it moved, check the win
///
/// A drag must always end in `release`, including when the pointer leaves
/// the board; a vehicle is never left lifted.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::domain::board::Board;
use crate::domain::moves::Move;
use crate::domain::rules::{self, DragOutcome};
use crate::domain::vehicle::Orientation;
use super::event::{GameEvent, PointerEvent};
use super::log::{AuditLog, MoveLog};
use super::puzzle::{self, PuzzleError};

/// Board-space units per cell.
pub const CELL_SIZE: f64 = 100.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Empty,
    InProgress,
    Won,
    GaveUp,
}

/// The vehicle currently held by the pointer.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DragSession {
    pub vehicle: usize,
    /// Pointer distance from the vehicle's anchor along its axis, in
    /// board-space units, captured at selection.
    pub offset: f64,
    /// Grid-aligned axis position at selection.
    pub start: i32,
}

/// Wall-clock unix milliseconds, the default audit timestamp source.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct GameSession {
    board: Option<Board>,
    puzzle_text: String,
    drag: Option<DragSession>,
    log: MoveLog,
    phase: Phase,
    cell_size: f64,
    clock: fn() -> u64,
}

// ── Construction / loading ──

impl GameSession {
    pub fn new(cell_size: f64) -> Self {
        Self::with_clock(cell_size, unix_millis)
    }

    pub fn with_clock(cell_size: f64, clock: fn() -> u64) -> Self {
        GameSession {
            board: None,
            puzzle_text: String::new(),
            drag: None,
            log: MoveLog::new(),
            phase: Phase::Empty,
            cell_size,
            clock,
        }
    }

    /// Load a puzzle. On error the current session is left untouched.
    pub fn load(&mut self, text: &str) -> Result<Vec<GameEvent>, PuzzleError> {
        let board = puzzle::load_board(text)?;
        info!(
            width = board.width(), height = board.height(),
            vehicles = board.vehicles().len(), "puzzle loaded"
        );
        self.board = Some(board);
        self.puzzle_text = text.to_string();
        self.drag = None;
        self.log = MoveLog::new();
        self.phase = Phase::InProgress;
        Ok(vec![GameEvent::Loaded, GameEvent::Redraw])
    }
}

// ── Queries ──

impl GameSession {
    pub fn board(&self) -> Option<&Board> { self.board.as_ref() }
    pub fn phase(&self) -> Phase { self.phase }
    pub fn drag(&self) -> Option<&DragSession> { self.drag.as_ref() }
    pub fn moves(&self) -> &[Move] { self.log.moves() }
    pub fn audit(&self) -> &AuditLog { self.log.audit() }
    pub fn puzzle_text(&self) -> &str { &self.puzzle_text }
    pub fn cell_size(&self) -> f64 { self.cell_size }

    /// Index of the selected vehicle. Index 0 (the VIP) is a valid selection.
    pub fn selected(&self) -> Option<usize> {
        self.drag.map(|d| d.vehicle)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Won | Phase::GaveUp)
    }

    fn accepts_input(&self) -> bool {
        self.phase == Phase::InProgress
    }
}

// ── Pointer operations ──

impl GameSession {
    /// Pointer down: pick up the vehicle under the pointer, if any.
    pub fn select(&mut self, p: PointerEvent) -> Vec<GameEvent> {
        if !self.accepts_input() || self.drag.is_some() { return vec![]; }
        let cs = self.cell_size;
        let Some(board) = self.board.as_mut() else { return vec![] };

        let Some(index) = board.vehicle_at(p.x / cs, p.y / cs) else { return vec![] };
        let v = &board.vehicles()[index];
        let offset = match v.orientation {
            Orientation::Horizontal => p.x - v.x() * cs,
            Orientation::Vertical => p.y - v.y() * cs,
        };
        let start = v.cell();

        board.set_occupancy(index, false);
        self.drag = Some(DragSession { vehicle: index, offset, start });
        debug!(vehicle = index, start, "vehicle selected");

        vec![GameEvent::Selected { vehicle: index }, GameEvent::Redraw]
    }

    /// Pointer move: slide the held vehicle as far toward the pointer as
    /// the grid allows. Illegal targets are clamped or ignored.
    pub fn drag_to(&mut self, p: PointerEvent) -> Vec<GameEvent> {
        let Some(drag) = self.drag else { return vec![] };
        let cs = self.cell_size;
        let Some(board) = self.board.as_mut() else { return vec![] };
        let Some(v) = board.vehicle(drag.vehicle) else { return vec![] };

        let coord = match v.orientation {
            Orientation::Horizontal => p.x,
            Orientation::Vertical => p.y,
        };
        let target = (coord - drag.offset) / cs;
        let current = v.axis_pos();

        match rules::resolve_drag(board.grid(), v, target) {
            DragOutcome::Slide { pos, clamped } => {
                if clamped {
                    debug!(vehicle = drag.vehicle, target, pos, "drag clamped");
                }
                if pos == current { return vec![]; }
                if let Some(v) = board.vehicle_mut(drag.vehicle) {
                    v.set_axis_pos(pos);
                }
                vec![GameEvent::Redraw]
            }
            DragOutcome::Rejected => {
                debug!(vehicle = drag.vehicle, target, "drag update rejected");
                vec![]
            }
        }
    }

    /// Pointer up (or pointer left the board): snap, place, record, and
    /// evaluate the win.
    pub fn release(&mut self) -> Vec<GameEvent> {
        let Some(drag) = self.drag.take() else { return vec![] };
        let now = (self.clock)();
        let Some(board) = self.board.as_mut() else { return vec![] };
        let Some(v) = board.vehicle_mut(drag.vehicle) else { return vec![] };

        let snapped = v.axis_pos().round();
        v.set_axis_pos(snapped);
        board.set_occupancy(drag.vehicle, true);
        debug_assert!(board.check_occupancy(None).is_ok(), "occupancy broken after release");

        let position = snapped as i32;
        let mv = Move::new(drag.vehicle, drag.start, position);
        let mut events = vec![GameEvent::Released { vehicle: drag.vehicle, position }];
        if self.log.record_move(mv, now) {
            debug!(vehicle = mv.vehicle, delta = mv.delta(), "move recorded");
            events.push(GameEvent::MoveRecorded(mv));
        }

        if rules::vip_escaped(board) {
            self.phase = Phase::Won;
            info!(records = self.log.audit().len(), "puzzle solved");
            events.push(GameEvent::Solved { audit: self.log.audit().to_text() });
        }

        events.push(GameEvent::Redraw);
        events
    }
}

// ── Undo / reset / give up ──

impl GameSession {
    /// Revert the most recent move. Refused while a vehicle is held.
    pub fn undo(&mut self) -> Vec<GameEvent> {
        if !self.accepts_input() || self.drag.is_some() { return vec![]; }
        let now = (self.clock)();
        let Some(board) = self.board.as_mut() else { return vec![] };
        let Some(mv) = self.log.pop_for_undo(now) else { return vec![] };

        let back = mv.inverse();
        board.relocate(back.vehicle, back.end);
        debug_assert!(board.check_occupancy(None).is_ok(), "occupancy broken after undo");
        info!(vehicle = back.vehicle, to = back.end, "move undone");

        vec![GameEvent::Undone(mv), GameEvent::Redraw]
    }

    /// Rebuild the board from the original puzzle text. The audit trail
    /// survives; the undo stack does not.
    pub fn reset(&mut self) -> Vec<GameEvent> {
        if !self.accepts_input() || self.drag.is_some() || self.board.is_none() { return vec![]; }
        let board = match puzzle::load_board(&self.puzzle_text) {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "reset could not rebuild the puzzle");
                return vec![];
            }
        };
        self.board = Some(board);
        self.log.mark_reset((self.clock)());
        info!("board reset");

        vec![GameEvent::Reset, GameEvent::Redraw]
    }

    /// Abandon the puzzle. A held vehicle is released first.
    pub fn give_up(&mut self) -> Vec<GameEvent> {
        if !self.accepts_input() { return vec![]; }
        let mut events = self.release();
        if self.phase == Phase::Won { return events; }

        self.phase = Phase::GaveUp;
        info!(records = self.log.audit().len(), "gave up");
        events.push(GameEvent::GaveUp { audit: self.log.audit().to_text() });
        events.push(GameEvent::Redraw);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUZZLE: &str = "6 6\n1 2 2 T\n3 1 3 F\n0 0 2 T\n4 4 2 F\n0 4 3 T\n5 0 3 F\n";

    fn clock() -> u64 { 1_000 }

    fn session(text: &str) -> GameSession {
        let mut s = GameSession::with_clock(CELL_SIZE, clock);
        s.load(text).unwrap();
        s
    }

    /// Pointer at the centre of cell (x, y).
    fn at(x: f64, y: f64) -> PointerEvent {
        PointerEvent::new((x + 0.5) * CELL_SIZE, (y + 0.5) * CELL_SIZE)
    }

    fn board(s: &GameSession) -> &Board {
        s.board().unwrap()
    }

    /// Select at `from`, drag through `path`, release.
    fn gesture(s: &mut GameSession, from: PointerEvent, path: &[PointerEvent]) -> Vec<GameEvent> {
        let mut events = s.select(from);
        for p in path {
            events.extend(s.drag_to(*p));
        }
        events.extend(s.release());
        events
    }

    #[test]
    fn nothing_happens_before_load() {
        let mut s = GameSession::with_clock(CELL_SIZE, clock);
        assert_eq!(s.phase(), Phase::Empty);
        assert!(s.select(at(1.0, 2.0)).is_empty());
        assert!(s.undo().is_empty());
        assert!(s.reset().is_empty());
        assert!(s.release().is_empty());
        assert!(s.give_up().is_empty());
    }

    #[test]
    fn failed_load_keeps_previous_puzzle() {
        let mut s = session(PUZZLE);
        assert!(s.load("bogus").is_err());
        assert_eq!(s.puzzle_text(), PUZZLE);
        assert_eq!(s.phase(), Phase::InProgress);
    }

    #[test]
    fn vip_index_zero_is_a_real_selection() {
        let mut s = session(PUZZLE);
        let ev = s.select(at(1.0, 2.0));
        assert_eq!(ev[0], GameEvent::Selected { vehicle: 0 });
        assert_eq!(s.selected(), Some(0));
        // lifted while held
        assert!(!board(&s).is_blocked(1, 2));
        s.release();
        assert_eq!(s.selected(), None);
        assert!(board(&s).is_blocked(1, 2));
    }

    #[test]
    fn select_on_empty_cell_does_nothing() {
        let mut s = session(PUZZLE);
        assert!(s.select(at(2.0, 0.0)).is_empty());
        assert!(s.drag().is_none());
    }

    #[test]
    fn second_select_refused_while_dragging() {
        let mut s = session(PUZZLE);
        s.select(at(1.0, 2.0));
        assert!(s.select(at(3.0, 1.0)).is_empty());
        assert_eq!(s.selected(), Some(0));
    }

    #[test]
    fn drag_and_release_records_move() {
        let mut s = session(PUZZLE);
        // vertical vehicle 1 at x=3, y=1..=3: pull it down two cells
        let events = gesture(&mut s, at(3.0, 1.0), &[at(3.0, 2.0), at(3.0, 3.0)]);
        assert!(events.contains(&GameEvent::MoveRecorded(Move::new(1, 1, 3))));
        assert_eq!(board(&s).vehicle(1).unwrap().cell(), 3);
        assert_eq!(s.moves(), &[Move::new(1, 1, 3)]);
        assert_eq!(s.audit().to_text(), "1000 1 2\n");
        assert!(board(&s).check_occupancy(None).is_ok());
    }

    #[test]
    fn fractional_drag_snaps_to_nearest_cell() {
        let mut s = session(PUZZLE);
        s.select(at(3.0, 1.0));
        s.drag_to(PointerEvent::new(350.0, 150.0 + 160.0));
        assert_eq!(board(&s).vehicle(1).unwrap().axis_pos(), 2.6);
        s.release();
        assert_eq!(board(&s).vehicle(1).unwrap().axis_pos(), 3.0);
    }

    #[test]
    fn noop_gesture_is_not_logged() {
        let mut s = session(PUZZLE);
        gesture(&mut s, at(1.0, 2.0), &[]);
        gesture(&mut s, at(3.0, 1.0), &[at(3.0, 2.0), at(3.0, 1.0)]);
        gesture(&mut s, at(3.0, 1.0), &[PointerEvent::new(350.0, 170.0)]);
        assert!(s.moves().is_empty());
        assert!(s.audit().is_empty());
    }

    #[test]
    fn fast_jump_cannot_tunnel() {
        let mut s = session(PUZZLE);
        // VIP at x=1 tries to jump straight to x=5 through the vertical at x=3
        gesture(&mut s, at(1.0, 2.0), &[at(5.0, 2.0)]);
        assert_eq!(board(&s).vehicle(0).unwrap().cell(), 1);
        assert!(s.moves().is_empty());
        assert!(board(&s).check_occupancy(None).is_ok());
    }

    #[test]
    fn undo_is_a_true_inverse() {
        let mut s = session(PUZZLE);
        let before = board(&s).clone();
        gesture(&mut s, at(3.0, 1.0), &[at(3.0, 3.0)]);
        assert_ne!(board(&s), &before);
        let ev = s.undo();
        assert_eq!(ev[0], GameEvent::Undone(Move::new(1, 1, 3)));
        assert_eq!(board(&s), &before);
        assert_eq!(s.audit().to_text(), "1000 1 2\n1000 U\n");
        // nothing left to undo: no marker appended
        assert!(s.undo().is_empty());
        assert_eq!(s.audit().len(), 2);
    }

    #[test]
    fn undo_refused_while_dragging() {
        let mut s = session(PUZZLE);
        gesture(&mut s, at(3.0, 1.0), &[at(3.0, 3.0)]);
        s.select(at(1.0, 2.0));
        assert!(s.undo().is_empty());
        assert!(s.reset().is_empty());
        s.release();
        assert_eq!(s.undo().len(), 2);
    }

    #[test]
    fn reset_restores_origin_and_keeps_audit() {
        let mut s = session(PUZZLE);
        let fresh = puzzle::load_board(PUZZLE).unwrap();
        gesture(&mut s, at(3.0, 1.0), &[at(3.0, 3.0)]);
        gesture(&mut s, at(5.0, 0.0), &[at(5.0, 3.0)]);
        assert_eq!(s.moves().len(), 2);
        s.reset();
        assert_eq!(board(&s), &fresh);
        assert!(s.moves().is_empty());
        assert_eq!(s.audit().to_text(), "1000 1 2\n1000 5 3\n1000 R\n");
    }

    #[test]
    fn solving_freezes_the_session() {
        let mut s = session(PUZZLE);
        gesture(&mut s, at(3.0, 1.0), &[at(3.0, 3.0)]);
        gesture(&mut s, at(5.0, 0.0), &[at(5.0, 3.0)]);
        let events = gesture(&mut s, at(1.0, 2.0), &[at(3.0, 2.0), at(5.0, 2.0)]);
        assert_eq!(s.phase(), Phase::Won);
        let solved = events.iter().any(|e| matches!(e, GameEvent::Solved { audit } if audit.ends_with("0 4\n")));
        assert!(solved);

        let frozen = board(&s).clone();
        assert!(s.select(at(3.0, 3.0)).is_empty());
        assert!(s.undo().is_empty());
        assert!(s.reset().is_empty());
        assert!(s.give_up().is_empty());
        assert_eq!(board(&s), &frozen);
    }

    #[test]
    fn win_exactness() {
        let mut s = session("6 6\n3 2 2 T\n");
        gesture(&mut s, at(3.0, 2.0), &[at(4.0, 2.0)]);
        assert_eq!(board(&s).vehicle(0).unwrap().cell(), 4);
        assert_eq!(s.phase(), Phase::InProgress);
        gesture(&mut s, at(4.0, 2.0), &[at(5.0, 2.0)]);
        assert_eq!(board(&s).vehicle(0).unwrap().cell(), 5);
        assert_eq!(s.phase(), Phase::Won);
    }

    #[test]
    fn give_up_releases_held_vehicle() {
        let mut s = session(PUZZLE);
        s.select(at(3.0, 1.0));
        s.drag_to(at(3.0, 2.4));
        let events = s.give_up();
        assert_eq!(s.phase(), Phase::GaveUp);
        assert!(s.drag().is_none());
        assert!(events.iter().any(|e| matches!(e, GameEvent::GaveUp { .. })));
        assert!(board(&s).check_occupancy(None).is_ok());
        assert!(s.select(at(1.0, 2.0)).is_empty());
    }

    #[test]
    fn reload_starts_fresh_log() {
        let mut s = session(PUZZLE);
        gesture(&mut s, at(3.0, 1.0), &[at(3.0, 3.0)]);
        s.load(PUZZLE).unwrap();
        assert!(s.moves().is_empty());
        assert!(s.audit().is_empty());
    }
}
