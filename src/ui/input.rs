/// Input adapter: crossterm events → actions.
///
/// Mouse and focus events become pointer actions in terminal cells; the
/// game loop converts them to board space with `BoardLayout::to_board`.
/// Keys become one-shot commands. Only key Press events count, so
/// terminals that report Release (Windows, kitty protocol) don't fire
/// commands twice.
///
///   left down  → Select      u        → Undo
///   left drag  → Drag        r        → Reset
///   left up    → Release     g        → GiveUp
///   focus lost → Release     n / p    → Next / PrevPuzzle
///   resize     → Redraw      q, Esc, Ctrl-C → Quit

use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind, poll,
};

use gridlock::sim::event::PointerEvent;
use gridlock::sim::session::CELL_SIZE;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputAction {
    Select { col: u16, row: u16 },
    Drag { col: u16, row: u16 },
    Release,
    Undo,
    Reset,
    GiveUp,
    NextPuzzle,
    PrevPuzzle,
    Redraw,
    Quit,
}

/// Where the board sits on screen. Cell (0, 0) starts at
/// (`left`, `top`); each cell is `cell_w` × `cell_h` terminal cells.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BoardLayout {
    pub left: u16,
    pub top: u16,
    pub cell_w: u16,
    pub cell_h: u16,
}

impl BoardLayout {
    /// Board-space pointer at the centre of terminal cell (col, row).
    /// Cells left of or above the board map to negative coordinates.
    pub fn to_board(&self, col: u16, row: u16) -> PointerEvent {
        let x = (col as f64 - self.left as f64 + 0.5) / self.cell_w as f64;
        let y = (row as f64 - self.top as f64 + 0.5) / self.cell_h as f64;
        PointerEvent::new(x * CELL_SIZE, y * CELL_SIZE)
    }

    /// Terminal column where board axis position `x` (cells, may be
    /// fractional) starts.
    pub fn col_of(&self, x: f64) -> i32 {
        self.left as i32 + (x * self.cell_w as f64).round() as i32
    }

    pub fn row_of(&self, y: f64) -> i32 {
        self.top as i32 + (y * self.cell_h as f64).round() as i32
    }
}

// ── Event mapping ──

pub fn map_event(ev: &Event) -> Option<InputAction> {
    match ev {
        Event::Key(key) => map_key(key),
        Event::Mouse(mouse) => map_mouse(mouse),
        Event::FocusLost => Some(InputAction::Release),
        Event::Resize(..) => Some(InputAction::Redraw),
        _ => None,
    }
}

fn map_key(key: &KeyEvent) -> Option<InputAction> {
    if key.kind != KeyEventKind::Press { return None; }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')).then_some(InputAction::Quit);
    }
    match key.code {
        KeyCode::Char('u') | KeyCode::Char('U') => Some(InputAction::Undo),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(InputAction::Reset),
        KeyCode::Char('g') | KeyCode::Char('G') => Some(InputAction::GiveUp),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(InputAction::NextPuzzle),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(InputAction::PrevPuzzle),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(InputAction::Quit),
        _ => None,
    }
}

fn map_mouse(mouse: &MouseEvent) -> Option<InputAction> {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(InputAction::Select { col, row }),
        MouseEventKind::Drag(MouseButton::Left) => Some(InputAction::Drag { col, row }),
        MouseEventKind::Up(MouseButton::Left) => Some(InputAction::Release),
        _ => None,
    }
}

// ── Draining ──

pub struct InputState {
    actions: Vec<InputAction>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { actions: Vec::with_capacity(16) }
    }

    /// Wait up to `timeout` for the first event, then drain everything
    /// already queued. Consecutive drags collapse into the last one.
    pub fn drain_events(&mut self, timeout: Duration) -> io::Result<&[InputAction]> {
        self.actions.clear();
        if !poll(timeout)? {
            return Ok(&self.actions);
        }
        loop {
            let ev = event::read()?;
            if let Some(action) = map_event(&ev) {
                self.push(action);
            }
            if !poll(Duration::ZERO)? { break; }
        }
        Ok(&self.actions)
    }

    fn push(&mut self, action: InputAction) {
        let collapses = matches!(action, InputAction::Drag { .. })
            && matches!(self.actions.last(), Some(InputAction::Drag { .. }));
        if collapses {
            self.actions.pop();
        }
        self.actions.push(action);
    }
}
