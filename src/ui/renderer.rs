/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout:
///   row 0           HUD (puzzle, moves, phase)
///   row 2           top border
///   rows 3..        board, `cell_h` rows per board row; exit lane on the right
///   below board     message bar, help bar

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use gridlock::domain::board::Board;
use gridlock::domain::vehicle::{Orientation, Vehicle};
use gridlock::sim::session::{GameSession, Phase};

use super::input::BoardLayout;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, also used
    /// for `Clear(ClearType::All)` so row gaps match on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    /// Signed-coordinate set; anything off screen is dropped.
    fn set_i(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 {
            self.set(x as usize, y as usize, cell);
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }

    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, cell: Cell) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.set_i(x, y, cell);
            }
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            cx += 1;
        }
    }
}

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const FLOOR_BG: Color = Color::Rgb { r: 44, g: 44, b: 52 };
const FLOOR_DOT: Color = Color::Rgb { r: 70, g: 70, b: 82 };
const WALL: Color = Color::Rgb { r: 120, g: 120, b: 140 };
const LANE_BG: Color = Color::Rgb { r: 30, g: 60, b: 30 };
const VIP_BG: Color = Color::Rgb { r: 210, g: 40, b: 40 };
const VIP_HELD: Color = Color::Rgb { r: 255, g: 90, b: 90 };

const VEHICLE_COLORS: [Color; 6] = [
    Color::Rgb { r: 60, g: 120, b: 220 },
    Color::Rgb { r: 60, g: 170, b: 90 },
    Color::Rgb { r: 220, g: 160, b: 40 },
    Color::Rgb { r: 150, g: 80, b: 200 },
    Color::Rgb { r: 40, g: 170, b: 170 },
    Color::Rgb { r: 200, g: 100, b: 60 },
];

fn vehicle_color(index: usize, v: &Vehicle, held: bool) -> Color {
    if v.is_vip {
        return if held { VIP_HELD } else { VIP_BG };
    }
    let base = VEHICLE_COLORS[index % VEHICLE_COLORS.len()];
    if !held { return base; }
    match base {
        Color::Rgb { r, g, b } => Color::Rgb {
            r: r.saturating_add(50),
            g: g.saturating_add(50),
            b: b.saturating_add(50),
        },
        other => other,
    }
}

fn vehicle_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MARGIN_COL: u16 = 2;

/// Everything the renderer shows besides the board itself.
pub struct View<'a> {
    pub session: &'a GameSession,
    pub puzzle_name: &'a str,
    pub puzzle_index: usize,
    pub puzzle_count: usize,
    pub message: &'a str,
    pub give_up_available: bool,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    cell_w: u16,
    cell_h: u16,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            cell_w,
            cell_h,
            last_phase: None,
        }
    }

    /// Screen placement of board cell (0, 0). The border sits one
    /// terminal cell outside.
    pub fn layout(&self) -> BoardLayout {
        BoardLayout {
            left: MARGIN_COL + 1,
            top: MAP_ROW as u16 + 1,
            cell_w: self.cell_w,
            cell_h: self.cell_h,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableFocusChange,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, view: &View) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → full repaint for a clean transition
        let phase = view.session.phase();
        if self.last_phase != Some(phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(phase);
        }

        self.front.clear();
        self.compose_hud(view);
        let below = match view.session.board() {
            Some(board) => self.compose_board(board, view.session.selected()),
            None => {
                self.front.put_str(MARGIN_COL as usize, MAP_ROW, "No puzzle loaded.", Color::DarkGrey, Color::Reset);
                MAP_ROW + 1
            }
        };
        self.compose_bars(view, below + 1);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal
        // default, which may differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, view: &View) {
        let status = match view.session.phase() {
            Phase::Empty => "",
            Phase::InProgress if view.give_up_available => "[G] give up available",
            Phase::InProgress => "",
            Phase::Won => "★ SOLVED! ★",
            Phase::GaveUp => "GAVE UP",
        };
        let hud = format!(
            " GRIDLOCK  {}/{} {:<24}  Moves:{:<4} {} ",
            view.puzzle_index + 1, view.puzzle_count.max(1), view.puzzle_name,
            view.session.moves().len(), status,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    /// Draw border, floor, exit lane and vehicles. Returns the first row
    /// below the board.
    fn compose_board(&mut self, board: &Board, held: Option<usize>) -> usize {
        let l = self.layout();
        let (w, h, exit) = (board.width(), board.height(), board.exit_offset());
        let (cw, ch) = (l.cell_w as i32, l.cell_h as i32);
        let left = l.left as i32;
        let top = l.top as i32;
        let right = left + w * cw;      // right border column
        let bottom = top + h * ch;      // bottom border row
        let lane_top = top + exit * ch;
        let lane_bottom = lane_top + ch;

        // Floor with one dot per cell
        self.front.fill_rect(left, top, right, bottom, Cell::from_char(' ', FLOOR_DOT, FLOOR_BG));
        for y in 0..h {
            for x in 0..w {
                self.front.set_i(left + x * cw + cw / 2, top + y * ch + ch / 2,
                    Cell::from_char('·', FLOOR_DOT, FLOOR_BG));
            }
        }

        // Border
        let wall = |c: char| Cell::from_char(c, WALL, Color::Reset);
        for x in left..right {
            self.front.set_i(x, top - 1, wall('─'));
            self.front.set_i(x, bottom, wall('─'));
        }
        for y in top..bottom {
            self.front.set_i(left - 1, y, wall('│'));
            if y < lane_top || y >= lane_bottom {
                self.front.set_i(right, y, wall('│'));
            }
        }
        self.front.set_i(left - 1, top - 1, wall('┌'));
        self.front.set_i(right, top - 1, wall('┐'));
        self.front.set_i(left - 1, bottom, wall('└'));
        self.front.set_i(right, bottom, wall('┘'));

        // Exit gap + chute, closed by the sentinel
        let chute_end = left + (w + 2) * cw;
        self.front.fill_rect(right, lane_top, chute_end, lane_bottom, Cell::from_char(' ', FLOOR_DOT, LANE_BG));
        for x in right..chute_end {
            self.front.set_i(x, lane_top - 1, wall('─'));
            self.front.set_i(x, lane_bottom, wall('─'));
        }
        for y in lane_top..lane_bottom {
            self.front.set_i(chute_end, y, wall('█'));
        }
        self.front.set_i(right + cw / 2, lane_top + ch / 2, Cell::from_char('▶', WALL, LANE_BG));

        // Vehicles, held one last so it draws on top
        let mut order: Vec<usize> = (0..board.vehicles().len()).filter(|&i| Some(i) != held).collect();
        order.extend(held);
        for i in order {
            if let Some(v) = board.vehicle(i) {
                self.compose_vehicle(&l, i, v, Some(i) == held);
            }
        }

        (bottom + 1).max(0) as usize
    }

    fn compose_vehicle(&mut self, l: &BoardLayout, index: usize, v: &Vehicle, held: bool) {
        let (len_x, len_y) = match v.orientation {
            Orientation::Horizontal => (v.length as f64, 1.0),
            Orientation::Vertical => (1.0, v.length as f64),
        };
        let x0 = l.col_of(v.x());
        let x1 = l.col_of(v.x() + len_x) - 1; // one-column gap between neighbours
        let y0 = l.row_of(v.y());
        let y1 = l.row_of(v.y() + len_y) - if l.cell_h >= 2 { 1 } else { 0 };
        if x1 <= x0 || y1 <= y0 { return; }

        let bg = vehicle_color(index, v, held);
        self.front.fill_rect(x0, y0, x1, y1, Cell::from_char(' ', Color::White, bg));
        let label = if v.is_vip { '★' } else { vehicle_label(index) };
        self.front.set_i((x0 + x1 - 1) / 2, (y0 + y1 - 1) / 2, Cell::from_char(label, Color::White, bg));
    }

    fn compose_bars(&mut self, view: &View, msg_row: usize) {
        if msg_row < self.front.height && !view.message.is_empty() {
            let msg = format!(" ◈ {} ", view.message);
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }

        let help_row = msg_row + 2;
        if help_row < self.front.height {
            let give_up = if view.give_up_available { "  G:Give up" } else { "" };
            let help = format!(" Mouse: drag vehicles  U:Undo  R:Reset  N/P:Puzzle{give_up}  Q:Quit");
            self.front.put_str(0, help_row, &help, Color::DarkGrey, Color::Reset);
        }
    }
}
