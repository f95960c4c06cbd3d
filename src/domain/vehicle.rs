/// Vehicles: fixed orientation and length, one free axis.
///
/// A vehicle is stored as a `lane` (the fixed coordinate: `y` for a
/// horizontal vehicle, `x` for a vertical one) plus a position along its
/// axis. The position is integral whenever the vehicle is placed on the
/// grid and may be fractional only while it is being dragged.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Puzzle-text orientation character (`T` = horizontal).
    pub fn from_code(code: &str) -> Self {
        if code.starts_with('T') { Orientation::Horizontal } else { Orientation::Vertical }
    }

    pub fn code(self) -> char {
        match self {
            Orientation::Horizontal => 'T',
            Orientation::Vertical => 'F',
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    pub is_vip: bool,
    pub orientation: Orientation,
    pub length: i32,
    lane: i32,
    pos: f64,
}

impl Vehicle {
    pub fn new(is_vip: bool, orientation: Orientation, length: i32, x: i32, y: i32) -> Self {
        let (lane, pos) = match orientation {
            Orientation::Horizontal => (y, x),
            Orientation::Vertical => (x, y),
        };
        Vehicle { is_vip, orientation, length, lane, pos: pos as f64 }
    }

    // ── Anchor ──

    /// Anchor x (fractional while dragged horizontally).
    pub fn x(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.pos,
            Orientation::Vertical => self.lane as f64,
        }
    }

    /// Anchor y (fractional while dragged vertically).
    pub fn y(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.lane as f64,
            Orientation::Vertical => self.pos,
        }
    }

    /// The fixed coordinate.
    pub fn lane(&self) -> i32 { self.lane }

    /// Position along the free axis.
    pub fn axis_pos(&self) -> f64 { self.pos }

    pub(crate) fn set_axis_pos(&mut self, pos: f64) {
        self.pos = pos;
    }

    /// Grid-aligned position along the free axis.
    pub fn cell(&self) -> i32 {
        self.pos.round() as i32
    }

    pub fn is_aligned(&self) -> bool {
        self.pos.fract() == 0.0
    }

    // ── Geometry ──

    /// Grid cell at axis coordinate `a` within this vehicle's lane.
    #[inline]
    pub fn cell_on_axis(&self, a: i32) -> (i32, i32) {
        match self.orientation {
            Orientation::Horizontal => (a, self.lane),
            Orientation::Vertical => (self.lane, a),
        }
    }

    /// Cells covered at the grid-aligned position.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let start = self.cell();
        (start..start + self.length).map(move |a| self.cell_on_axis(a))
    }

    /// Does the point (in cell units) fall inside the drawn rectangle?
    /// Half-open on both axes so neighbouring vehicles never both match.
    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        let (w, h) = match self.orientation {
            Orientation::Horizontal => (self.length as f64, 1.0),
            Orientation::Vertical => (1.0, self.length as f64),
        };
        let (x, y) = (self.x(), self.y());
        px >= x && px < x + w && py >= y && py < y + h
    }

    /// Extent of the board along this vehicle's free axis.
    pub fn axis_extent(&self, width: i32, height: i32) -> i32 {
        match self.orientation {
            Orientation::Horizontal => width,
            Orientation::Vertical => height,
        }
    }
}
