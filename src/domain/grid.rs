/// Occupancy grid: which cells are blocked.
///
/// ## Layout
///
/// The field covers `x ∈ [-1, width + 2]`, `y ∈ [-1, height]`:
///
/// ```text
///        -1  0 .. w-1   w   w+1  w+2
///   -1    #  #  ...  #   #    #    #
///    0    #  .  ...  .   #    #    #
///   exit  #  .  ...  .   .    .    #   <- gap, chute, sentinel
///   h-1   #  .  ...  .   #    #    #
///    h    #  #  ...  #   #    #    #
/// ```
///
/// Border cells are permanently blocked, except the exit gap `(w, exit)`
/// and the chute cell `(w + 1, exit)`. The sentinel `(w + 2, exit)` stops
/// the VIP from sliding out forever. Anything outside the field reads as
/// blocked, so scans never need a bounds check of their own.
///
/// Only board cells and the two exit cells are ever written by vehicles.

/// Columns beyond `width` that belong to the exit chute (gap + chute + sentinel).
pub const CHUTE_COLS: i32 = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    exit_offset: i32,
    /// Row-major over the padded field; index via `slot()`.
    cells: Vec<bool>,
}

impl Grid {
    /// Build the border/exit/chute layout for a board of the given size.
    /// Dimensions are validated by `Board::new`.
    pub fn new(width: i32, height: i32, exit_offset: i32) -> Self {
        let stride = (width + 1 + CHUTE_COLS) as usize;
        let rows = (height + 2) as usize;
        let mut grid = Grid {
            width,
            height,
            exit_offset,
            cells: vec![true; stride * rows],
        };

        // Interior starts free
        for y in 0..height {
            for x in 0..width {
                grid.set(x, y, false);
            }
        }

        // Exit gap + chute free, sentinel stays blocked
        grid.set(width, exit_offset, false);
        grid.set(width + 1, exit_offset, false);

        grid
    }

    pub fn width(&self) -> i32 { self.width }
    pub fn height(&self) -> i32 { self.height }
    pub fn exit_offset(&self) -> i32 { self.exit_offset }

    #[inline]
    fn slot(&self, x: i32, y: i32) -> Option<usize> {
        if x < -1 || x > self.width + CHUTE_COLS - 1 || y < -1 || y > self.height {
            return None;
        }
        let stride = self.width + 1 + CHUTE_COLS;
        Some(((y + 1) * stride + (x + 1)) as usize)
    }

    /// Is (x, y) blocked? Out-of-field cells are blocked.
    #[inline]
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        match self.slot(x, y) {
            Some(i) => self.cells[i],
            None => true,
        }
    }

    /// Mark a cell. Writes outside the field are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, blocked: bool) {
        if let Some(i) = self.slot(x, y) {
            self.cells[i] = blocked;
        }
    }

    /// Is (x, y) a board cell (inside `[0, width) × [0, height)`)?
    #[inline]
    pub fn is_interior(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Is (x, y) one of the two cells a vehicle may use to leave the board?
    #[inline]
    pub fn is_exit_lane(&self, x: i32, y: i32) -> bool {
        y == self.exit_offset && (x == self.width || x == self.width + 1)
    }

    /// Cells whose state tracks vehicles: the interior plus the exit lane.
    pub fn vehicle_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let interior = (0..self.height).flat_map(move |y| (0..self.width).map(move |x| (x, y)));
        let lane = [(self.width, self.exit_offset), (self.width + 1, self.exit_offset)];
        interior.chain(lane)
    }
}
