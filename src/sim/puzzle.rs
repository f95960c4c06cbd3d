/// Puzzle text: parsing, serialization and the puzzle catalog.
///
/// ## Puzzle text format
///   ```text
///   <width> <height>
///   <x> <y> <length> <orientation>     <- VIP; its `y` doubles as the exit offset
///   <x> <y> <length> <orientation>
///   ...
///   ```
///
/// The second line is read as `<ignored> <exitOffset>`. When it has exactly
/// four tokens it is also the first vehicle (the VIP); otherwise it is a
/// header line and vehicles start on the third line. Orientation `T...` is
/// horizontal, anything else vertical. Vehicle parsing stops at the first
/// line that does not split into exactly four tokens.
///
/// ## Catalog sources (in order):
///   1. Built-in embedded puzzles
///   2. `puzzles/` directory (individual `.txt` files, sorted by name)

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::board::{Board, BoardError};
use crate::domain::vehicle::{Orientation, Vehicle};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("malformed puzzle text at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error(transparent)]
    Dimensions(#[from] BoardError),
    #[error("puzzle has no vehicles")]
    NoVehicles,
    #[error("vehicle {index} overlaps another vehicle or leaves the board")]
    VehicleBlocked { index: usize },
}

/// One vehicle record as written in puzzle text.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct VehicleSpec {
    pub x: i32,
    pub y: i32,
    pub length: i32,
    pub orientation: Orientation,
}

/// Parsed puzzle text. The first vehicle is the VIP.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PuzzleSpec {
    pub width: i32,
    pub height: i32,
    pub exit_offset: i32,
    pub vehicles: Vec<VehicleSpec>,
}

/// A named puzzle in the catalog.
#[derive(Clone, Debug)]
pub struct PuzzleDef {
    pub name: String,
    pub text: String,
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

fn malformed(line: usize, reason: impl Into<String>) -> PuzzleError {
    PuzzleError::Malformed { line, reason: reason.into() }
}

fn parse_int(token: &str, line: usize, what: &str) -> Result<i32, PuzzleError> {
    token
        .parse::<i32>()
        .map_err(|_| malformed(line, format!("{what} `{token}` is not an integer")))
}

/// Parse puzzle text. Dimensions are checked by `PuzzleSpec::build`.
pub fn parse_puzzle(text: &str) -> Result<PuzzleSpec, PuzzleError> {
    let lines: Vec<&str> = text.lines().collect();

    let dims: Vec<&str> = lines.first().map(|l| l.split_whitespace().collect()).unwrap_or_default();
    if dims.len() < 2 {
        return Err(malformed(1, "expected `<width> <height>`"));
    }
    let width = parse_int(dims[0], 1, "width")?;
    let height = parse_int(dims[1], 1, "height")?;

    let exit_tokens: Vec<&str> = lines.get(1).map(|l| l.split_whitespace().collect()).unwrap_or_default();
    if exit_tokens.len() < 2 {
        return Err(malformed(2, "expected `<ignored> <exitOffset>`"));
    }
    let exit_offset = parse_int(exit_tokens[1], 2, "exit offset")?;
    let first_vehicle_line = if exit_tokens.len() == 4 { 1 } else { 2 };

    let mut vehicles = Vec::new();
    for (i, line) in lines.iter().enumerate().skip(first_vehicle_line) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 4 { break; }
        let n = i + 1;
        let x = parse_int(tokens[0], n, "x")?;
        let y = parse_int(tokens[1], n, "y")?;
        let length = parse_int(tokens[2], n, "length")?;
        if length < 1 {
            return Err(malformed(n, format!("vehicle length {length} must be at least 1")));
        }
        vehicles.push(VehicleSpec { x, y, length, orientation: Orientation::from_code(tokens[3]) });
    }

    Ok(PuzzleSpec { width, height, exit_offset, vehicles })
}

/// Parse and build in one step.
pub fn load_board(text: &str) -> Result<Board, PuzzleError> {
    parse_puzzle(text)?.build()
}

// ══════════════════════════════════════════════════════════════
// Building / serialization
// ══════════════════════════════════════════════════════════════

impl PuzzleSpec {
    /// Construct the board. Every vehicle must sit inside the board on
    /// free cells.
    pub fn build(&self) -> Result<Board, PuzzleError> {
        let mut board = Board::new(self.width, self.height, self.exit_offset)?;
        if self.vehicles.is_empty() {
            return Err(PuzzleError::NoVehicles);
        }
        for (index, s) in self.vehicles.iter().enumerate() {
            let v = Vehicle::new(index == 0, s.orientation, s.length, s.x, s.y);
            let inside = v.cells().all(|(x, y)| board.grid().is_interior(x, y));
            if !inside || !board.footprint_free(&v) {
                return Err(PuzzleError::VehicleBlocked { index });
            }
            board.add_vehicle(v);
        }
        debug!(width = self.width, height = self.height, vehicles = self.vehicles.len(), "board built");
        Ok(board)
    }

    /// Vehicle records of a board, in board order, at grid-aligned positions.
    pub fn from_board(board: &Board) -> Self {
        let vehicles = board
            .vehicles()
            .iter()
            .map(|v| {
                let (x, y) = v.cell_on_axis(v.cell());
                VehicleSpec { x, y, length: v.length, orientation: v.orientation }
            })
            .collect();
        PuzzleSpec {
            width: board.width(),
            height: board.height(),
            exit_offset: board.exit_offset(),
            vehicles,
        }
    }

    /// Serialize back to puzzle text. Uses the compact form (VIP line
    /// carries the exit offset) whenever the VIP sits in the exit row.
    pub fn to_text(&self) -> String {
        let mut out = format!("{} {}\n", self.width, self.height);
        let compact = self.vehicles.first().map_or(false, |v| v.y == self.exit_offset);
        if !compact {
            out.push_str(&format!("0 {}\n", self.exit_offset));
        }
        for v in &self.vehicles {
            out.push_str(&format!("{} {} {} {}\n", v.x, v.y, v.length, v.orientation.code()));
        }
        out
    }
}

// ══════════════════════════════════════════════════════════════
// Catalog
// ══════════════════════════════════════════════════════════════

/// Embedded puzzles followed by every parsable `.txt` file in `dir`.
pub fn load_catalog(dir: &Path) -> Vec<PuzzleDef> {
    let mut puzzles = embedded_puzzles();
    if dir.is_dir() {
        puzzles.extend(load_from_directory(dir));
    }
    puzzles
}

fn load_from_directory(dir: &Path) -> Vec<PuzzleDef> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read puzzles directory");
            return results;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            let text = match std::fs::read_to_string(&path) {
                Ok(t) => t,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot read puzzle file");
                    continue;
                }
            };
            if let Err(e) = load_board(&text) {
                warn!(path = %path.display(), error = %e, "skipping invalid puzzle");
                continue;
            }
            let name = path.file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            results.push(PuzzleDef { name, text });
        }
    }

    results.sort_by(|a, b| a.name.cmp(&b.name));
    results
}

// ══════════════════════════════════════════════════════════════
// Embedded puzzles
// ══════════════════════════════════════════════════════════════

fn embedded_puzzles() -> Vec<PuzzleDef> {
    vec![
        make_embedded("Rush 1 - Warm Up", &[
            "6 6",
            "1 2 2 T",
            "3 1 3 F",
            "0 0 2 T",
            "4 4 2 F",
            "0 4 3 T",
            "5 0 3 F",
        ]),
        make_embedded("Rush 2 - Side Street", &[
            "6 6",
            "1 2 2 T",
            "0 0 3 T",
            "3 1 2 F",
            "4 0 2 F",
            "0 1 2 F",
            "2 3 3 T",
            "5 2 2 F",
            "0 5 3 T",
            "3 4 2 F",
            "5 4 2 F",
        ]),
        make_embedded("Rush 3 - Gridlock", &[
            "6 6",
            "0 2 2 T",
            "2 0 3 F",
            "3 1 2 F",
            "4 0 2 T",
            "5 2 3 F",
            "0 3 2 F",
            "1 4 3 T",
            "4 5 2 T",
        ]),
    ]
}

fn make_embedded(name: &str, lines: &[&str]) -> PuzzleDef {
    let mut text = lines.join("\n");
    text.push('\n');
    PuzzleDef { name: name.to_string(), text }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "6 6\n1 2 2 T\n3 1 3 F\n0 0 2 T\n";

    #[test]
    fn parses_compact_form() {
        let p = parse_puzzle(SAMPLE).unwrap();
        assert_eq!((p.width, p.height, p.exit_offset), (6, 6, 2));
        assert_eq!(p.vehicles.len(), 3);
        assert_eq!(p.vehicles[0], VehicleSpec { x: 1, y: 2, length: 2, orientation: Orientation::Horizontal });
        assert_eq!(p.vehicles[1].orientation, Orientation::Vertical);
    }

    #[test]
    fn parses_header_form() {
        let p = parse_puzzle("6 6\n- 3\n0 3 2 T\n5 0 2 F\n").unwrap();
        assert_eq!(p.exit_offset, 3);
        assert_eq!(p.vehicles.len(), 2);
        assert_eq!(p.vehicles[0].y, 3);
    }

    #[test]
    fn first_vehicle_is_vip() {
        let b = load_board(SAMPLE).unwrap();
        assert!(b.vehicles()[0].is_vip);
        assert!(b.vehicles()[1..].iter().all(|v| !v.is_vip));
    }

    #[test]
    fn stops_at_first_non_vehicle_line() {
        let p = parse_puzzle("6 6\n1 2 2 T\n3 1 3 F\n\n0 0 2 T\n").unwrap();
        assert_eq!(p.vehicles.len(), 2);
        let p = parse_puzzle("6 6\n1 2 2 T\n3 1 3 F extra\n0 0 2 T\n").unwrap();
        assert_eq!(p.vehicles.len(), 1);
    }

    #[test]
    fn accepts_crlf() {
        let p = parse_puzzle("6 6\r\n1 2 2 T\r\n3 1 3 F\r\n").unwrap();
        assert_eq!(p.vehicles.len(), 2);
    }

    #[test]
    fn malformed_numbers_fail() {
        assert!(matches!(parse_puzzle("six 6\n1 2 2 T\n"), Err(PuzzleError::Malformed { line: 1, .. })));
        assert!(matches!(parse_puzzle("6 6\n1 x 2 T\n"), Err(PuzzleError::Malformed { line: 2, .. })));
        assert!(matches!(parse_puzzle("6 6\n1 2 2 T\n3 1 q F\n"), Err(PuzzleError::Malformed { line: 3, .. })));
        assert!(matches!(parse_puzzle("6 6\n1 2 0 T\n"), Err(PuzzleError::Malformed { line: 2, .. })));
        assert!(matches!(parse_puzzle(""), Err(PuzzleError::Malformed { line: 1, .. })));
        assert!(matches!(parse_puzzle("6 6\n"), Err(PuzzleError::Malformed { line: 2, .. })));
    }

    #[test]
    fn invalid_dimensions_fail_the_build() {
        assert!(matches!(load_board("0 6\n1 2 2 T\n"), Err(PuzzleError::Dimensions(_))));
        assert!(matches!(load_board("6 6\n1 6 2 T\n"), Err(PuzzleError::Dimensions(_))));
        assert!(matches!(load_board("6 -2\n1 0 2 T\n"), Err(PuzzleError::Dimensions(_))));
    }

    #[test]
    fn overlapping_or_outside_vehicles_fail() {
        assert_eq!(
            load_board("6 6\n1 2 2 T\n2 1 3 F\n").unwrap_err(),
            PuzzleError::VehicleBlocked { index: 1 }
        );
        assert_eq!(
            load_board("6 6\n5 2 2 T\n").unwrap_err(),
            PuzzleError::VehicleBlocked { index: 0 }
        );
    }

    #[test]
    fn header_only_puzzle_has_no_vehicles() {
        assert_eq!(load_board("6 6\n0 2\n").unwrap_err(), PuzzleError::NoVehicles);
    }

    #[test]
    fn text_round_trip_preserves_vehicle_records() {
        for def in embedded_puzzles() {
            let board = load_board(&def.text).unwrap();
            let spec = PuzzleSpec::from_board(&board);
            assert_eq!(spec, parse_puzzle(&def.text).unwrap(), "{}", def.name);
            let again = load_board(&spec.to_text()).unwrap();
            assert_eq!(again, board, "{}", def.name);
        }
    }

    #[test]
    fn header_form_round_trips() {
        let text = "5 4\n0 1\n0 3 2 T\n4 0 3 F\n";
        let board = load_board(text).unwrap();
        let out = PuzzleSpec::from_board(&board).to_text();
        assert_eq!(out, text);
    }

    #[test]
    fn catalog_adds_valid_txt_files_in_name_order() {
        let dir = std::env::temp_dir().join(format!("gridlock-catalog-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b.txt"), SAMPLE).unwrap();
        std::fs::write(dir.join("a.txt"), "6 6\n1 2 2 T\n").unwrap();
        std::fs::write(dir.join("broken.txt"), "6 6\n1 2 2 T\n1 2 2 T\n").unwrap();
        std::fs::write(dir.join("notes.md"), SAMPLE).unwrap();

        let catalog = load_catalog(&dir);
        let embedded = embedded_puzzles().len();
        let names: Vec<&str> = catalog[embedded..].iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(catalog[embedded + 1].text, SAMPLE);

        let _ = std::fs::remove_dir_all(&dir);
        assert_eq!(load_catalog(&dir).len(), embedded);
    }

    #[test]
    fn embedded_puzzles_are_valid() {
        for def in embedded_puzzles() {
            let board = load_board(&def.text).unwrap();
            assert!(board.check_occupancy(None).is_ok(), "{}", def.name);
        }
    }
}
