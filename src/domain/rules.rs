/// Drag resolution and win rule. Pure functions, no side effects.
///
/// These decide "where may the dragged vehicle be" without mutating
/// anything. The session applies the result.
///
/// ## Drag resolution
///
/// Input: the lifted vehicle (its footprint is NOT on the grid), its
/// current axis position `cur` (may be fractional) and a requested axis
/// position `target` (real, unsnapped).
///
/// ┌───────────────────┬──────────────────────────────────┬─────────────────┐
/// │ Direction          │ Cells scanned (in order)          │ First blocked c │
/// ├───────────────────┼──────────────────────────────────┼─────────────────┤
/// │ target < cur       │ floor(cur)-1  down to floor(target) │ clamp to c + 1  │
/// │ target >= cur      │ ceil(cur)+len up to ceil(target)+len-1 │ clamp to c - len │
/// └───────────────────┴──────────────────────────────────┴─────────────────┘
///
/// The scan stops at the first obstruction, so a fast pointer jump can never
/// carry the vehicle past a blocker. After clamping, both ends of the
/// footprint at the clamped position are checked once more; if either is
/// blocked the update is rejected and the vehicle keeps its old position.
///
/// ## Win rule
///
/// The VIP has escaped when its axis anchor is `>= extent - length + 1`:
/// its trailing edge is past the far edge, which only the exit gap allows.

use super::board::Board;
use super::grid::{Grid, CHUTE_COLS};
use super::vehicle::Vehicle;

/// Result of one drag update.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DragOutcome {
    /// Move to this (possibly clamped, possibly fractional) axis position.
    Slide { pos: f64, clamped: bool },
    /// Keep the previous position.
    Rejected,
}

/// Resolve a drag update for a lifted vehicle. See table above.
pub fn resolve_drag(grid: &Grid, v: &Vehicle, target: f64) -> DragOutcome {
    if !target.is_finite() { return DragOutcome::Rejected; }
    // Everything past the field edge reads as blocked.
    let far = (v.axis_extent(grid.width(), grid.height()) + CHUTE_COLS) as f64;
    let target = target.clamp(-1.0, far);

    let cur = v.axis_pos();
    let len = v.length;
    let blocked = |a: i32| {
        let (x, y) = v.cell_on_axis(a);
        grid.is_blocked(x, y)
    };

    let mut pos = target;
    let mut clamped = false;

    if target < cur {
        let stop = target.floor() as i32;
        let mut a = cur.floor() as i32 - 1;
        while a >= stop {
            if blocked(a) {
                pos = (a + 1) as f64;
                clamped = true;
                break;
            }
            a -= 1;
        }
    } else {
        let stop = target.ceil() as i32 + len - 1;
        let mut a = cur.ceil() as i32 + len;
        while a <= stop {
            if blocked(a) {
                pos = (a - len) as f64;
                clamped = true;
                break;
            }
            a += 1;
        }
    }

    // Footprint ends at the clamped position
    let tail = pos.floor() as i32;
    let head = pos.ceil() as i32 + len - 1;
    if blocked(tail) || blocked(head) {
        return DragOutcome::Rejected;
    }

    DragOutcome::Slide { pos, clamped }
}

/// Has this vehicle's trailing edge passed the far edge of the board?
pub fn has_escaped(v: &Vehicle, width: i32, height: i32) -> bool {
    let extent = v.axis_extent(width, height);
    v.cell() >= extent - v.length + 1
}

/// Has the board's VIP escaped through the exit?
pub fn vip_escaped(board: &Board) -> bool {
    board
        .vip()
        .map(|(_, v)| has_escaped(v, board.width(), board.height()))
        .unwrap_or(false)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::Orientation;

    /// Helper: build a board from a diagram. Each row is one board row.
    /// Legend: '.' = empty, 'A'..'Z' = horizontal vehicle, 'a'..'z' =
    /// vertical vehicle (letters in board order), '>' marks the exit row
    /// when placed after the last column. The first vehicle is the VIP.
    fn board_from(rows: &[&str]) -> Board {
        let height = rows.len() as i32;
        let width = rows[0].trim_end_matches('>').len() as i32;
        let exit = rows.iter().position(|r| r.ends_with('>')).unwrap_or(0) as i32;
        let mut board = Board::new(width, height, exit).unwrap();

        let mut placed: Vec<(char, i32, i32, i32)> = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.trim_end_matches('>').chars().enumerate() {
                if ch == '.' { continue; }
                if let Some(p) = placed.iter_mut().find(|p| p.0 == ch) {
                    p.3 += 1;
                } else {
                    placed.push((ch, x as i32, y as i32, 1));
                }
            }
        }
        for (i, (ch, x, y, len)) in placed.into_iter().enumerate() {
            let o = if ch.is_ascii_uppercase() { Orientation::Horizontal } else { Orientation::Vertical };
            board.add_vehicle(Vehicle::new(i == 0, o, len, x, y));
        }
        board
    }

    /// Lift vehicle `i` and resolve a drag to `target`.
    fn drag(board: &mut Board, i: usize, target: f64) -> DragOutcome {
        board.set_occupancy(i, false);
        let v = board.vehicle(i).unwrap().clone();
        resolve_drag(board.grid(), &v, target)
    }

    fn slide(pos: f64, clamped: bool) -> DragOutcome {
        DragOutcome::Slide { pos, clamped }
    }

    // ── Free sliding ──

    #[test]
    fn free_slide_right_is_fractional() {
        let mut b = board_from(&[
            "......",
            "AA....>",
            "......",
        ]);
        assert_eq!(drag(&mut b, 0, 1.4), slide(1.4, false));
    }

    #[test]
    fn free_slide_left() {
        let mut b = board_from(&[
            "...AA.>",
            "......",
        ]);
        assert_eq!(drag(&mut b, 0, 0.5), slide(0.5, false));
    }

    #[test]
    fn can_slide_back_over_own_footprint() {
        let mut b = board_from(&[
            "..AA..>",
        ]);
        assert_eq!(drag(&mut b, 0, 2.5), slide(2.5, false));
        assert_eq!(drag(&mut b, 0, 1.5), slide(1.5, false));
    }

    // ── Clamping ──

    #[test]
    fn clamps_against_vehicle_on_the_right() {
        let mut b = board_from(&[
            "......",
            "AA..b.>",
            "....b.",
        ]);
        assert_eq!(drag(&mut b, 0, 3.7), slide(2.0, true));
    }

    #[test]
    fn clamps_against_vehicle_on_the_left() {
        let mut b = board_from(&[
            "B..AA.>",
        ]);
        // vehicle 0 is "B" here (first seen); drag vehicle 1 (AA)
        assert_eq!(drag(&mut b, 1, -3.0), slide(1.0, true));
    }

    #[test]
    fn clamps_against_left_border() {
        let mut b = board_from(&[
            "..AA..>",
        ]);
        assert_eq!(drag(&mut b, 0, -10.0), slide(0.0, true));
    }

    #[test]
    fn clamps_against_right_border_outside_exit_row() {
        let mut b = board_from(&[
            "......>",
            "..BB..",
        ]);
        // vehicle 0 is BB (first seen), row 1 is not the exit row
        assert_eq!(drag(&mut b, 0, 9.0), slide(4.0, true));
    }

    #[test]
    fn vertical_clamps_up_and_down() {
        let mut b = board_from(&[
            "A.....>",
            "......",
            "b.....",
            "b.....",
            "......",
            "......",
        ]);
        assert_eq!(drag(&mut b, 1, -2.0), slide(1.0, true));
        assert_eq!(drag(&mut b, 1, 20.0), slide(4.0, true));
    }

    // ── No tunneling ──

    #[test]
    fn big_jump_cannot_pass_blocker() {
        let mut b = board_from(&[
            "AA.c..>",
            "...c..",
        ]);
        // pointer jumps far beyond the blocker in a single update
        assert_eq!(drag(&mut b, 0, 4.0), slide(1.0, true));
    }

    #[test]
    fn fractional_current_position_still_scans_next_cell() {
        let mut b = board_from(&[
            "AA..c.>",
            "....c.",
        ]);
        b.set_occupancy(0, false);
        b.vehicle_mut(0).unwrap().set_axis_pos(1.6);
        let v = b.vehicle(0).unwrap().clone();
        // ceil(1.6) + 2 = 4 is blocked
        assert_eq!(resolve_drag(b.grid(), &v, 2.9), slide(2.0, true));
    }

    // ── Exit ──

    #[test]
    fn vip_slides_into_chute_until_sentinel() {
        let mut b = board_from(&[
            "......",
            "...AA.>",
            "......",
        ]);
        // gap at x=6, chute at x=7, sentinel at x=8
        assert_eq!(drag(&mut b, 0, 12.0), slide(6.0, true));
    }

    #[test]
    fn far_finite_targets_clamp_without_overflow() {
        let mut b = board_from(&[
            "......",
            "...AA.>",
            "......",
        ]);
        assert_eq!(drag(&mut b, 0, 1e12), slide(6.0, true));
        assert_eq!(drag(&mut b, 0, f64::MAX), slide(6.0, true));
        assert_eq!(drag(&mut b, 0, -1e12), slide(0.0, true));
        assert_eq!(drag(&mut b, 0, f64::MIN), slide(0.0, true));
    }

    // ── Rejection ──

    #[test]
    fn non_finite_target_rejected() {
        let mut b = board_from(&["AA....>"]);
        assert_eq!(drag(&mut b, 0, f64::NAN), DragOutcome::Rejected);
        assert_eq!(drag(&mut b, 0, f64::INFINITY), DragOutcome::Rejected);
    }

    #[test]
    fn blocked_footprint_end_is_rejected() {
        let mut b = board_from(&[
            "AA.c..>",
            "...c..",
        ]);
        // Vehicle pushed (by a bad earlier state) right against the blocker
        // at a fractional position: its head already overlaps cell 3.
        b.set_occupancy(0, false);
        b.vehicle_mut(0).unwrap().set_axis_pos(1.5);
        let v = b.vehicle(0).unwrap().clone();
        assert_eq!(resolve_drag(b.grid(), &v, 1.8), DragOutcome::Rejected);
    }

    // ── Win rule ──

    #[test]
    fn win_exactness_width_six() {
        let mut b = board_from(&[
            "......",
            "......",
            "...AA.>",
            "......",
            "......",
            "......",
        ]);
        assert!(!vip_escaped(&b));
        b.relocate(0, 4);
        assert!(!vip_escaped(&b));
        b.relocate(0, 5);
        assert!(vip_escaped(&b));
    }

    #[test]
    fn non_vip_in_lane_is_not_a_win() {
        let mut b = board_from(&[
            "A.....",
            "....BB>",
        ]);
        b.relocate(1, 5);
        assert!(!vip_escaped(&b));
    }
}
