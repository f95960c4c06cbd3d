/// Replay an audit trail against its puzzle.
///
/// Used to validate solve records: every move must be a legal slide at
/// the moment it was made, `U` must have a move to revert, and nothing
/// may follow the winning move. Timestamps are ignored.
///
/// Moves are applied as whole-cell slides; a legal drag always ends on a
/// cell whose swept path was clear, so `Board::path_clear` is the check.

use thiserror::Error;
use tracing::debug;

use crate::domain::moves::Move;
use crate::domain::rules;
use super::log::{AuditLog, Record};
use super::puzzle::{self, PuzzleError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
    #[error("record {line}: no vehicle {vehicle}")]
    UnknownVehicle { line: usize, vehicle: usize },
    #[error("record {line}: zero-length move")]
    ZeroDelta { line: usize },
    #[error("record {line}: vehicle {vehicle} cannot slide by {delta}")]
    IllegalMove { line: usize, vehicle: usize, delta: i32 },
    #[error("record {line}: undo with no move to revert")]
    UndoWithoutMove { line: usize },
    #[error("record {line}: puzzle was already solved")]
    RecordAfterSolve { line: usize },
}

/// Summary of a successful replay.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ReplayReport {
    pub solved: bool,
    pub moves: usize,
    pub undos: usize,
    pub resets: usize,
}

pub fn replay(puzzle_text: &str, audit: &AuditLog) -> Result<ReplayReport, ReplayError> {
    let mut board = puzzle::load_board(puzzle_text)?;
    let mut stack: Vec<Move> = Vec::new();
    let mut report = ReplayReport::default();

    for (i, entry) in audit.entries().iter().enumerate() {
        let line = i + 1;
        if report.solved {
            return Err(ReplayError::RecordAfterSolve { line });
        }

        match entry.record {
            Record::Move { vehicle, delta } => {
                let Some(v) = board.vehicle(vehicle) else {
                    return Err(ReplayError::UnknownVehicle { line, vehicle });
                };
                if delta == 0 {
                    return Err(ReplayError::ZeroDelta { line });
                }
                let start = v.cell();
                let Some(end) = start.checked_add(delta).filter(|&e| board.path_clear(vehicle, e)) else {
                    return Err(ReplayError::IllegalMove { line, vehicle, delta });
                };
                board.relocate(vehicle, end);
                stack.push(Move::new(vehicle, start, end));
                report.moves += 1;
                report.solved = rules::vip_escaped(&board);
            }
            Record::Undo => {
                let Some(mv) = stack.pop() else {
                    return Err(ReplayError::UndoWithoutMove { line });
                };
                let back = mv.inverse();
                board.relocate(back.vehicle, back.end);
                report.undos += 1;
            }
            Record::Reset => {
                board = puzzle::load_board(puzzle_text)?;
                stack.clear();
                report.resets += 1;
            }
        }
    }

    debug!(?report, "audit replayed");
    Ok(report)
}
