/// Move log: the undo stack plus the timestamped audit trail.
///
/// Two parallel records:
///   - `moves`: applied moves, popped by undo, cleared by reset.
///   - `audit`: append-only text records for the solve history.
///
/// Every recorded move appends exactly one audit record, in the same
/// order. Undo and reset append their own markers (`U`, `R`), which are
/// never themselves undoable.
///
/// ## Audit text format
///   ```text
///   <unixMillis> <vehicleIndex> <signedDelta>
///   <unixMillis> U
///   <unixMillis> R
///   ```

use std::fmt;

use thiserror::Error;

use crate::domain::moves::Move;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Record {
    Move { vehicle: usize, delta: i32 },
    Undo,
    Reset,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Move { vehicle, delta } => write!(f, "{vehicle} {delta}"),
            Record::Undo => f.write_str("U"),
            Record::Reset => f.write_str("R"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AuditEntry {
    pub millis: u64,
    pub record: Record,
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.millis, self.record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad audit record at line {line}: `{text}`")]
pub struct AuditParseError {
    pub line: usize,
    pub text: String,
}

// ══════════════════════════════════════════════════════════════
// Audit log
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        AuditLog::default()
    }

    pub fn push(&mut self, millis: u64, record: Record) {
        self.entries.push(AuditEntry { millis, record });
    }

    pub fn entries(&self) -> &[AuditEntry] { &self.entries }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Newline-terminated text, one record per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for e in &self.entries {
            out.push_str(&e.to_string());
            out.push('\n');
        }
        out
    }

    /// Parse audit text. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, AuditParseError> {
        let mut log = AuditLog::new();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() { continue; }
            let bad = || AuditParseError { line: i + 1, text: line.to_string() };
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let millis = tokens.first().and_then(|t| t.parse::<u64>().ok()).ok_or_else(bad)?;
            let record = match tokens[1..] {
                ["U"] => Record::Undo,
                ["R"] => Record::Reset,
                [vehicle, delta] => Record::Move {
                    vehicle: vehicle.parse().map_err(|_| bad())?,
                    delta: delta.parse().map_err(|_| bad())?,
                },
                _ => return Err(bad()),
            };
            log.push(millis, record);
        }
        Ok(log)
    }
}

// ══════════════════════════════════════════════════════════════
// Move log
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct MoveLog {
    moves: Vec<Move>,
    audit: AuditLog,
}

impl MoveLog {
    pub fn new() -> Self {
        MoveLog::default()
    }

    pub fn moves(&self) -> &[Move] { &self.moves }
    pub fn audit(&self) -> &AuditLog { &self.audit }

    /// Record a finished move. No-op moves are dropped; returns whether
    /// the move was recorded.
    pub fn record_move(&mut self, mv: Move, millis: u64) -> bool {
        if mv.is_noop() { return false; }
        self.moves.push(mv);
        self.audit.push(millis, Record::Move { vehicle: mv.vehicle, delta: mv.delta() });
        true
    }

    /// Pop the most recent move for undo and append the `U` marker.
    pub fn pop_for_undo(&mut self, millis: u64) -> Option<Move> {
        let mv = self.moves.pop()?;
        self.audit.push(millis, Record::Undo);
        Some(mv)
    }

    /// Forget the undo stack (the audit trail is kept) and append `R`.
    pub fn mark_reset(&mut self, millis: u64) {
        self.moves.clear();
        self.audit.push(millis, Record::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_moves_are_not_recorded() {
        let mut log = MoveLog::new();
        assert!(!log.record_move(Move::new(0, 3, 3), 10));
        assert!(log.moves().is_empty());
        assert!(log.audit().is_empty());
    }

    #[test]
    fn move_record_carries_signed_delta() {
        let mut log = MoveLog::new();
        assert!(log.record_move(Move::new(2, 4, 1), 1000));
        assert_eq!(log.audit().to_text(), "1000 2 -3\n");
    }

    #[test]
    fn undo_pops_and_marks() {
        let mut log = MoveLog::new();
        log.record_move(Move::new(0, 1, 3), 1);
        log.record_move(Move::new(1, 0, 2), 2);
        assert_eq!(log.pop_for_undo(3), Some(Move::new(1, 0, 2)));
        assert_eq!(log.moves(), &[Move::new(0, 1, 3)]);
        assert_eq!(log.audit().to_text(), "1 0 2\n2 1 2\n3 U\n");
    }

    #[test]
    fn undo_on_empty_log_leaves_audit_alone() {
        let mut log = MoveLog::new();
        assert_eq!(log.pop_for_undo(5), None);
        assert!(log.audit().is_empty());
    }

    #[test]
    fn reset_clears_moves_but_keeps_audit() {
        let mut log = MoveLog::new();
        log.record_move(Move::new(0, 1, 3), 1);
        log.mark_reset(2);
        assert!(log.moves().is_empty());
        assert_eq!(log.audit().len(), 2);
        assert_eq!(log.audit().entries()[1].record, Record::Reset);
    }

    #[test]
    fn audit_text_parses_back() {
        let text = "1 0 2\n2 3 -1\n3 U\n\n4 R\n";
        let log = AuditLog::parse(text).unwrap();
        assert_eq!(log.len(), 4);
        assert_eq!(log.entries()[1].record, Record::Move { vehicle: 3, delta: -1 });
        assert_eq!(log.to_text(), "1 0 2\n2 3 -1\n3 U\n4 R\n");
    }

    #[test]
    fn audit_parse_reports_line() {
        let err = AuditLog::parse("1 0 2\n2 X\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(AuditLog::parse("abc U\n").is_err());
        assert!(AuditLog::parse("5 1\n").is_err());
        assert!(AuditLog::parse("5 1 2 3\n").is_err());
    }
}
