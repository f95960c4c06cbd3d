/// A single applied move along a vehicle's fixed axis.
///
/// Positions are grid-aligned anchor coordinates. A move is never
/// recorded when `start == end`.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Move {
    pub vehicle: usize,
    pub start: i32,
    pub end: i32,
}

impl Move {
    pub fn new(vehicle: usize, start: i32, end: i32) -> Self {
        Move { vehicle, start, end }
    }

    /// Signed cell displacement.
    pub fn delta(&self) -> i32 {
        self.end - self.start
    }

    pub fn is_noop(&self) -> bool {
        self.start == self.end
    }

    /// The move that undoes this one.
    pub fn inverse(&self) -> Move {
        Move { vehicle: self.vehicle, start: self.end, end: self.start }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_and_inverse() {
        let m = Move::new(3, 1, 4);
        assert_eq!(m.delta(), 3);
        assert_eq!(m.inverse(), Move::new(3, 4, 1));
        assert_eq!(m.inverse().delta(), -3);
        assert_eq!(m.inverse().inverse(), m);
    }

    #[test]
    fn noop() {
        assert!(Move::new(0, 2, 2).is_noop());
        assert!(!Move::new(0, 2, 1).is_noop());
    }
}
