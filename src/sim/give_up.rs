/// Give-up timer: lives outside the session and never touches it.
///
/// The affordance becomes available once `delay` has elapsed since the
/// puzzle started AND the audit log holds more than `min_records`
/// records. Cancelling (puzzle solved, puzzle switched) hides it for good
/// until `restart`.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct GiveUpTimer {
    started: Instant,
    delay: Duration,
    min_records: usize,
    cancelled: bool,
}

impl GiveUpTimer {
    pub fn new(delay: Duration, min_records: usize) -> Self {
        Self::started_at(Instant::now(), delay, min_records)
    }

    pub fn started_at(started: Instant, delay: Duration, min_records: usize) -> Self {
        GiveUpTimer { started, delay, min_records, cancelled: false }
    }

    pub fn restart(&mut self) {
        self.started = Instant::now();
        self.cancelled = false;
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_available(&self, records: usize) -> bool {
        self.is_available_at(Instant::now(), records)
    }

    pub fn is_available_at(&self, now: Instant, records: usize) -> bool {
        !self.cancelled
            && now.saturating_duration_since(self.started) >= self.delay
            && records > self.min_records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_MIN: Duration = Duration::from_secs(300);

    #[test]
    fn needs_both_time_and_records() {
        let t0 = Instant::now();
        let timer = GiveUpTimer::started_at(t0, FIVE_MIN, 50);
        assert!(!timer.is_available_at(t0 + Duration::from_secs(10), 100));
        assert!(!timer.is_available_at(t0 + FIVE_MIN, 50));
        assert!(timer.is_available_at(t0 + FIVE_MIN, 51));
    }

    #[test]
    fn cancel_hides_it() {
        let t0 = Instant::now();
        let mut timer = GiveUpTimer::started_at(t0, Duration::ZERO, 0);
        assert!(timer.is_available_at(t0, 1));
        timer.cancel();
        assert!(!timer.is_available_at(t0, 1));
    }
}
