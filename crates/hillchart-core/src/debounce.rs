use std::time::{Duration, Instant};

/// A single pending deadline that is pushed back on every [`Debouncer::schedule`] call.
///
/// At most one deadline exists at a time; scheduling again replaces it.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet_window(&self) -> Duration {
        self.quiet
    }

    /// Cancels any pending deadline and arms a new one `quiet` after `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Drops the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consumes the deadline if it has passed, returning whether the caller should fire.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescheduling_pushes_the_deadline_back() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.schedule(start);
        d.schedule(start + Duration::from_millis(200));

        assert!(!d.take_due(start + Duration::from_millis(300)));
        assert!(d.take_due(start + Duration::from_millis(500)));
        assert!(!d.is_pending());
        assert!(!d.take_due(start + Duration::from_millis(900)));
    }

    #[test]
    fn cancel_reports_whether_anything_was_pending() {
        let mut d = Debouncer::new(Duration::from_millis(300));
        assert!(!d.cancel());
        d.schedule(Instant::now());
        assert!(d.cancel());
        assert_eq!(d.deadline(), None);
    }
}
