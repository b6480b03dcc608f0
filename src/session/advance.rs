use std::time::{Duration, Instant};

/// Single pending "advance to the next question" deadline.
///
/// Scheduling replaces any earlier deadline, so at most one advance can ever
/// be outstanding for a session.
#[derive(Clone, Copy, Debug, Default)]
pub struct AdvanceTimer {
    due: Option<Instant>,
}

impl AdvanceTimer {
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.due.map(|due| due.saturating_duration_since(now))
    }

    /// Consume the deadline if it has passed. Returns true at most once per schedule.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
