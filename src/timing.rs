//! Phase stopwatch

use std::time::{Duration, Instant};

/// Measures phase-local deltas: each [`Stopwatch::lap`] returns the time since
/// the previous boundary and moves the boundary to now.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    last: Instant,
}

impl Stopwatch {
    /// Start measuring from now
    pub fn start() -> Self {
        Self { last: Instant::now() }
    }

    /// Close the current phase
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed
    }
}
