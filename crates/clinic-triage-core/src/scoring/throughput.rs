//! Measured completion throughput over a trailing window.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

/// Tracks recent completions to estimate patients served per minute.
#[derive(Debug, Clone)]
pub struct ThroughputTracker {
    window_minutes: u32,
    min_samples: usize,
    completions: VecDeque<DateTime<Utc>>,
}

impl ThroughputTracker {
    pub fn new(window_minutes: u32, min_samples: usize) -> Self {
        Self {
            window_minutes: window_minutes.max(1),
            min_samples,
            completions: VecDeque::new(),
        }
    }

    /// Record a completion and drop samples that left the window.
    pub fn record(&mut self, at: DateTime<Utc>) {
        self.completions.push_back(at);
        let cutoff = at - self.window();
        self.completions.retain(|t| *t > cutoff);
    }

    /// Completions per minute inside the window ending at `now`.
    ///
    /// `None` until at least `min_samples` completions fall in the window.
    pub fn per_minute(&self, now: DateTime<Utc>) -> Option<f64> {
        let cutoff = now - self.window();
        let recent = self
            .completions
            .iter()
            .filter(|t| **t > cutoff && **t <= now)
            .count();

        if recent == 0 || recent < self.min_samples {
            return None;
        }
        Some(recent as f64 / f64::from(self.window_minutes))
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.completions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completions.is_empty()
    }

    fn window(&self) -> Duration {
        Duration::minutes(i64::from(self.window_minutes))
    }
}
