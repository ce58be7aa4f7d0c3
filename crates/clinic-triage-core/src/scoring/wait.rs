//! Wait-time estimation.
//!
//! Policy: a patient waits for everyone ranked ahead of them to be served.
//! With throughput `r` patients per minute, the patient at position `p`
//! waits `(p - 1) / r` minutes, so the head of the queue waits 0.

/// Service length assumed when no usable throughput is supplied.
pub const DEFAULT_SERVICE_MINUTES: f64 = 30.0;

/// Maps queue positions to estimated waits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitEstimator {
    default_service_minutes: f64,
}

impl Default for WaitEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_MINUTES)
    }
}

impl WaitEstimator {
    /// Create an estimator. Non-positive or non-finite values use the default.
    pub fn new(default_service_minutes: f64) -> Self {
        let default_service_minutes =
            if default_service_minutes.is_finite() && default_service_minutes > 0.0 {
                default_service_minutes
            } else {
                DEFAULT_SERVICE_MINUTES
            };
        Self {
            default_service_minutes,
        }
    }

    pub fn default_service_minutes(&self) -> f64 {
        self.default_service_minutes
    }

    /// Throughput implied by the default service length.
    pub fn default_throughput(&self) -> f64 {
        1.0 / self.default_service_minutes
    }

    /// Estimated wait in minutes for a 1-based `position`.
    pub fn estimate(&self, position: u32, throughput_per_minute: f64) -> f64 {
        let ahead = position.saturating_sub(1);
        if ahead == 0 {
            return 0.0;
        }
        f64::from(ahead) / self.effective_throughput(throughput_per_minute)
    }

    /// Mean estimated wait over a set of positions; 0 for an empty set.
    pub fn aggregate<I>(&self, positions: I, throughput_per_minute: f64) -> f64
    where
        I: IntoIterator<Item = u32>,
    {
        let (count, total) = positions
            .into_iter()
            .fold((0u32, 0.0f64), |(count, total), position| {
                (count + 1, total + self.estimate(position, throughput_per_minute))
            });

        if count == 0 {
            0.0
        } else {
            total / f64::from(count)
        }
    }

    fn effective_throughput(&self, throughput_per_minute: f64) -> f64 {
        if throughput_per_minute.is_finite() && throughput_per_minute > 0.0 {
            throughput_per_minute
        } else {
            self.default_throughput()
        }
    }
}
