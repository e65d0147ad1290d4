//! Moving-average smoothing of raw temperatures.

use std::collections::VecDeque;

/// Default number of samples in the smoothing window.
pub const DEFAULT_WINDOW: usize = 5;

/// Moving-average filter over the most recent raw temperatures.
///
/// Single-writer and purely sequential: one value appended per reading,
/// oldest evicted once the window is full. The average is taken over
/// whatever the window currently holds, so the first observation simply
/// comes back rounded.
#[derive(Debug)]
pub struct SmoothingFilter {
    window: VecDeque<f64>,
    capacity: usize,
}

impl SmoothingFilter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a temperature and return the mean of the current window,
    /// rounded to one decimal place.
    pub fn observe(&mut self, temp: f64) -> f64 {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(temp);

        let mean = self.window.iter().sum::<f64>() / self.window.len() as f64;
        (mean * 10.0).round() / 10.0
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_returns_input() {
        let mut filter = SmoothingFilter::default();
        assert_eq!(filter.observe(26.0), 26.0);
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_partial_window_average() {
        let mut filter = SmoothingFilter::default();
        filter.observe(20.0);
        assert_eq!(filter.observe(22.0), 21.0);
        assert_eq!(filter.observe(24.0), 22.0);
    }

    #[test]
    fn test_mean_matches_last_inputs() {
        let mut filter = SmoothingFilter::default();
        let inputs = [20.0, 22.0, 24.0, 26.0, 28.0];
        let mut last = 0.0;
        for temp in inputs {
            last = filter.observe(temp);
        }
        let expected = inputs.iter().sum::<f64>() / inputs.len() as f64;
        assert_eq!(last, (expected * 10.0).round() / 10.0);
    }

    #[test]
    fn test_eviction_at_capacity() {
        let mut filter = SmoothingFilter::default();
        for temp in [10.0, 10.0, 10.0, 10.0, 10.0] {
            filter.observe(temp);
        }
        // The sixth value evicts the first; window is now four 10s and a 20.
        assert_eq!(filter.observe(20.0), 12.0);
        assert_eq!(filter.len(), 5);
    }

    #[test]
    fn test_rounding_to_one_decimal() {
        let mut filter = SmoothingFilter::default();
        filter.observe(1.0);
        // Mean 1.125 rounds down to one decimal.
        assert_eq!(filter.observe(1.25), 1.1);
    }
}
