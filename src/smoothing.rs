use std::collections::VecDeque;

use crate::types::{Axis, NormalizedMotionPoint};

/// Number of recent points kept for smoothing.
pub const MAX_HISTORY_LENGTH: usize = 5;

/// Newest-first history of normalized motion points.
///
/// Smoothing uses linear recency weights: the point at index `i` (0 = newest)
/// gets weight `capacity - i`. With values in `[0, 1]` the result stays in
/// `[0, 1]` since it is a convex combination.
#[derive(Clone, Debug)]
pub struct MotionHistoryBuffer {
    points: VecDeque<NormalizedMotionPoint>,
    capacity: usize,
}

impl MotionHistoryBuffer {
    /// Create a buffer holding at most `capacity` points (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        MotionHistoryBuffer {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Prepend a point, evicting the oldest once over capacity.
    pub fn push(&mut self, point: NormalizedMotionPoint) {
        self.points.push_front(point);
        self.points.truncate(self.capacity);
    }

    /// Recency-weighted mean of one axis. Empty buffer yields 0.
    pub fn weighted_average(&self, axis: Axis) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for (index, point) in self.points.iter().enumerate() {
            let weight = (self.capacity - index) as f64;
            weighted_sum += point.axis(axis) * weight;
            total_weight += weight;
        }

        weighted_sum / total_weight
    }

    /// Smoothed `(x, y, z)` triple.
    pub fn smoothed(&self) -> (f64, f64, f64) {
        (
            self.weighted_average(Axis::X),
            self.weighted_average(Axis::Y),
            self.weighted_average(Axis::Z),
        )
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Most recent point, if any.
    pub fn latest(&self) -> Option<&NormalizedMotionPoint> {
        self.points.front()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &NormalizedMotionPoint> {
        self.points.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for MotionHistoryBuffer {
    fn default() -> Self {
        Self::new(MAX_HISTORY_LENGTH)
    }
}
