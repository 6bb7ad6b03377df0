use std::{collections::VecDeque, num::NonZeroUsize};

use serde::Serialize;

/// A single recorded forecast, labeled by the order it was made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub seq: u64,
    pub catch_kg: u32,
}

/// A bounded FIFO of the most recent catch forecasts.
///
/// Once full, every new point evicts the oldest one.
#[derive(Debug, Clone)]
pub struct TrendHistory {
    points: VecDeque<TrendPoint>,
    capacity: NonZeroUsize,
    next_seq: u64,
}

impl TrendHistory {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.get()),
            capacity,
            next_seq: 0,
        }
    }

    /// Records a new catch forecast.
    ///
    /// # Returns
    /// The evicted point, if the history was full.
    pub fn push(&mut self, catch_kg: u32) -> Option<TrendPoint> {
        let evicted = if self.points.len() == self.capacity.get() {
            self.points.pop_front()
        } else {
            None
        };

        self.points.push_back(TrendPoint {
            seq: self.next_seq,
            catch_kg,
        });
        self.next_seq += 1;

        evicted
    }

    /// Returns the retained catch values, oldest first.
    pub fn values(&self) -> Vec<u32> {
        self.points.iter().map(|point| point.catch_kg).collect()
    }

    pub fn points(&self) -> impl Iterator<Item = &TrendPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Drops every point, sequence numbers keep growing.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}
