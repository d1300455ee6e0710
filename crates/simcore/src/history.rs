//! Bounded time-series history of a running loop.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of samples a session keeps by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 2000;

/// Owned copy of the buffer contents, as sent to the display layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub t: Vec<f64>,
    pub y: Vec<f64>,
    pub u: Vec<f64>,
    pub sp: Vec<f64>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Most recent `(t, y, u, sp)` sample, for live readouts
    pub fn last(&self) -> Option<(f64, f64, f64, f64)> {
        let i = self.t.len().checked_sub(1)?;
        Some((self.t[i], *self.y.get(i)?, *self.u.get(i)?, *self.sp.get(i)?))
    }
}

/// Four parallel series of equal length; the oldest sample is evicted first
/// once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    t: VecDeque<f64>,
    y: VecDeque<f64>,
    u: VecDeque<f64>,
    sp: VecDeque<f64>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            t: VecDeque::with_capacity(capacity),
            y: VecDeque::with_capacity(capacity),
            u: VecDeque::with_capacity(capacity),
            sp: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&mut self, t: f64, y: f64, u: f64, sp: f64) {
        self.t.push_back(t);
        self.y.push_back(y);
        self.u.push_back(u);
        self.sp.push_back(sp);
        self.trim_to_capacity();
    }

    fn trim_to_capacity(&mut self) {
        let cap = self.capacity;
        let trim = |v: &mut VecDeque<f64>| {
            while v.len() > cap {
                v.pop_front();
            }
        };
        trim(&mut self.t);
        trim(&mut self.y);
        trim(&mut self.u);
        trim(&mut self.sp);
    }

    pub fn clear(&mut self) {
        self.t.clear();
        self.y.clear();
        self.u.clear();
        self.sp.clear();
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn controls(&self) -> &VecDeque<f64> {
        &self.u
    }

    pub fn setpoints(&self) -> &VecDeque<f64> {
        &self.sp
    }

    /// Copy the current contents in chronological order.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            t: self.t.iter().copied().collect(),
            y: self.y.iter().copied().collect(),
            u: self.u.iter().copied().collect(),
            sp: self.sp.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_series_aligned() {
        let mut h = HistoryBuffer::new(4);
        h.push(0.0, 1.0, 0.5, 2.0);
        h.push(0.1, 1.1, 0.4, 2.0);
        let s = h.snapshot();
        assert_eq!(s.t, vec![0.0, 0.1]);
        assert_eq!(s.y, vec![1.0, 1.1]);
        assert_eq!(s.u, vec![0.5, 0.4]);
        assert_eq!(s.sp, vec![2.0, 2.0]);
        assert_eq!(s.last(), Some((0.1, 1.1, 0.4, 2.0)));
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut h = HistoryBuffer::new(3);
        for i in 0..5 {
            h.push(i as f64, 0.0, 0.0, 0.0);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.snapshot().t, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_last_of_ragged_snapshot_is_none() {
        let ragged: Snapshot =
            serde_json::from_str(r#"{"t":[0.0,0.1],"y":[1.0],"u":[0.0,0.0],"sp":[1.0,1.0]}"#).unwrap();
        assert_eq!(ragged.last(), None);
        assert_eq!(Snapshot::default().last(), None);
    }

    #[test]
    fn test_clear_empties_every_series() {
        let mut h = HistoryBuffer::default();
        h.push(0.0, 0.0, 0.0, 0.0);
        h.clear();
        assert!(h.is_empty());
        assert!(h.snapshot().is_empty());
        assert_eq!(h.capacity(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut h = HistoryBuffer::new(8);
        h.push(0.0, 1.0, 0.0, 1.0);
        let s = h.snapshot();
        h.push(0.1, 2.0, 0.0, 1.0);
        assert_eq!(s.len(), 1);
        assert_eq!(h.len(), 2);
    }
}
