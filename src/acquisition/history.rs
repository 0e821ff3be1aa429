// src/acquisition/history.rs
//! Bounded, time-ordered sample history

use crate::waveform::Sample;
use std::collections::VecDeque;
use thiserror::Error;

/// History error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    #[error("Invalid history capacity {0} (must be between 1 and {max})", max = crate::config::constants::history::MAX_HISTORY_CAPACITY)]
    InvalidCapacity(usize),

    #[error("Sample at t={time}s is older than the newest sample at t={last}s")]
    OutOfOrder { time: f64, last: f64 },
}

/// FIFO history of generated samples.
///
/// Holds at most `capacity` samples with non-decreasing times; the oldest
/// sample is evicted first.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SampleHistory {
    pub fn new(capacity: usize) -> Result<Self, HistoryError> {
        if capacity == 0 || capacity > crate::config::constants::history::MAX_HISTORY_CAPACITY {
            return Err(HistoryError::InvalidCapacity(capacity));
        }

        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append at the tail, returning how many old samples were evicted
    pub fn push(&mut self, sample: Sample) -> Result<usize, HistoryError> {
        if let Some(last) = self.last_time() {
            if sample.time < last {
                return Err(HistoryError::OutOfOrder {
                    time: sample.time,
                    last,
                });
            }
        }

        self.samples.push_back(sample);

        let mut evicted = 0;
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
            evicted += 1;
        }
        Ok(evicted)
    }

    pub fn last_time(&self) -> Option<f64> {
        self.samples.back().map(|s| s.time)
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Samples with `time >= t_min`, oldest first
    pub fn since(&self, t_min: f64) -> impl Iterator<Item = &Sample> {
        let start = self.samples.partition_point(|s| s.time < t_min);
        self.samples.range(start..)
    }

    /// The newest `count` samples, oldest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &Sample> {
        let start = self.samples.len().saturating_sub(count);
        self.samples.range(start..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fill level (0.0 to 1.0)
    pub fn utilization(&self) -> f32 {
        self.samples.len() as f32 / self.capacity as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64) -> Sample {
        Sample {
            time,
            pressure: 5.0,
            flow: 0.0,
            volume: 0.0,
        }
    }

    #[test]
    fn test_invalid_capacity() {
        assert_eq!(SampleHistory::new(0).unwrap_err(), HistoryError::InvalidCapacity(0));
    }

    #[test]
    fn test_fifo_eviction() {
        let mut history = SampleHistory::new(3).unwrap();
        for i in 0..3 {
            assert_eq!(history.push(sample(i as f64)).unwrap(), 0);
        }
        assert_eq!(history.push(sample(3.0)).unwrap(), 1);
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().next().unwrap().time, 1.0);
        assert_eq!(history.last_time(), Some(3.0));
        assert!((history.utilization() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut history = SampleHistory::new(4).unwrap();
        history.push(sample(2.0)).unwrap();
        history.push(sample(2.0)).unwrap();
        assert!(matches!(
            history.push(sample(1.0)),
            Err(HistoryError::OutOfOrder { .. })
        ));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_since_and_recent() {
        let mut history = SampleHistory::new(10).unwrap();
        for i in 0..6 {
            history.push(sample(i as f64 * 0.5)).unwrap();
        }
        let times: Vec<f64> = history.since(1.0).map(|s| s.time).collect();
        assert_eq!(times, vec![1.0, 1.5, 2.0, 2.5]);

        let recent: Vec<f64> = history.recent(2).map(|s| s.time).collect();
        assert_eq!(recent, vec![2.0, 2.5]);
        assert_eq!(history.recent(100).count(), 6);
    }

    #[test]
    fn test_clear() {
        let mut history = SampleHistory::new(2).unwrap();
        history.push(sample(0.0)).unwrap();
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.last_time(), None);
        history.push(sample(0.0)).unwrap();
    }
}
