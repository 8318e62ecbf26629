/// Capacity-bounded, insertion-ordered history of aggregated samples
use std::collections::VecDeque;

use crate::models::{AggregatedSample, LatestReading};

/// Maximum samples retained per key
pub const MAX_DATA_LENGTH: usize = 100;

#[derive(Debug)]
pub struct History {
    samples: VecDeque<AggregatedSample>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one first when full
    ///
    /// # Returns
    /// The evicted sample, if any
    pub fn store(&mut self, sample: AggregatedSample) -> Option<AggregatedSample> {
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    /// Oldest first
    pub fn samples(&self) -> Vec<AggregatedSample> {
        self.samples.iter().cloned().collect()
    }

    pub fn latest(&self) -> LatestReading {
        match self.samples.back() {
            Some(sample) => LatestReading::Present(sample.clone()),
            None => LatestReading::NoData,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_DATA_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, OffsetDateTime};

    fn sample(seq: i64, base: OffsetDateTime) -> AggregatedSample {
        AggregatedSample {
            sensor_id: "room1_humidity_sensor".to_string(),
            value: 40.0 + seq as f64 / 100.0,
            timestamp: base + Duration::seconds(seq * 10),
        }
    }

    #[test]
    fn empty_history_reports_no_data() {
        let history = History::default();
        assert_eq!(history.latest(), LatestReading::NoData);
        assert!(history.samples().is_empty());
    }

    #[test]
    fn latest_is_last_stored() {
        let base = OffsetDateTime::now_utc();
        let mut history = History::default();
        history.store(sample(0, base));
        history.store(sample(1, base));

        assert_eq!(history.latest(), LatestReading::Present(sample(1, base)));
    }

    #[test]
    fn full_history_evicts_oldest_only() {
        let base = OffsetDateTime::now_utc();
        let mut history = History::default();
        for seq in 0..MAX_DATA_LENGTH as i64 {
            assert!(history.store(sample(seq, base)).is_none());
        }
        assert_eq!(history.len(), MAX_DATA_LENGTH);

        let newest = sample(MAX_DATA_LENGTH as i64, base);
        let evicted = history.store(newest.clone()).expect("oldest should be evicted");

        assert_eq!(evicted.timestamp, base);
        assert_eq!(history.len(), MAX_DATA_LENGTH);

        let samples = history.samples();
        assert_eq!(samples.first(), Some(&sample(1, base)));
        assert_eq!(samples.last(), Some(&newest));
        assert!(samples.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let base = OffsetDateTime::now_utc();
        let mut history = History::new(3);
        for seq in 0..10 {
            history.store(sample(seq, base));
            assert!(history.len() <= 3);
        }
        let values: Vec<_> = history.samples().iter().map(|s| s.timestamp).collect();
        assert_eq!(
            values,
            vec![
                base + Duration::seconds(70),
                base + Duration::seconds(80),
                base + Duration::seconds(90)
            ]
        );
    }
}
