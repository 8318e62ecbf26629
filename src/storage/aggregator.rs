/// Fixed-size, non-overlapping window aggregation of raw readings
use log::debug;
use time::OffsetDateTime;

use crate::models::{AggregatedSample, SensorReading};
use crate::utils::{mean, round2};

/// Number of raw readings consumed by one aggregation
pub const BUFFER_SIZE: usize = 5;

/// Average a batch of readings into a single sample
///
/// The sample takes the first reading's sensor id and the aggregation
/// instant `at`, not the timestamps of the underlying readings. The mean is
/// rounded to 2 decimal places.
///
/// # Returns
/// None for an empty batch
pub fn aggregate_window(readings: &[SensorReading], at: OffsetDateTime) -> Option<AggregatedSample> {
    let first = readings.first()?;
    let value = mean(readings.iter().map(|r| r.value))?;

    Some(AggregatedSample {
        sensor_id: first.sensor_id.clone(),
        value: round2(value),
        timestamp: at,
    })
}

/// Readings for one key awaiting aggregation
#[derive(Debug)]
pub struct WindowBuffer {
    readings: Vec<SensorReading>,
    capacity: usize,
}

impl WindowBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            readings: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a reading; closes the window when it becomes full
    ///
    /// Reaching `capacity` aggregates the window and empties the buffer in
    /// the same call, so the buffer never holds more than `capacity` readings.
    pub fn push(&mut self, reading: SensorReading) -> Option<AggregatedSample> {
        self.readings.push(reading);
        if self.readings.len() < self.capacity {
            return None;
        }

        let sample = aggregate_window(&self.readings, OffsetDateTime::now_utc());
        debug!(
            "Window closed for {} over {} readings",
            self.readings[0].sensor_id,
            self.readings.len()
        );
        self.readings.clear();
        sample
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }
}

impl Default for WindowBuffer {
    fn default() -> Self {
        Self::new(BUFFER_SIZE)
    }
}
