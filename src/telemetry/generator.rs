/// Synthetic sensor readings and the per-sensor producer task
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::models::{MeasurementKind, SensorReading};
use crate::registry::sensor_id;
use crate::storage::Pipeline;
use crate::telemetry::router::route;
use crate::utils::round2;

/// Unbounded source of readings for one (room, kind) sensor
///
/// Values are drawn uniformly from the kind's range and rounded to 2 decimal
/// places. The iterator never ends.
pub struct ReadingGenerator<R> {
    sensor_id: String,
    kind: MeasurementKind,
    rng: R,
}

impl<R: Rng> ReadingGenerator<R> {
    pub fn new(room: &str, kind: MeasurementKind, rng: R) -> Self {
        Self {
            sensor_id: sensor_id(room, kind),
            kind,
            rng,
        }
    }

    pub fn next_reading(&mut self) -> SensorReading {
        let (low, high) = self.kind.value_range();
        SensorReading {
            sensor_id: self.sensor_id.clone(),
            value: round2(self.rng.gen_range(low..=high)),
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

impl<R: Rng> Iterator for ReadingGenerator<R> {
    type Item = SensorReading;

    fn next(&mut self) -> Option<SensorReading> {
        Some(self.next_reading())
    }
}

/// Emit a reading for `room`/`kind` every `period` until cancelled
///
/// The first reading is produced immediately; each following one after
/// another full period.
pub async fn run_generator(
    room: String,
    kind: MeasurementKind,
    pipeline: Arc<Pipeline>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut generator = ReadingGenerator::new(&room, kind, StdRng::from_entropy());
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Starting {} generator for {}", kind, room);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let reading = generator.next_reading();
                debug!("{} reading {:.2}{}", reading.sensor_id, reading.value, kind.unit());
                route(&pipeline, reading, kind, &room);
            }
        }
    }

    info!("Stopped {} generator for {}", kind, room);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_stay_in_range_with_two_decimals() {
        for kind in MeasurementKind::ALL {
            let (low, high) = kind.value_range();
            let generator = ReadingGenerator::new("room1", kind, StdRng::seed_from_u64(7));

            for reading in generator.take(1_000) {
                assert!(reading.value >= low && reading.value <= high, "{}", reading.value);
                assert_eq!(round2(reading.value), reading.value);
                assert_eq!(reading.sensor_id, format!("room1_{}_sensor", kind));
            }
        }
    }

    #[test]
    fn seeded_generators_repeat() {
        let a: Vec<f64> = ReadingGenerator::new("room2", MeasurementKind::Humidity, StdRng::seed_from_u64(1))
            .take(10)
            .map(|r| r.value)
            .collect();
        let b: Vec<f64> = ReadingGenerator::new("room2", MeasurementKind::Humidity, StdRng::seed_from_u64(1))
            .take(10)
            .map(|r| r.value)
            .collect();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn generator_feeds_pipeline_and_stops_on_cancel() {
        let pipeline = Arc::new(Pipeline::for_registry());
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run_generator(
            "room1".to_string(),
            MeasurementKind::Temperature,
            Arc::clone(&pipeline),
            Duration::from_millis(1),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("generator should stop after cancellation")
            .unwrap();

        let history = pipeline.history("room1_temperature").unwrap();
        let pending = pipeline.pending("room1_temperature").unwrap();
        assert!(!history.is_empty() || pending > 0);
        assert!(pending < crate::storage::BUFFER_SIZE);
        assert!(pipeline.history("room1_humidity").unwrap().is_empty());
    }
}
