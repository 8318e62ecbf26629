/// Routes raw readings to their (room, kind) window buffer
use crate::models::{AggregatedSample, MeasurementKind, SensorReading};
use crate::registry::channel_key;
use crate::storage::Pipeline;

/// Append a reading to the buffer for `room` and `kind`
///
/// Aggregation runs synchronously inside this call when the reading fills
/// the window.
///
/// # Returns
/// The aggregated sample if a window was closed
pub fn route(
    pipeline: &Pipeline,
    reading: SensorReading,
    kind: MeasurementKind,
    room: &str,
) -> Option<AggregatedSample> {
    pipeline.append(&channel_key(room, kind), reading)
}
