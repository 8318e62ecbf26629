/// Read-side accessors for collaborators outside the simulation core
use std::collections::BTreeMap;

use crate::models::{LatestReading, MeasurementKind, RoomStatus};
use crate::occupancy::machine::{OccupancyMachine, RoomSnapshot};
use crate::registry::channel_key;
use crate::storage::Pipeline;
use crate::utils::format_datetime;

/// Latest aggregated value for `room` and `kind`
///
/// Room ids are matched case-insensitively ("Room1" and "room1" are the same).
pub fn latest_reading(pipeline: &Pipeline, room: &str, kind: MeasurementKind) -> LatestReading {
    pipeline.latest(&channel_key(&room.to_lowercase(), kind))
}

/// One-sentence description of the latest reading
///
/// An empty history yields a "no data" sentence rather than a number.
pub fn describe_latest(pipeline: &Pipeline, room: &str, kind: MeasurementKind) -> String {
    let room = room.to_lowercase();
    match latest_reading(pipeline, &room, kind) {
        LatestReading::Present(sample) => format!(
            "The {} in {} is {:.2}{} (as of {})",
            kind,
            room,
            sample.value,
            kind.unit(),
            format_datetime(&sample.timestamp)
        ),
        LatestReading::NoData => format!("No {} data is available for {} yet", kind, room),
    }
}

/// Status of each tracked room, keyed by room
pub fn device_status(machine: &OccupancyMachine) -> BTreeMap<String, RoomStatus> {
    machine.statuses().into_iter().collect()
}

/// Occupant and running totals of each tracked room, keyed by room
pub fn person_data(machine: &OccupancyMachine) -> BTreeMap<String, RoomSnapshot> {
    machine
        .snapshots()
        .into_iter()
        .map(|snapshot| (snapshot.room.clone(), snapshot))
        .collect()
}
