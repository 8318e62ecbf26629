/// Static sensor entity registry
use crate::models::{EntityMetadata, MeasurementKind};

/// Rooms that carry a temperature and a humidity sensor
pub const ROOMS: [&str; 3] = ["room1", "room2", "room3"];

const ENTITIES: [(&str, MeasurementKind, &str); 6] = [
    ("room1_temperature_sensor", MeasurementKind::Temperature, "Room 1"),
    ("room1_humidity_sensor", MeasurementKind::Humidity, "Room 1"),
    ("room2_temperature_sensor", MeasurementKind::Temperature, "Room 2"),
    ("room2_humidity_sensor", MeasurementKind::Humidity, "Room 2"),
    ("room3_temperature_sensor", MeasurementKind::Temperature, "Room 3"),
    ("room3_humidity_sensor", MeasurementKind::Humidity, "Room 3"),
];

/// Look up metadata for a sensor id, None when the sensor is unknown
pub fn lookup(sensor_id: &str) -> Option<EntityMetadata> {
    ENTITIES
        .iter()
        .find(|(id, _, _)| *id == sensor_id)
        .map(|&(_, kind, location)| EntityMetadata { kind, location })
}

pub fn sensor_id(room: &str, kind: MeasurementKind) -> String {
    format!("{}_{}_sensor", room, kind)
}

/// Key shared by a room/kind pair's window buffer and history
pub fn channel_key(room: &str, kind: MeasurementKind) -> String {
    format!("{}_{}", room, kind)
}

/// Every (room, kind) pair that gets its own generator
pub fn channels() -> impl Iterator<Item = (&'static str, MeasurementKind)> {
    ROOMS
        .iter()
        .flat_map(|&room| MeasurementKind::ALL.iter().map(move |&kind| (room, kind)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_channel_has_a_registered_sensor() {
        for (room, kind) in channels() {
            let metadata = lookup(&sensor_id(room, kind)).expect("sensor registered");
            assert_eq!(metadata.kind, kind);
        }
        assert_eq!(channels().count(), 6);
    }

    #[test]
    fn lookup_reports_location() {
        let metadata = lookup("room2_humidity_sensor").unwrap();
        assert_eq!(metadata.location, "Room 2");
        assert_eq!(metadata.kind, MeasurementKind::Humidity);
    }

    #[test]
    fn unknown_sensor_is_absent() {
        assert_eq!(lookup("room9_pressure_sensor"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn key_formats() {
        assert_eq!(sensor_id("room1", MeasurementKind::Temperature), "room1_temperature_sensor");
        assert_eq!(channel_key("room3", MeasurementKind::Humidity), "room3_humidity");
    }
}
