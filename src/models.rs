use serde::Serialize;
use std::fmt;
use time::OffsetDateTime;

/// Physical quantity measured by a synthetic sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    Temperature,
    Humidity,
}

impl MeasurementKind {
    pub const ALL: [MeasurementKind; 2] = [MeasurementKind::Temperature, MeasurementKind::Humidity];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKind::Temperature => "temperature",
            MeasurementKind::Humidity => "humidity",
        }
    }

    /// Inclusive range synthetic values are drawn from
    pub fn value_range(&self) -> (f64, f64) {
        match self {
            MeasurementKind::Temperature => (20.0, 30.0),
            MeasurementKind::Humidity => (40.0, 60.0),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MeasurementKind::Temperature => "°C",
            MeasurementKind::Humidity => "%",
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw reading emitted by a generator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub sensor_id: String,
    pub value: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Mean of one full window, stamped with the time of aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSample {
    pub sensor_id: String,
    pub value: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityMetadata {
    pub kind: MeasurementKind,
    pub location: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Vacant,
    Working,
    Idling,
}

impl RoomStatus {
    /// Ledger bucket credited when a room moves into this status
    pub fn bucket(&self) -> TimeBucket {
        match self {
            RoomStatus::Vacant => TimeBucket::Drive,
            RoomStatus::Working => TimeBucket::Load,
            RoomStatus::Idling => TimeBucket::Idle,
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomStatus::Vacant => "vacant",
            RoomStatus::Working => "working",
            RoomStatus::Idling => "idling",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBucket {
    Drive,
    Load,
    Idle,
}

/// Running time totals for one person
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersonTimes {
    pub drive_time: u64,
    pub load_time: u64,
    pub idle_time: u64,
}

impl PersonTimes {
    pub fn bucket_mut(&mut self, bucket: TimeBucket) -> &mut u64 {
        match bucket {
            TimeBucket::Drive => &mut self.drive_time,
            TimeBucket::Load => &mut self.load_time,
            TimeBucket::Idle => &mut self.idle_time,
        }
    }
}

/// Most recent aggregated sample for a key, or an explicit absence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LatestReading {
    Present(AggregatedSample),
    NoData,
}

impl LatestReading {
    pub fn sample(&self) -> Option<&AggregatedSample> {
        match self {
            LatestReading::Present(sample) => Some(sample),
            LatestReading::NoData => None,
        }
    }
}
