/// Per-key window buffers and histories shared by generator tasks and readers
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock};

use crate::models::{AggregatedSample, LatestReading, SensorReading};
use crate::registry;
use crate::storage::aggregator::WindowBuffer;
use crate::storage::history::History;
use crate::utils::{lock, read, write};

/// Buffer and history of a single (room, kind) key
///
/// Lock order is buffer, then history.
#[derive(Debug, Default)]
struct Channel {
    buffer: Mutex<WindowBuffer>,
    history: RwLock<History>,
}

/// Aggregation pipeline state
///
/// The key set is fixed at construction, so routing never takes a map-wide
/// lock and distinct keys never wait on each other.
#[derive(Debug)]
pub struct Pipeline {
    channels: HashMap<String, Channel>,
}

impl Pipeline {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let channels = keys
            .into_iter()
            .map(|key| (key.into(), Channel::default()))
            .collect();
        Self { channels }
    }

    /// Pipeline with one key per registered (room, kind) pair
    pub fn for_registry() -> Self {
        Self::new(registry::channels().map(|(room, kind)| registry::channel_key(room, kind)))
    }

    /// Append a reading to the key's buffer, aggregating when the window fills
    ///
    /// Append, size check, aggregation, storage and buffer reset all happen
    /// under the key's buffer lock.
    ///
    /// # Returns
    /// The stored sample when this reading closed a window
    pub fn append(&self, key: &str, reading: SensorReading) -> Option<AggregatedSample> {
        let Some(channel) = self.channels.get(key) else {
            warn!("Dropping reading for unknown key {}", key);
            return None;
        };

        let mut buffer = lock(&channel.buffer);
        let sample = buffer.push(reading)?;

        let evicted = write(&channel.history).store(sample.clone());
        if let Some(old) = evicted {
            debug!("Evicted {} sample from {}", key, old.timestamp);
        }
        debug!("{} aggregated value {:.2}", key, sample.value);
        Some(sample)
    }

    /// Readings currently waiting in the key's buffer
    pub fn pending(&self, key: &str) -> Option<usize> {
        self.channels.get(key).map(|c| lock(&c.buffer).len())
    }

    pub fn history(&self, key: &str) -> Option<Vec<AggregatedSample>> {
        self.channels.get(key).map(|c| read(&c.history).samples())
    }

    /// Most recent sample for the key; unknown keys also report no data
    pub fn latest(&self, key: &str) -> LatestReading {
        self.channels
            .get(key)
            .map(|c| read(&c.history).latest())
            .unwrap_or(LatestReading::NoData)
    }

    /// Ordered copy of every key's history
    pub fn snapshot(&self) -> BTreeMap<String, Vec<AggregatedSample>> {
        self.channels
            .iter()
            .map(|(key, c)| (key.clone(), read(&c.history).samples()))
            .collect()
    }
}
