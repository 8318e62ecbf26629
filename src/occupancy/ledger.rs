/// Person time ledger seeded from a CSV record at startup
use log::info;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;

use crate::models::{PersonTimes, TimeBucket};
use crate::utils::lock;

/// One row of the seed file
#[derive(Debug, Deserialize)]
struct PersonRecord {
    name: String,
    drive_time: u64,
    load_time: u64,
    idle_time: u64,
}

/// Running time totals per person
///
/// The set of names is fixed once seeded; only the totals grow.
#[derive(Debug)]
pub struct Ledger {
    people: Mutex<BTreeMap<String, PersonTimes>>,
}

impl Ledger {
    /// Load the seed table from a CSV file with a
    /// `name,drive_time,load_time,idle_time` header
    pub fn load_csv(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let file = std::fs::File::open(path)
            .map_err(|e| format!("Cannot open ledger seed {}: {}", path.display(), e))?;
        let ledger = Self::from_reader(file)?;
        info!("Loaded {} people from {}", ledger.len(), path.display());
        Ok(ledger)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Box<dyn std::error::Error>> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut people = BTreeMap::new();

        for (line, record) in csv_reader.deserialize::<PersonRecord>().enumerate() {
            let record = record.map_err(|e| format!("Invalid ledger row {}: {}", line + 1, e))?;
            let times = PersonTimes {
                drive_time: record.drive_time,
                load_time: record.load_time,
                idle_time: record.idle_time,
            };
            if people.insert(record.name.clone(), times).is_some() {
                return Err(format!("Duplicate ledger entry for {}", record.name).into());
            }
        }

        Ok(Self {
            people: Mutex::new(people),
        })
    }

    /// Add `amount` to one bucket of `name`'s totals
    ///
    /// # Returns
    /// The updated totals, or None if `name` was never seeded
    pub fn credit(&self, name: &str, bucket: TimeBucket, amount: u64) -> Option<PersonTimes> {
        let mut people = lock(&self.people);
        let times = people.get_mut(name)?;
        *times.bucket_mut(bucket) += amount;
        Some(*times)
    }

    pub fn get(&self, name: &str) -> Option<PersonTimes> {
        lock(&self.people).get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        lock(&self.people).contains_key(name)
    }

    /// Copy of every person's totals, ordered by name
    pub fn all(&self) -> BTreeMap<String, PersonTimes> {
        lock(&self.people).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.people).len()
    }
}
