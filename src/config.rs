use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::time::Duration;

use crate::occupancy::CreditPolicy;

const DEFAULT_PERSON_TIMES_CSV: &str = "data/person_times.csv";
const DEFAULT_READING_INTERVAL_SECS: u64 = 2;
const DEFAULT_OCCUPANCY_TICK_SECS: u64 = 10;
const DEFAULT_SUMMARY_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub person_times_path: PathBuf,
    pub reading_interval: Duration,
    pub occupancy_tick: Duration,
    pub summary_interval: Duration,
    pub credit_policy: CreditPolicy,
}

impl SimulationConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let person_times_path = lookup("PERSON_TIMES_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PERSON_TIMES_CSV));

        let reading_interval =
            interval_secs(&lookup, "READING_INTERVAL_SECS", DEFAULT_READING_INTERVAL_SECS)?;
        let occupancy_tick =
            interval_secs(&lookup, "OCCUPANCY_TICK_SECS", DEFAULT_OCCUPANCY_TICK_SECS)?;
        let summary_interval =
            interval_secs(&lookup, "SUMMARY_INTERVAL_SECS", DEFAULT_SUMMARY_INTERVAL_SECS)?;

        let credit_policy = match lookup("CREDIT_POLICY") {
            Some(value) => CreditPolicy::from_str(&value)?,
            None => CreditPolicy::default(),
        };

        Ok(SimulationConfig {
            person_times_path,
            reading_interval,
            occupancy_tick,
            summary_interval,
            credit_policy,
        })
    }
}

fn interval_secs<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, String>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("{} must be a whole number of seconds: {}", key, e))?,
        None => default,
    };

    if secs == 0 {
        return Err(format!("{} must be greater than zero", key));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SimulationConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.person_times_path, PathBuf::from("data/person_times.csv"));
        assert_eq!(config.reading_interval, Duration::from_secs(2));
        assert_eq!(config.occupancy_tick, Duration::from_secs(10));
        assert_eq!(config.summary_interval, Duration::from_secs(60));
        assert_eq!(config.credit_policy, CreditPolicy::Outgoing);
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("PERSON_TIMES_CSV", "/srv/people.csv"),
            ("READING_INTERVAL_SECS", "1"),
            ("OCCUPANCY_TICK_SECS", " 5 "),
            ("CREDIT_POLICY", "incoming"),
        ])
        .unwrap();
        assert_eq!(config.person_times_path, PathBuf::from("/srv/people.csv"));
        assert_eq!(config.reading_interval, Duration::from_secs(1));
        assert_eq!(config.occupancy_tick, Duration::from_secs(5));
        assert_eq!(config.credit_policy, CreditPolicy::Incoming);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("READING_INTERVAL_SECS", "two")]).is_err());
        assert!(config_from(&[("OCCUPANCY_TICK_SECS", "0")]).is_err());
        assert!(config_from(&[("CREDIT_POLICY", "random")]).is_err());
    }
}
