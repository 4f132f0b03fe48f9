//! Loader and query-interface settings
//!
//! Connection details, the zone allow-list, filter thresholds, and the retry
//! policy all live here instead of being hardcoded at the entry point.
//! Defaults reproduce the values the system has always shipped with; a YAML
//! file can override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TripGraphResult;
use crate::zones::BRONX_ZONES;

/// Settings for connecting to Neo4j and filtering the trip file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bolt URI of the Neo4j server
    pub uri: String,
    /// Neo4j user
    pub user: String,
    /// Neo4j password
    pub password: String,
    /// Zone IDs admitted as trip endpoints
    pub zone_allowlist: Vec<i64>,
    /// Trips must have distance strictly greater than this
    pub min_distance: f64,
    /// Trips must have fare strictly greater than this
    pub min_fare: f64,
    /// Total connect-and-load attempts before giving up
    pub connect_attempts: u32,
    /// Seconds to wait between attempts
    pub retry_delay_secs: u64,
    /// Rows per relationship-upsert batch
    pub batch_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            zone_allowlist: BRONX_ZONES.to_vec(),
            min_distance: 0.1,
            min_fare: 2.5,
            connect_attempts: 10,
            retry_delay_secs: 10,
            batch_size: 500,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file. Fields absent from the file keep
    /// their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> TripGraphResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_constants() {
        let s = Settings::default();
        assert_eq!(s.uri, "bolt://localhost:7687");
        assert_eq!(s.zone_allowlist.len(), 43);
        assert_eq!(s.min_distance, 0.1);
        assert_eq!(s.min_fare, 2.5);
        assert_eq!(s.connect_attempts, 10);
        assert_eq!(s.retry_delay_secs, 10);
    }

    #[test]
    fn yaml_overrides_apply_over_defaults() {
        let yaml = "uri: bolt://graph:7687\nmin_fare: 5.0\nzone_allowlist: [1, 2, 3]\n";
        let s: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(s.uri, "bolt://graph:7687");
        assert_eq!(s.min_fare, 5.0);
        assert_eq!(s.zone_allowlist, vec![1, 2, 3]);
        // untouched fields keep defaults
        assert_eq!(s.user, "neo4j");
        assert_eq!(s.min_distance, 0.1);
        assert_eq!(s.batch_size, 500);
    }
}
