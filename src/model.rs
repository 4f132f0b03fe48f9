//! Data models crossing the tripgraph API boundary
//!
//! Plain records only — the graph itself lives in Neo4j.

use serde::{Deserialize, Serialize};

/// One trip surviving the filter pipeline, ready to upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    /// Pickup timestamp, `YYYY-MM-DDTHH:MM:SS`
    pub pickup_dt: String,
    /// Dropoff timestamp, `YYYY-MM-DDTHH:MM:SS`
    pub dropoff_dt: String,
    /// Pickup zone ID
    pub pu_location: i64,
    /// Dropoff zone ID
    pub do_location: i64,
    /// Trip distance in miles
    pub distance: f64,
    /// Fare amount in dollars
    pub fare: f64,
}

/// Summary of a completed load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Rows read from the trip file
    pub rows_read: usize,
    /// Rows surviving the filter pipeline
    pub rows_loaded: usize,
    /// Distinct zone IDs upserted as nodes
    pub zones: usize,
}

/// One path streamed back from the BFS query, as a zone-ID sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPath {
    pub zones: Vec<i64>,
}

impl TripPath {
    /// Number of hops along the path
    pub fn hops(&self) -> usize {
        self.zones.len().saturating_sub(1)
    }
}

/// One row of the min/max PageRank result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedZone {
    /// "Max PageRank" or "Min PageRank"
    pub kind: String,
    /// Zone ID
    pub name: i64,
    /// PageRank score
    pub score: f64,
}

/// Node and relationship counts for the loaded graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of Location nodes
    pub locations: u64,
    /// Number of TRIP relationships
    pub trips: u64,
}
