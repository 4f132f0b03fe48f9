//! Tripgraph — NYC taxi-trip graph loader and query interface
//!
//! Ingests TLC yellow-taxi trip records from a Parquet file, filters them to
//! the Bronx, and loads them into Neo4j as `Location` nodes and `TRIP`
//! relationships. Graph algorithms (BFS path finding, weighted PageRank) are
//! delegated to the Graph Data Science plugin through named in-memory
//! projections.
//!
//! Two independent surfaces share nothing but the persisted graph:
//!
//! - **`loader`** — Parquet → filter pipeline → batched MERGE upserts, with
//!   a whole-operation retry loop around connect-and-load.
//! - **`algo`** — projection management plus the BFS and min/max PageRank
//!   wrappers.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tripgraph::{loader, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tripgraph::TripGraphError> {
//!     let settings = Settings::default();
//!     let summary = loader::load_with_retry(&settings, "yellow_tripdata_2022-03.parquet").await?;
//!     println!("Loaded {} trips", summary.rows_loaded);
//!     Ok(())
//! }
//! ```

pub mod algo;
pub mod client;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod zones;

// ============================================================
// Core types
// ============================================================

pub use client::GraphClient;
pub use config::Settings;
pub use error::{TripGraphError, TripGraphResult};
pub use model::{GraphStats, LoadSummary, RankedZone, TripPath, TripRecord};

// ============================================================
// Zone allow-list
// ============================================================

pub use zones::BRONX_ZONES;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
