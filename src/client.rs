//! GraphClient — Bolt connection to the Neo4j server
//!
//! Thin wrapper over `neo4rs::Graph`. Connectivity is verified eagerly with
//! a trivial round trip so callers fail at connect time, not first use.
//! Retry is the loader's concern, not the client's.

use neo4rs::{query, Graph};
use tracing::info;

use crate::config::Settings;
use crate::error::{TripGraphError, TripGraphResult};
use crate::model::GraphStats;

/// Client holding one Bolt connection pool to the graph database.
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to the server named in `settings` and verify connectivity.
    pub async fn connect(settings: &Settings) -> TripGraphResult<Self> {
        let graph = Graph::new(&settings.uri, &settings.user, &settings.password)
            .await
            .map_err(|e| TripGraphError::Connection(format!("{}: {e}", settings.uri)))?;

        // The driver connects lazily; force a round trip now.
        let mut rows = graph.execute(query("RETURN 1 AS ok")).await?;
        rows.next()
            .await?
            .ok_or_else(|| TripGraphError::Connection("connectivity check returned no rows".into()))?;

        info!(uri = settings.uri.as_str(), "Connected to graph database");
        Ok(Self { graph })
    }

    /// The underlying driver handle, for issuing queries.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Count loaded Location nodes and TRIP relationships.
    pub async fn stats(&self) -> TripGraphResult<GraphStats> {
        let mut rows = self
            .graph
            .execute(query("MATCH (l:Location) RETURN count(l) AS locations"))
            .await?;
        let locations = match rows.next().await? {
            Some(row) => row.get::<i64>("locations").unwrap_or(0),
            None => 0,
        };

        let mut rows = self
            .graph
            .execute(query("MATCH (:Location)-[t:TRIP]->(:Location) RETURN count(t) AS trips"))
            .await?;
        let trips = match rows.next().await? {
            Some(row) => row.get::<i64>("trips").unwrap_or(0),
            None => 0,
        };

        Ok(GraphStats {
            locations: locations as u64,
            trips: trips as u64,
        })
    }

    /// Delete every Location node and its relationships. Returns the number
    /// of nodes removed.
    pub async fn clear(&self) -> TripGraphResult<u64> {
        let mut rows = self
            .graph
            .execute(query(
                "MATCH (l:Location) DETACH DELETE l RETURN count(l) AS removed",
            ))
            .await?;
        let removed = match rows.next().await? {
            Some(row) => row.get::<i64>("removed").unwrap_or(0),
            None => 0,
        };

        info!(removed, "Cleared trip graph");
        Ok(removed as u64)
    }
}
