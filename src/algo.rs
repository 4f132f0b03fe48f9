//! Graph-algorithm queries via the Neo4j Graph Data Science plugin
//!
//! Both operations follow the same shape: drop the named in-memory
//! projection if a previous call left one behind, project the loaded
//! Location/TRIP graph under that name, then stream algorithm results back.
//! The algorithms themselves (BFS, PageRank) run entirely inside GDS.

use neo4rs::{query, Path};
use tracing::debug;

use crate::client::GraphClient;
use crate::error::TripGraphResult;
use crate::model::{RankedZone, TripPath};

/// Projection name used by the path query.
pub const PATH_PROJECTION: &str = "dataset_graph";

/// Projection name used by the centrality query.
pub const RANK_PROJECTION: &str = "nycTripData";

/// Damping factor for every PageRank run.
const DAMPING_FACTOR: f64 = 0.85;

/// Drop a named projection if it exists. A no-op when nothing is projected.
const DROP_PROJECTION: &str = "\
CALL gds.graph.exists($name) YIELD exists
WITH exists
WHERE exists
CALL gds.graph.drop($name) YIELD graphName
RETURN graphName";

/// Undirected single-label projection for path finding.
const PROJECT_UNDIRECTED: &str = "\
CALL gds.graph.project(
    $name,
    ['Location'],
    {
        TRIP: {
            type: 'TRIP',
            orientation: 'UNDIRECTED'
        }
    }
)";

/// Directed projection carrying a relationship weight property.
const PROJECT_WEIGHTED: &str = "\
CALL gds.graph.project(
    $name,
    'Location',
    {
        TRIP: {
            properties: $weight
        }
    }
)
YIELD graphName, nodeCount, relationshipCount";

/// Stream the BFS path from source to target.
const BFS_STREAM: &str = "\
MATCH (source:Location {name: $source}), (target:Location {name: $target})
CALL gds.bfs.stream($name, {
    sourceNode: source,
    targetNodes: [target]
})
YIELD path
RETURN path";

/// Highest- and lowest-ranked zones by weighted PageRank, as one two-row
/// result. Both branches run over the same projection.
const PAGE_RANK_STREAM: &str = "\
CALL gds.pageRank.stream($name, {
    maxIterations: $max_itr,
    dampingFactor: 0.85,
    relationshipWeightProperty: $weight
})
YIELD nodeId, score
WITH gds.util.asNode(nodeId) AS location, score
ORDER BY score DESC
LIMIT 1
RETURN 'Max PageRank' AS kind, location.name AS name, score
UNION ALL
CALL gds.pageRank.stream($name, {
    maxIterations: $max_itr,
    dampingFactor: 0.85,
    relationshipWeightProperty: $weight
})
YIELD nodeId, score
WITH gds.util.asNode(nodeId) AS location, score
ORDER BY score ASC
LIMIT 1
RETURN 'Min PageRank' AS kind, location.name AS name, score";

/// Recreate the named projection: drop the stale one, then run `project`.
async fn recreate_projection(
    client: &GraphClient,
    name: &str,
    project: neo4rs::Query,
) -> TripGraphResult<()> {
    client
        .graph()
        .run(query(DROP_PROJECTION).param("name", name))
        .await?;
    client.graph().run(project).await?;
    debug!(projection = name, "Projection recreated");
    Ok(())
}

/// Find the path connecting two zones in the undirected trip graph.
///
/// Streams `gds.bfs.stream` results over a fresh `dataset_graph`
/// projection. No connecting path yields an empty vec, not an error.
pub async fn shortest_path(
    client: &GraphClient,
    source: i64,
    target: i64,
) -> TripGraphResult<Vec<TripPath>> {
    recreate_projection(
        client,
        PATH_PROJECTION,
        query(PROJECT_UNDIRECTED).param("name", PATH_PROJECTION),
    )
    .await?;

    let q = query(BFS_STREAM)
        .param("name", PATH_PROJECTION)
        .param("source", source)
        .param("target", target);

    let mut paths = Vec::new();
    let mut stream = client.graph().execute(q).await?;
    while let Some(row) = stream.next().await? {
        if let Ok(path) = row.get::<Path>("path") {
            let zones = path
                .nodes()
                .iter()
                .map(|node| node.get::<i64>("name").unwrap_or_default())
                .collect();
            paths.push(TripPath { zones });
        }
    }

    Ok(paths)
}

/// Rank zones by weighted PageRank and return the extremes.
///
/// Recreates the `nycTripData` projection with `weight` attached to TRIP
/// relationships, then streams two fixed-damping PageRank runs (descending
/// and ascending, one row each) unioned into a two-row result.
pub async fn page_rank(
    client: &GraphClient,
    max_iterations: u32,
    weight: &str,
) -> TripGraphResult<Vec<RankedZone>> {
    recreate_projection(
        client,
        RANK_PROJECTION,
        query(PROJECT_WEIGHTED)
            .param("name", RANK_PROJECTION)
            .param("weight", weight),
    )
    .await?;

    let q = query(PAGE_RANK_STREAM)
        .param("name", RANK_PROJECTION)
        .param("max_itr", max_iterations as i64)
        .param("weight", weight);

    let mut ranked = Vec::new();
    let mut stream = client.graph().execute(q).await?;
    while let Some(row) = stream.next().await? {
        ranked.push(RankedZone {
            kind: row.get::<String>("kind").unwrap_or_default(),
            name: row.get::<i64>("name").unwrap_or_default(),
            score: row.get::<f64>("score").unwrap_or_default(),
        });
    }

    Ok(ranked)
}
