//! Trip-file loader — Parquet in, graph out
//!
//! Reads the TLC yellow-taxi Parquet file, filters rows to a single borough
//! and to plausible distance/fare values, normalizes the two timestamp
//! columns, and upserts the survivors into Neo4j as `Location` nodes and
//! `TRIP` relationships. All writes are MERGEs, so a retried load replays
//! the whole file without creating duplicates.

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

use arrow::array::{
    Array, ArrayRef, Float64Array, Int32Array, Int64Array, TimestampMicrosecondArray,
    TimestampNanosecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDateTime};
use neo4rs::{query, Query};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;
use tracing::{info, warn};

use crate::client::GraphClient;
use crate::config::Settings;
use crate::error::{TripGraphError, TripGraphResult};
use crate::model::{LoadSummary, TripRecord};

/// The six columns consumed from the trip file.
const PICKUP_COL: &str = "tpep_pickup_datetime";
const DROPOFF_COL: &str = "tpep_dropoff_datetime";
const PU_LOCATION_COL: &str = "PULocationID";
const DO_LOCATION_COL: &str = "DOLocationID";
const DISTANCE_COL: &str = "trip_distance";
const FARE_COL: &str = "fare_amount";

const REQUIRED_COLUMNS: [&str; 6] = [
    PICKUP_COL,
    DROPOFF_COL,
    PU_LOCATION_COL,
    DO_LOCATION_COL,
    DISTANCE_COL,
    FARE_COL,
];

/// Timestamp format stored on TRIP relationships, fed to Cypher datetime().
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One MERGE per distinct zone ID, batched through UNWIND.
pub(crate) const MERGE_LOCATIONS: &str = "UNWIND $names AS name MERGE (l:Location {name: name})";

/// One MERGE per trip row, batched through UNWIND over parallel arrays.
/// The merge key is the full property tuple, so identical rows collapse.
pub(crate) const MERGE_TRIPS: &str = "\
UNWIND range(0, size($pu) - 1) AS i
MATCH (start:Location {name: $pu[i]})
MATCH (end:Location {name: $do[i]})
MERGE (start)-[:TRIP {
    distance: $distance[i],
    fare: $fare[i],
    pickup_dt: datetime($pickup[i]),
    dropoff_dt: datetime($dropoff[i])
}]->(end)";

/// Read the trip file and apply the filter pipeline.
///
/// Returns the surviving records plus the total row count scanned. Rows with
/// a null in any required column are skipped; a required column that is
/// absent or has an unsupported type fails the whole read.
pub fn read_trips<P: AsRef<Path>>(
    path: P,
    settings: &Settings,
) -> TripGraphResult<(Vec<TripRecord>, usize)> {
    let file = File::open(path.as_ref())?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let schema = builder.schema().clone();
    for name in REQUIRED_COLUMNS {
        schema
            .index_of(name)
            .map_err(|_| TripGraphError::MissingColumn(name.to_string()))?;
    }

    let mask = ProjectionMask::columns(builder.parquet_schema(), REQUIRED_COLUMNS);
    let reader = builder.with_projection(mask).build()?;

    let allow: HashSet<i64> = settings.zone_allowlist.iter().copied().collect();
    let mut trips = Vec::new();
    let mut scanned = 0usize;
    let mut skipped_nulls = 0usize;

    for batch in reader {
        let batch: RecordBatch = batch?;

        let pickup = TimestampColumn::of(&batch, PICKUP_COL)?;
        let dropoff = TimestampColumn::of(&batch, DROPOFF_COL)?;
        let pu_location = IntColumn::of(&batch, PU_LOCATION_COL)?;
        let do_location = IntColumn::of(&batch, DO_LOCATION_COL)?;
        let distance = FloatColumn::of(&batch, DISTANCE_COL)?;
        let fare = FloatColumn::of(&batch, FARE_COL)?;

        for row in 0..batch.num_rows() {
            scanned += 1;

            let (pickup_dt, dropoff_dt, pu, dst, dist, amount) = match (
                pickup.value(row),
                dropoff.value(row),
                pu_location.value(row),
                do_location.value(row),
                distance.value(row),
                fare.value(row),
            ) {
                (Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)) => (a, b, c, d, e, f),
                _ => {
                    skipped_nulls += 1;
                    continue;
                }
            };

            let trip = TripRecord {
                pickup_dt: pickup_dt.format(TIMESTAMP_FORMAT).to_string(),
                dropoff_dt: dropoff_dt.format(TIMESTAMP_FORMAT).to_string(),
                pu_location: pu,
                do_location: dst,
                distance: dist,
                fare: amount,
            };

            if admits(&allow, settings, &trip) {
                trips.push(trip);
            }
        }
    }

    if skipped_nulls > 0 {
        warn!(skipped_nulls, "Skipped rows with null values");
    }

    Ok((trips, scanned))
}

/// The filter pipeline: both endpoints in the allow-list, distance and fare
/// strictly above their thresholds.
fn admits(allow: &HashSet<i64>, settings: &Settings, trip: &TripRecord) -> bool {
    allow.contains(&trip.pu_location)
        && allow.contains(&trip.do_location)
        && trip.distance > settings.min_distance
        && trip.fare > settings.min_fare
}

/// Distinct endpoint zone IDs across all trips, in ascending order.
fn distinct_zones(trips: &[TripRecord]) -> Vec<i64> {
    trips
        .iter()
        .flat_map(|t| [t.pu_location, t.do_location])
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .collect()
}

fn trip_batch_query(chunk: &[TripRecord]) -> Query {
    query(MERGE_TRIPS)
        .param("pu", chunk.iter().map(|t| t.pu_location).collect::<Vec<_>>())
        .param("do", chunk.iter().map(|t| t.do_location).collect::<Vec<_>>())
        .param(
            "distance",
            chunk.iter().map(|t| t.distance).collect::<Vec<_>>(),
        )
        .param("fare", chunk.iter().map(|t| t.fare).collect::<Vec<_>>())
        .param(
            "pickup",
            chunk.iter().map(|t| t.pickup_dt.clone()).collect::<Vec<_>>(),
        )
        .param(
            "dropoff",
            chunk
                .iter()
                .map(|t| t.dropoff_dt.clone())
                .collect::<Vec<_>>(),
        )
}

/// Upsert filtered trips into the graph: nodes first, then relationships in
/// batches. Returns the load summary.
pub async fn load_file<P: AsRef<Path>>(
    client: &GraphClient,
    path: P,
    settings: &Settings,
) -> TripGraphResult<LoadSummary> {
    let (trips, rows_read) = read_trips(&path, settings)?;
    let zones = distinct_zones(&trips);
    info!(
        rows_read,
        rows_kept = trips.len(),
        zones = zones.len(),
        "Trip file filtered"
    );

    client
        .graph()
        .run(query(MERGE_LOCATIONS).param("names", zones.clone()))
        .await?;

    let batch_size = settings.batch_size.max(1);
    for chunk in trips.chunks(batch_size) {
        client.graph().run(trip_batch_query(chunk)).await?;
    }

    Ok(LoadSummary {
        rows_read,
        rows_loaded: trips.len(),
        zones: zones.len(),
    })
}

/// Connect and load, retrying the whole operation on any failure.
///
/// Each attempt reconnects and replays the entire file; MERGE idempotence
/// makes the replay safe. The schedule is `connect_attempts` tries with
/// `retry_delay_secs` between them, and the last error is returned.
pub async fn load_with_retry<P: AsRef<Path>>(
    settings: &Settings,
    path: P,
) -> TripGraphResult<LoadSummary> {
    let path = path.as_ref();
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let outcome = async {
            let client = GraphClient::connect(settings).await?;
            load_file(&client, path, settings).await
        }
        .await;

        match outcome {
            Ok(summary) => {
                info!(
                    rows = summary.rows_loaded,
                    zones = summary.zones,
                    "Data loaded successfully"
                );
                return Ok(summary);
            }
            Err(e) if attempt < settings.connect_attempts => {
                warn!(
                    attempt,
                    max_attempts = settings.connect_attempts,
                    error = %e,
                    "Load attempt failed, retrying"
                );
                tokio::time::sleep(Duration::from_secs(settings.retry_delay_secs)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Typed view of an integer zone-ID column.
enum IntColumn<'a> {
    I64(&'a Int64Array),
    I32(&'a Int32Array),
}

impl<'a> IntColumn<'a> {
    fn of(batch: &'a RecordBatch, name: &str) -> TripGraphResult<Self> {
        let col = column(batch, name)?;
        match col.data_type() {
            DataType::Int64 => Ok(Self::I64(downcast::<Int64Array>(col, name)?)),
            DataType::Int32 => Ok(Self::I32(downcast::<Int32Array>(col, name)?)),
            other => Err(unsupported(name, other)),
        }
    }

    fn value(&self, row: usize) -> Option<i64> {
        match self {
            Self::I64(a) => (!a.is_null(row)).then(|| a.value(row)),
            Self::I32(a) => (!a.is_null(row)).then(|| a.value(row) as i64),
        }
    }
}

/// Typed view of a float column.
struct FloatColumn<'a>(&'a Float64Array);

impl<'a> FloatColumn<'a> {
    fn of(batch: &'a RecordBatch, name: &str) -> TripGraphResult<Self> {
        let col = column(batch, name)?;
        match col.data_type() {
            DataType::Float64 => Ok(Self(downcast::<Float64Array>(col, name)?)),
            other => Err(unsupported(name, other)),
        }
    }

    fn value(&self, row: usize) -> Option<f64> {
        (!self.0.is_null(row)).then(|| self.0.value(row))
    }
}

/// Typed view of a timestamp column. TLC files have shipped both
/// microsecond and nanosecond units over the years.
enum TimestampColumn<'a> {
    Micros(&'a TimestampMicrosecondArray),
    Nanos(&'a TimestampNanosecondArray),
}

impl<'a> TimestampColumn<'a> {
    fn of(batch: &'a RecordBatch, name: &str) -> TripGraphResult<Self> {
        let col = column(batch, name)?;
        match col.data_type() {
            DataType::Timestamp(TimeUnit::Microsecond, _) => {
                Ok(Self::Micros(downcast::<TimestampMicrosecondArray>(col, name)?))
            }
            DataType::Timestamp(TimeUnit::Nanosecond, _) => {
                Ok(Self::Nanos(downcast::<TimestampNanosecondArray>(col, name)?))
            }
            other => Err(unsupported(name, other)),
        }
    }

    fn value(&self, row: usize) -> Option<NaiveDateTime> {
        match self {
            Self::Micros(a) => {
                if a.is_null(row) {
                    return None;
                }
                DateTime::from_timestamp_micros(a.value(row)).map(|dt| dt.naive_utc())
            }
            Self::Nanos(a) => {
                if a.is_null(row) {
                    return None;
                }
                Some(DateTime::from_timestamp_nanos(a.value(row)).naive_utc())
            }
        }
    }
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> TripGraphResult<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| TripGraphError::MissingColumn(name.to_string()))?;
    Ok(batch.column(idx))
}

fn downcast<'a, T: 'static>(col: &'a ArrayRef, name: &str) -> TripGraphResult<&'a T> {
    col.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| TripGraphError::MissingColumn(name.to_string()))
}

fn unsupported(name: &str, dt: &DataType) -> TripGraphError {
    TripGraphError::MissingColumn(format!("{name} has unsupported type {dt}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(pu: i64, dst: i64, distance: f64, fare: f64) -> TripRecord {
        TripRecord {
            pickup_dt: "2022-03-01T10:00:00".to_string(),
            dropoff_dt: "2022-03-01T10:30:00".to_string(),
            pu_location: pu,
            do_location: dst,
            distance,
            fare,
        }
    }

    fn bronx_settings() -> (HashSet<i64>, Settings) {
        let settings = Settings::default();
        let allow = settings.zone_allowlist.iter().copied().collect();
        (allow, settings)
    }

    #[test]
    fn three_row_fixture_keeps_only_the_valid_trip() {
        let (allow, settings) = bronx_settings();

        // inside allow-list, fare 10, distance 2
        assert!(admits(&allow, &settings, &trip(3, 18, 2.0, 10.0)));
        // endpoint outside the allow-list
        assert!(!admits(&allow, &settings, &trip(1, 18, 2.0, 10.0)));
        // fare below threshold
        assert!(!admits(&allow, &settings, &trip(3, 18, 2.0, 1.0)));
    }

    #[test]
    fn both_endpoints_must_be_in_the_allowlist() {
        let (allow, settings) = bronx_settings();

        assert!(!admits(&allow, &settings, &trip(3, 1, 2.0, 10.0)));
        assert!(!admits(&allow, &settings, &trip(1, 1, 2.0, 10.0)));
        assert!(admits(&allow, &settings, &trip(3, 3, 2.0, 10.0)));
    }

    #[test]
    fn thresholds_are_strict_inequalities() {
        let (allow, settings) = bronx_settings();

        // exactly at a threshold is excluded
        assert!(!admits(&allow, &settings, &trip(3, 18, 0.1, 10.0)));
        assert!(!admits(&allow, &settings, &trip(3, 18, 2.0, 2.5)));
        // just above is admitted
        assert!(admits(&allow, &settings, &trip(3, 18, 0.11, 10.0)));
        assert!(admits(&allow, &settings, &trip(3, 18, 2.0, 2.51)));
    }

    #[test]
    fn distinct_zones_deduplicates_shared_endpoints() {
        let trips = vec![
            trip(3, 18, 2.0, 10.0),
            trip(18, 3, 1.0, 5.0),
            trip(3, 20, 4.0, 12.0),
        ];
        assert_eq!(distinct_zones(&trips), vec![3, 18, 20]);
    }

    #[test]
    fn distinct_zones_handles_self_loops() {
        let trips = vec![trip(3, 3, 2.0, 10.0)];
        assert_eq!(distinct_zones(&trips), vec![3]);
    }

    #[test]
    fn node_upsert_merges_on_name() {
        assert!(MERGE_LOCATIONS.contains("UNWIND $names"));
        assert!(MERGE_LOCATIONS.contains("MERGE (l:Location {name: name})"));
    }

    #[test]
    fn trip_upsert_carries_all_four_properties() {
        for fragment in [
            "MATCH (start:Location {name: $pu[i]})",
            "MATCH (end:Location {name: $do[i]})",
            "distance: $distance[i]",
            "fare: $fare[i]",
            "pickup_dt: datetime($pickup[i])",
            "dropoff_dt: datetime($dropoff[i])",
        ] {
            assert!(MERGE_TRIPS.contains(fragment), "missing: {fragment}");
        }
        // MERGE, not CREATE: retried loads must not duplicate edges
        assert!(MERGE_TRIPS.contains("MERGE (start)-[:TRIP"));
    }

    #[test]
    fn batching_covers_every_row() {
        let trips: Vec<TripRecord> = (0..1201).map(|_| trip(3, 18, 2.0, 10.0)).collect();
        let chunks: Vec<_> = trips.chunks(500).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), trips.len());
    }
}
