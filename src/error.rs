//! Error types for the tripgraph library

use thiserror::Error;

/// Errors that can occur while loading or querying the trip graph
#[derive(Error, Debug)]
pub enum TripGraphError {
    /// Connection to the graph database failed or could not be verified
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error from the Bolt driver
    #[error("Graph error: {0}")]
    Graph(#[from] neo4rs::Error),

    /// Parquet decoding error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Arrow record batch error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Required column absent from the trip file, or present with an
    /// unexpected type
    #[error("Missing column in trip file: {0}")]
    MissingColumn(String),

    /// Configuration file error
    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TripGraphResult<T> = Result<T, TripGraphError>;
