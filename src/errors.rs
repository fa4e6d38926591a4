use std::io;

use thiserror::Error;

use crate::types::ClassName;

/// Error type for schema, query, transfer, and configuration failures.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("schema fetch failed: {0}")]
    SchemaFetch(String),
    #[error("query against class '{class_name}' failed: {reason}")]
    Query {
        class_name: ClassName,
        reason: String,
    },
    #[error("transfer sink rejected a batch from class '{class_name}': {reason}")]
    Transfer {
        class_name: ClassName,
        reason: String,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}
